mod assemble;
mod classify;
mod config;
mod history;
mod managers;
mod model;
mod normalize;
mod ranking;
mod schema;
mod summary;

pub use assemble::build_report;
pub use config::ReportConfig;
pub use model::*;
pub use schema::{parse_document, validate_document};
