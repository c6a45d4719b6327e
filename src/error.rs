use thiserror::Error;

/// Hard failures of the report pipeline. Anything below the top-level shape
/// degrades to defaults instead of surfacing here.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("report file is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("report file does not have the expected structure: {0}")]
    Shape(String),
}

impl SchemaError {
    pub(crate) fn shape(reason: impl Into<String>) -> Self {
        Self::Shape(reason.into())
    }
}
