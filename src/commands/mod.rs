pub mod ads;
pub mod compare;
pub mod render;
pub mod validate;

mod load;
