pub mod sanitize;
pub mod unicode;
