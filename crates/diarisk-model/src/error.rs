use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be a whole number, got {value}")]
    NotInteger { field: &'static str, value: f64 },
    #[error("unknown result label: {0}")]
    UnknownLabel(String),
    #[error("unknown satisfaction rating: {0}")]
    UnknownSatisfaction(String),
    #[error("comprehension score must be between 0 and 10, got {0}")]
    InvalidComprehension(i64),
}

pub type Result<T> = std::result::Result<T, ModelError>;
