use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("unrecognized date format: {0:?}")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
