use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// The caller declared an account source this crate has no sign
    /// convention for. Configuration problem, not bad input.
    #[error("unsupported sign source: {0:?} (expected checking, savings, cash or credit_card)")]
    UnsupportedSource(String),
}
