use serde::{Deserialize, Serialize};
use tally_core::{AccountInfo, ParsedTransaction};

/// Normalized output of every statement parser.
///
/// Bad records never abort a file: they are dropped and described in
/// `errors`, and parsing continues with the next one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub transactions: Vec<ParsedTransaction>,
    pub errors: Vec<String>,
    pub account_info: Option<AccountInfo>,
}

impl ParseResult {
    /// Whole-file failure: nothing parsed, one explanation.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            transactions: Vec::new(),
            errors: vec![message.into()],
            account_info: None,
        }
    }

    /// True when at least one record came out, or nothing went wrong.
    pub fn success(&self) -> bool {
        !self.transactions.is_empty() || self.errors.is_empty()
    }

    pub(crate) fn push_error(&mut self, message: String) {
        tracing::debug!(%message, "skipping record");
        self.errors.push(message);
    }
}
