//! Category resolution for new records.
//!
//! Tiers run in a fixed order and the first one that resolves wins:
//! rules, learned history, then the text generator. A history candidate that
//! falls short of the threshold survives as a suggestion for a reviewer.

pub mod ai;
pub mod cascade;
pub mod history;
pub mod rules;

use serde::{Deserialize, Serialize};
use tally_core::{
    Category, ClassificationMethod, ClassificationRule, ClassificationStatus, LearnedPattern,
    TransactionType,
};

pub use ai::{build_prompts, classify_with_generator, match_answer, NoGenerator, TextGenerator};
pub use cascade::{classify, classify_batch, classify_history_only};
pub use history::{HistoryLookup, HistoryOutcome};
pub use rules::RuleSet;

pub const RULE_CONFIDENCE: u8 = 100;
pub const AI_CONFIDENCE: u8 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// History candidates below this share (0..=100) become suggestions.
    pub history_min_confidence: u8,
    /// Upper bound on generator calls in flight for one batch.
    pub max_concurrent_requests: usize,
    pub use_ai: bool,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            history_min_confidence: 70,
            max_concurrent_requests: 4,
            use_ai: true,
        }
    }
}

/// Reference data the cascade reads. Supplied per call by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog<'a> {
    pub rules: &'a [ClassificationRule],
    pub history: &'a [LearnedPattern],
    pub categories: &'a [Category],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category_id: Option<i64>,
    pub method: ClassificationMethod,
    pub confidence: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_category_id: Option<i64>,
    /// Set when a rule names the transaction type it expects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
}

impl Classification {
    pub fn resolved(category_id: i64, method: ClassificationMethod, confidence: u8) -> Self {
        Self {
            category_id: Some(category_id),
            method,
            confidence,
            suggested_category_id: None,
            transaction_type: None,
        }
    }

    /// Nothing resolved; `suggestion` is kept for the reviewer.
    pub fn unresolved(suggestion: Option<i64>) -> Self {
        Self {
            category_id: None,
            method: ClassificationMethod::Manual,
            confidence: 0,
            suggested_category_id: suggestion,
            transaction_type: None,
        }
    }

    pub fn status(&self) -> ClassificationStatus {
        ClassificationStatus::from_cascade(self.method, self.category_id.is_some())
    }
}
