//! tally-finance: duplicate detection, the classification cascade with its
//! learning loop, and the batch review that ties them to parsed statements.

pub mod classify;
pub mod duplicates;
pub mod learning;
pub mod llm;
pub mod pipeline;
pub mod similarity;

pub use classify::{
    classify, classify_batch, classify_history_only, CascadeConfig, Catalog, Classification,
    NoGenerator, TextGenerator,
};
pub use duplicates::{
    detect_all_duplicates, detect_batch_duplicates, duplicate_stats, find_bank_id_duplicates,
    find_exact_duplicates, find_fuzzy_duplicates, DuplicateConfig, DuplicateKind, DuplicateMatch,
    DuplicateReport, DuplicateStats,
};
pub use learning::{correct_category, HistoryBook, LearningStore};
pub use llm::{LlmClient, LlmConfig, Provider};
pub use pipeline::{review_batch, BatchReview, ReviewConfig, ReviewScope, ReviewedTransaction};
pub use similarity::{calculate_string_similarity, levenshtein_distance};
