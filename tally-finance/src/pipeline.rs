//! Batch review: duplicate annotations and classifications for a parsed
//! file, merged per record in file order. Nothing is persisted here; the
//! caller decides which records to keep.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tally_core::{ParsedTransaction, TransactionType};

use crate::classify::{
    classify_batch, classify_history_only, CascadeConfig, Catalog, Classification, TextGenerator,
};
use crate::duplicates::{
    detect_batch_duplicates, duplicate_stats, DuplicateConfig, DuplicateKind, DuplicateMatch,
    DuplicateStats,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub duplicates: DuplicateConfig,
    pub classification: CascadeConfig,
}

/// Which account the file belongs to and how it is classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewScope {
    pub account_id: Option<i64>,
    /// Card accounts skip rules and the generator.
    pub history_only: bool,
}

/// The stored record a new one collided with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedRecord {
    pub description: String,
    pub date: NaiveDate,
    pub amount: i64,
    pub transaction_type: TransactionType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateInfo {
    /// `exact` or `fuzzy`; a bank id hit is reported as exact.
    #[serde(rename = "type")]
    pub kind: DuplicateKind,
    pub similarity: u8,
    pub reason: String,
    pub existing_index: usize,
    pub matched: MatchedRecord,
}

impl DuplicateInfo {
    fn from_match(m: &DuplicateMatch, existing: &ParsedTransaction) -> Self {
        let kind = match m.kind {
            DuplicateKind::BankId | DuplicateKind::Exact => DuplicateKind::Exact,
            DuplicateKind::Fuzzy => DuplicateKind::Fuzzy,
        };
        Self {
            kind,
            similarity: m.similarity,
            reason: m.reason.clone(),
            existing_index: m.existing_index,
            matched: MatchedRecord {
                description: existing.description.clone(),
                date: existing.payment_date,
                amount: existing.amount,
                transaction_type: existing.transaction_type,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewedTransaction {
    #[serde(flatten)]
    pub transaction: ParsedTransaction,
    pub is_duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_info: Option<DuplicateInfo>,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReview {
    pub records: Vec<ReviewedTransaction>,
    pub stats: DuplicateStats,
}

pub async fn review_batch<T, G>(
    parsed: Vec<ParsedTransaction>,
    existing: &[T],
    catalog: &Catalog<'_>,
    scope: ReviewScope,
    config: &ReviewConfig,
    generator: Option<&G>,
) -> BatchReview
where
    T: AsRef<ParsedTransaction>,
    G: TextGenerator,
{
    let mut reports = detect_batch_duplicates(&parsed, existing, &config.duplicates);
    let stats = duplicate_stats(&reports);

    let classifications: Vec<Classification> = if scope.history_only {
        parsed
            .iter()
            .map(|tx| classify_history_only(&tx.description, catalog.history, &config.classification))
            .collect()
    } else {
        classify_batch(&parsed, scope.account_id, catalog, &config.classification, generator).await
    };

    let records: Vec<ReviewedTransaction> = parsed
        .into_iter()
        .zip(classifications)
        .enumerate()
        .map(|(i, (transaction, classification))| {
            let duplicate_info = reports.remove(&i).and_then(|report| {
                let m = report.strongest()?;
                let matched = existing.get(m.existing_index)?;
                Some(DuplicateInfo::from_match(m, matched.as_ref()))
            });
            ReviewedTransaction {
                transaction,
                is_duplicate: duplicate_info.is_some(),
                duplicate_info,
                classification,
            }
        })
        .collect();

    tracing::info!(
        records = records.len(),
        duplicates = stats.total,
        "batch reviewed"
    );
    BatchReview { records, stats }
}
