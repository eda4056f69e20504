//! Feedback from human corrections into the learned history.

use chrono::{DateTime, Utc};
use tally_core::{normalize_text, LearnedPattern, StoredTransaction};

/// Storage for learned patterns. `record_correction` must be an atomic
/// insert-or-increment.
pub trait LearningStore {
    fn record_correction(
        &mut self,
        description: &str,
        category_id: i64,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}

/// In-memory history, serialized as a plain list of patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryBook {
    patterns: Vec<LearnedPattern>,
}

impl HistoryBook {
    pub fn new(patterns: Vec<LearnedPattern>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &[LearnedPattern] {
        &self.patterns
    }

    pub fn into_patterns(self) -> Vec<LearnedPattern> {
        self.patterns
    }

    /// Drop a pairing the user no longer wants suggested.
    pub fn forget(&mut self, description: &str, category_id: i64) -> bool {
        let key = normalize_text(description);
        let before = self.patterns.len();
        self.patterns
            .retain(|p| !(p.category_id == category_id && normalize_text(&p.description) == key));
        self.patterns.len() != before
    }
}

impl LearningStore for HistoryBook {
    fn record_correction(
        &mut self,
        description: &str,
        category_id: i64,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let description = description.trim();
        if description.is_empty() {
            anyhow::bail!("cannot learn from an empty description");
        }
        let key = normalize_text(description);
        match self
            .patterns
            .iter_mut()
            .find(|p| p.category_id == category_id && normalize_text(&p.description) == key)
        {
            Some(existing) => {
                existing.usage_count = existing.usage_count.saturating_add(1);
                existing.last_used_at = at;
            }
            None => self.patterns.push(LearnedPattern {
                description: description.to_string(),
                category_id,
                usage_count: 1,
                last_used_at: at,
            }),
        }
        tracing::debug!(description, category_id, "learned correction");
        Ok(())
    }
}

/// Apply a human category edit to a stored record and feed it back into
/// the history.
pub fn correct_category<S: LearningStore>(
    record: &mut StoredTransaction,
    category_id: i64,
    store: &mut S,
    at: DateTime<Utc>,
) -> anyhow::Result<()> {
    store.record_correction(&record.transaction.description, category_id, at)?;
    record.correct_category(category_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use tally_core::{
        ClassificationMethod, ClassificationStatus, ParsedTransaction, SourceFormat,
        TransactionType,
    };

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, day, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_insert_then_increment() {
        let mut book = HistoryBook::default();
        book.record_correction("IFOOD *RESTAURANTE", 3, at(1)).unwrap();
        book.record_correction("ifood *restaurante", 3, at(2)).unwrap();
        book.record_correction("IFOOD *RESTAURANTE", 4, at(3)).unwrap();

        let patterns = book.patterns();
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].usage_count, 2);
        assert_eq!(patterns[0].last_used_at, at(2));
        assert_eq!(patterns[0].description, "IFOOD *RESTAURANTE");
        assert_eq!(patterns[1].usage_count, 1);
    }

    #[test]
    fn test_empty_description_rejected() {
        let mut book = HistoryBook::default();
        assert!(book.record_correction("   ", 1, at(1)).is_err());
        assert!(book.patterns().is_empty());
    }

    #[test]
    fn test_forget() {
        let mut book = HistoryBook::default();
        book.record_correction("PADARIA", 1, at(1)).unwrap();
        assert!(!book.forget("PADARIA", 2));
        assert!(book.forget("padaria", 1));
        assert!(book.into_patterns().is_empty());
    }

    #[test]
    fn test_correct_category_marks_and_learns() {
        let tx = ParsedTransaction::new(
            "PADARIA",
            1250,
            TransactionType::Expense,
            NaiveDate::from_ymd_opt(2024, 9, 10).unwrap(),
            SourceFormat::BankStatement,
            "extrato.csv",
        );
        let mut record = StoredTransaction {
            id: 1,
            account_id: 1,
            transaction: tx,
            category_id: None,
            suggested_category_id: Some(2),
            classification_method: ClassificationMethod::Manual,
            status: ClassificationStatus::Unclassified,
            is_ignored: false,
        };
        let mut book = HistoryBook::default();
        correct_category(&mut record, 5, &mut book, at(4)).unwrap();
        correct_category(&mut record, 5, &mut book, at(5)).unwrap();

        assert_eq!(record.status, ClassificationStatus::Corrected);
        assert_eq!(record.category_id, Some(5));
        assert_eq!(book.patterns()[0].usage_count, 2);
    }
}
