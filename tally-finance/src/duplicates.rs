//! Duplicate detection between freshly parsed records and stored ones.
//!
//! Three signals, strongest first:
//!   - bank id: same issuer-assigned id (OFX FITID), nothing else compared
//!   - exact: same day, same absolute amount, same normalized description
//!   - fuzzy: close in date and amount with a similar description
//!
//! Fuzzy matching only runs when no exact match was found for a record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tally_core::{format_cents, normalize_description, ParsedTransaction};

use crate::similarity::calculate_string_similarity;

/// Tolerances for the fuzzy strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateConfig {
    pub date_tolerance_days: i64,
    pub amount_tolerance_cents: i64,
    /// Minimum description similarity, 0..=100.
    pub min_similarity: u8,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            date_tolerance_days: 3,
            amount_tolerance_cents: 100,
            min_similarity: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKind {
    BankId,
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    /// Position in the existing set the record was compared against.
    pub existing_index: usize,
    pub similarity: u8,
    pub kind: DuplicateKind,
    pub reason: String,
}

/// Every signal that fired for one new record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub has_duplicates: bool,
    pub bank_id_matches: Vec<DuplicateMatch>,
    pub exact_matches: Vec<DuplicateMatch>,
    pub fuzzy_matches: Vec<DuplicateMatch>,
}

impl DuplicateReport {
    /// The single match to show a reviewer: bank id, then exact, then the
    /// most similar fuzzy match.
    pub fn strongest(&self) -> Option<&DuplicateMatch> {
        self.bank_id_matches
            .first()
            .or_else(|| self.exact_matches.first())
            .or_else(|| self.fuzzy_matches.first())
    }
}

pub fn find_bank_id_duplicates<T: AsRef<ParsedTransaction>>(
    new: &ParsedTransaction,
    existing: &[T],
) -> Vec<DuplicateMatch> {
    let Some(id) = new.bank_id.as_deref() else {
        return Vec::new();
    };
    existing
        .iter()
        .enumerate()
        .filter(|(_, e)| e.as_ref().bank_id.as_deref() == Some(id))
        .map(|(i, _)| DuplicateMatch {
            existing_index: i,
            similarity: 100,
            kind: DuplicateKind::BankId,
            reason: format!("same bank transaction id {id}"),
        })
        .collect()
}

pub fn find_exact_duplicates<T: AsRef<ParsedTransaction>>(
    new: &ParsedTransaction,
    existing: &[T],
) -> Vec<DuplicateMatch> {
    let description = normalize_description(&new.description);
    existing
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            let e = e.as_ref();
            e.payment_date == new.payment_date
                && e.amount.saturating_abs() == new.amount.saturating_abs()
                && normalize_description(&e.description) == description
        })
        .map(|(i, _)| DuplicateMatch {
            existing_index: i,
            similarity: 100,
            kind: DuplicateKind::Exact,
            reason: format!(
                "same day ({}), amount ({}) and description",
                new.payment_date.format("%d/%m/%Y"),
                format_cents(new.amount.saturating_abs())
            ),
        })
        .collect()
}

/// Matches within the configured tolerances, most similar first.
pub fn find_fuzzy_duplicates<T: AsRef<ParsedTransaction>>(
    new: &ParsedTransaction,
    existing: &[T],
    config: &DuplicateConfig,
) -> Vec<DuplicateMatch> {
    let description = normalize_description(&new.description);
    let mut matches: Vec<DuplicateMatch> = existing
        .iter()
        .enumerate()
        .filter_map(|(i, e)| {
            let e = e.as_ref();
            let days = (e.payment_date - new.payment_date).num_days().abs();
            if days > config.date_tolerance_days {
                return None;
            }
            let amount_diff = e
                .amount
                .saturating_abs()
                .saturating_sub(new.amount.saturating_abs())
                .saturating_abs();
            if amount_diff > config.amount_tolerance_cents {
                return None;
            }
            let similarity =
                calculate_string_similarity(&description, &normalize_description(&e.description));
            if similarity < config.min_similarity {
                return None;
            }
            Some(DuplicateMatch {
                existing_index: i,
                similarity,
                kind: DuplicateKind::Fuzzy,
                reason: format!(
                    "{similarity}% similar description, {days} day(s) apart, amount differs by {}",
                    format_cents(amount_diff)
                ),
            })
        })
        .collect();
    // stable: equal scores keep existing-set order
    matches.sort_by(|a, b| b.similarity.cmp(&a.similarity));
    matches
}

pub fn detect_all_duplicates<T: AsRef<ParsedTransaction>>(
    new: &ParsedTransaction,
    existing: &[T],
    config: &DuplicateConfig,
) -> DuplicateReport {
    let bank_id_matches = find_bank_id_duplicates(new, existing);
    let exact_matches = find_exact_duplicates(new, existing);
    let fuzzy_matches = if exact_matches.is_empty() {
        find_fuzzy_duplicates(new, existing, config)
    } else {
        Vec::new()
    };
    DuplicateReport {
        has_duplicates: !(bank_id_matches.is_empty()
            && exact_matches.is_empty()
            && fuzzy_matches.is_empty()),
        bank_id_matches,
        exact_matches,
        fuzzy_matches,
    }
}

/// Reports keyed by position in `new`; records with no signal are left out.
pub fn detect_batch_duplicates<T: AsRef<ParsedTransaction>>(
    new: &[ParsedTransaction],
    existing: &[T],
    config: &DuplicateConfig,
) -> BTreeMap<usize, DuplicateReport> {
    let reports: BTreeMap<usize, DuplicateReport> = new
        .iter()
        .enumerate()
        .map(|(i, tx)| (i, detect_all_duplicates(tx, existing, config)))
        .filter(|(_, report)| report.has_duplicates)
        .collect();
    tracing::debug!(
        records = new.len(),
        existing = existing.len(),
        flagged = reports.len(),
        "duplicate scan finished"
    );
    reports
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateStats {
    pub total: usize,
    pub with_bank_id: usize,
    pub with_exact: usize,
    pub with_fuzzy: usize,
}

/// A record counts once in `total` and once in each bucket that fired.
pub fn duplicate_stats(reports: &BTreeMap<usize, DuplicateReport>) -> DuplicateStats {
    reports
        .values()
        .fold(DuplicateStats::default(), |mut stats, report| {
            stats.total += 1;
            stats.with_bank_id += usize::from(!report.bank_id_matches.is_empty());
            stats.with_exact += usize::from(!report.exact_matches.is_empty());
            stats.with_fuzzy += usize::from(!report.fuzzy_matches.is_empty());
            stats
        })
}
