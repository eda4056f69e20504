//! Learned-history tier.

use tally_core::{normalize_text, ClassificationMethod, LearnedPattern};

use super::Classification;

/// How a learned description is compared with the record's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryLookup {
    Equals,
    /// The learned description contains the record's.
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOutcome {
    Accepted(Classification),
    /// Best candidate, but its share was below the threshold.
    Suggested(i64),
    NoMatch,
}

/// Pick the most used category among matching patterns. Confidence is that
/// pattern's share of the summed usage of all matches.
pub fn lookup(
    description: &str,
    history: &[LearnedPattern],
    mode: HistoryLookup,
    min_confidence: u8,
) -> HistoryOutcome {
    let text = normalize_text(description);
    if text.is_empty() {
        return HistoryOutcome::NoMatch;
    }

    let matching: Vec<&LearnedPattern> = history
        .iter()
        .filter(|p| {
            let learned = normalize_text(&p.description);
            match mode {
                HistoryLookup::Equals => learned == text,
                HistoryLookup::Contains => learned.contains(&text),
            }
        })
        .collect();

    let total: u64 = matching.iter().map(|p| u64::from(p.usage_count)).sum();
    let Some(best) = matching
        .iter()
        .max_by(|a, b| {
            a.usage_count
                .cmp(&b.usage_count)
                .then(a.last_used_at.cmp(&b.last_used_at))
        })
    else {
        return HistoryOutcome::NoMatch;
    };
    if total == 0 {
        return HistoryOutcome::NoMatch;
    }

    let confidence = (u64::from(best.usage_count) as f64 / total as f64 * 100.0).round() as u8;
    tracing::debug!(
        description,
        category = best.category_id,
        confidence,
        candidates = matching.len(),
        "history candidate"
    );
    if confidence >= min_confidence {
        HistoryOutcome::Accepted(Classification::resolved(
            best.category_id,
            ClassificationMethod::History,
            confidence,
        ))
    } else {
        HistoryOutcome::Suggested(best.category_id)
    }
}
