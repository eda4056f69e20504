//! The per-record tier chain and its batch form.

use futures_util::stream::{self, StreamExt};
use tally_core::{ClassificationMethod, LearnedPattern, ParsedTransaction};

use super::ai::{classify_with_generator, TextGenerator};
use super::history::{self, HistoryLookup, HistoryOutcome};
use super::rules::RuleSet;
use super::{CascadeConfig, Catalog, Classification};

async fn run_tiers<G: TextGenerator>(
    rules: &RuleSet<'_>,
    catalog: &Catalog<'_>,
    config: &CascadeConfig,
    generator: Option<&G>,
    tx: &ParsedTransaction,
    account_id: Option<i64>,
) -> Classification {
    if let Some(hit) = rules.classify(&tx.description, tx.amount, account_id) {
        return hit;
    }

    let suggestion = match history::lookup(
        &tx.description,
        catalog.history,
        HistoryLookup::Equals,
        config.history_min_confidence,
    ) {
        HistoryOutcome::Accepted(hit) => return hit,
        HistoryOutcome::Suggested(id) => Some(id),
        HistoryOutcome::NoMatch => None,
    };

    if config.use_ai
        && let Some(generator) = generator
    {
        let hit =
            classify_with_generator(generator, catalog.categories, &tx.description, tx.amount)
                .await;
        if let Some(hit) = hit {
            return hit;
        }
    }

    Classification::unresolved(suggestion)
}

/// Classify one record: rules, then history, then the generator.
pub async fn classify<G: TextGenerator>(
    tx: &ParsedTransaction,
    account_id: Option<i64>,
    catalog: &Catalog<'_>,
    config: &CascadeConfig,
    generator: Option<&G>,
) -> Classification {
    let rules = RuleSet::new(catalog.rules);
    run_tiers(&rules, catalog, config, generator, tx, account_id).await
}

/// Classify every record with at most `max_concurrent_requests` cascades in
/// flight. Output is in input order.
pub async fn classify_batch<G: TextGenerator>(
    records: &[ParsedTransaction],
    account_id: Option<i64>,
    catalog: &Catalog<'_>,
    config: &CascadeConfig,
    generator: Option<&G>,
) -> Vec<Classification> {
    let rules = RuleSet::new(catalog.rules);
    if rules.is_empty() {
        tracing::debug!("no active classification rules");
    }
    let rules = &rules;
    let results: Vec<Classification> = stream::iter(records)
        .map(|tx| run_tiers(rules, catalog, config, generator, tx, account_id))
        .buffered(config.max_concurrent_requests.max(1))
        .collect()
        .await;

    let count = |m: ClassificationMethod| {
        results
            .iter()
            .filter(|c| c.method == m && c.category_id.is_some())
            .count()
    };
    tracing::info!(
        records = results.len(),
        active_rules = rules.len(),
        rule = count(ClassificationMethod::Rule),
        history = count(ClassificationMethod::History),
        ai = count(ClassificationMethod::Ai),
        unresolved = results.iter().filter(|c| c.category_id.is_none()).count(),
        "classified batch"
    );
    results
}

/// Card accounts: learned history only, matched by containment. Rules and
/// the generator are not consulted.
pub fn classify_history_only(
    description: &str,
    history: &[LearnedPattern],
    config: &CascadeConfig,
) -> Classification {
    match history::lookup(
        description,
        history,
        HistoryLookup::Contains,
        config.history_min_confidence,
    ) {
        HistoryOutcome::Accepted(hit) => hit,
        HistoryOutcome::Suggested(id) => Classification::unresolved(Some(id)),
        HistoryOutcome::NoMatch => Classification::unresolved(None),
    }
}
