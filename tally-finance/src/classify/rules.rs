//! Deterministic rule tier.

use tally_core::{normalize_text, ClassificationMethod, ClassificationRule};

use super::{Classification, RULE_CONFIDENCE};

#[derive(Debug)]
struct CompiledRule<'a> {
    rule: &'a ClassificationRule,
    patterns: Vec<String>,
}

/// Active rules, highest priority first, with sub-patterns normalized once.
#[derive(Debug)]
pub struct RuleSet<'a> {
    rules: Vec<CompiledRule<'a>>,
}

impl<'a> RuleSet<'a> {
    pub fn new(rules: &'a [ClassificationRule]) -> Self {
        let mut compiled: Vec<CompiledRule<'a>> = rules
            .iter()
            .filter(|r| r.is_active)
            .map(|rule| CompiledRule {
                rule,
                patterns: rule.sub_patterns().map(normalize_text).collect(),
            })
            .filter(|c| !c.patterns.is_empty())
            .collect();
        // Stable, so equal priorities keep the caller's order.
        compiled.sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority));
        Self { rules: compiled }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First matching rule, if any. `amount` is compared by absolute value.
    pub fn classify(
        &self,
        description: &str,
        amount: i64,
        account_id: Option<i64>,
    ) -> Option<Classification> {
        let text = normalize_text(description);
        let hit = self.rules.iter().find(|c| {
            c.rule.applies_to_account(account_id)
                && c.patterns.iter().any(|p| c.rule.match_mode.matches(&text, p))
                && c.rule.amount_in_range(amount)
        })?;

        tracing::debug!(rule = hit.rule.id, description, "rule matched");
        Some(Classification {
            transaction_type: hit.rule.transaction_type,
            ..Classification::resolved(hit.rule.category_id, ClassificationMethod::Rule, RULE_CONFIDENCE)
        })
    }
}
