//! Generative tier: ask a text model to pick one catalog entry.

use std::future::Future;

use tally_core::{format_cents, Category, ClassificationMethod};

use super::{Classification, AI_CONFIDENCE};

/// Anything that can answer a single system + user prompt with text.
pub trait TextGenerator {
    fn generate(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = anyhow::Result<String>> + Send;
}

/// Stand-in for callers that run without a text model; every call fails,
/// so the tier always passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGenerator;

impl TextGenerator for NoGenerator {
    async fn generate(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
        anyhow::bail!("no text generator configured")
    }
}

/// System and user prompts for one description.
pub fn build_prompts(categories: &[Category], description: &str, amount: i64) -> (String, String) {
    let mut system = String::from(
        "You categorize bank statement entries. Reply with exactly one category \
         name from the list below, copied verbatim, on a single line, with no \
         other text.\n\nCategories:\n",
    );
    for category in categories {
        system.push_str("- ");
        system.push_str(&category.rendered_name());
        system.push('\n');
    }
    let user = format!(
        "Description: {}\nAmount: {}",
        description.trim(),
        format_cents(amount.saturating_abs())
    );
    (system, user)
}

/// Map a model answer back to a category id. Only the first non-empty line
/// counts, and it must equal a rendered name ignoring case.
pub fn match_answer(answer: &str, categories: &[Category]) -> Option<i64> {
    let line = answer.lines().map(str::trim).find(|l| !l.is_empty())?;
    let wanted = line.to_lowercase();
    categories
        .iter()
        .find(|c| c.rendered_name().to_lowercase() == wanted)
        .map(|c| c.id)
}

/// `None` on any failure: empty catalog, transport error or an answer that
/// names no category.
pub async fn classify_with_generator<G: TextGenerator>(
    generator: &G,
    categories: &[Category],
    description: &str,
    amount: i64,
) -> Option<Classification> {
    if categories.is_empty() {
        return None;
    }
    let (system, user) = build_prompts(categories, description, amount);
    let answer = match generator.generate(&system, &user).await {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!(description, error = %e, "category generator failed");
            return None;
        }
    };
    match match_answer(&answer, categories) {
        Some(id) => Some(Classification::resolved(id, ClassificationMethod::Ai, AI_CONFIDENCE)),
        None => {
            tracing::warn!(description, answer = answer.as_str(), "generator answer matched no category");
            None
        }
    }
}
