//! Installment ("parcela") markers in card descriptions.
//!
//! Card issuers append the parcel position to the merchant text:
//!   LOJA X (3/10)      UBER 3/6      NETSHOES 2 DE 5      MAGALU PARC03/12
//! The detector strips the marker and reports `current`/`total`; the two date
//! helpers move between the original purchase date and the date a given
//! installment is charged.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::dates::shift_months;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentInfo {
    pub is_installment: bool,
    pub current: Option<u32>,
    pub total: Option<u32>,
    /// Description with the marker removed and trimmed.
    pub clean_description: String,
}

impl InstallmentInfo {
    fn none(description: &str) -> Self {
        Self {
            is_installment: false,
            current: None,
            total: None,
            clean_description: description.trim().to_string(),
        }
    }
}

fn patterns() -> &'static [Regex; 4] {
    static RE: OnceLock<[Regex; 4]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            Regex::new(r"\((\d{1,3})\s*/\s*(\d{1,3})\)").expect("invalid paren regex"),
            Regex::new(r"(?:^|\s)(\d{1,3})/(\d{1,3})(?:\s|$)").expect("invalid bare regex"),
            Regex::new(r"(?i)\b(\d{1,3})\s+de\s+(\d{1,3})\b").expect("invalid 'de' regex"),
            Regex::new(r"(?i)\bparc\.?\s*(\d{1,3})/(\d{1,3})\b").expect("invalid parc regex"),
        ]
    })
}

fn numbers(caps: &Captures<'_>) -> Option<(u32, u32)> {
    let current: u32 = caps.get(1)?.as_str().parse().ok()?;
    let total: u32 = caps.get(2)?.as_str().parse().ok()?;
    (current >= 1 && current <= total).then_some((current, total))
}

/// Detect an installment marker. Patterns are tried in order
/// `(n/m)`, bare `n/m`, `n DE m`, `PARC n/m`; a match only counts when
/// `1 <= n <= m`.
pub fn detect_installment(description: &str) -> InstallmentInfo {
    for (i, re) in patterns().iter().enumerate() {
        let Some(caps) = re.captures(description) else {
            continue;
        };
        let Some((current, total)) = numbers(&caps) else {
            continue;
        };

        // The bare pattern anchors on surrounding whitespace; only the
        // digits themselves are cut so neighbouring words stay separated.
        let span = if i == 1 {
            match (caps.get(1), caps.get(2)) {
                (Some(a), Some(b)) => a.start()..b.end(),
                _ => continue,
            }
        } else {
            match caps.get(0) {
                Some(m) => m.range(),
                None => continue,
            }
        };

        let mut clean = String::with_capacity(description.len());
        clean.push_str(&description[..span.start]);
        clean.push(' ');
        clean.push_str(&description[span.end..]);

        return InstallmentInfo {
            is_installment: true,
            current: Some(current),
            total: Some(total),
            clean_description: clean.split_whitespace().collect::<Vec<_>>().join(" "),
        };
    }

    InstallmentInfo::none(description)
}

/// Date of the original purchase, given the date installment `current` was
/// charged.
pub fn original_purchase_date(payment_date: NaiveDate, current: u32) -> Option<NaiveDate> {
    let back = i32::try_from(current.saturating_sub(1)).ok()?;
    shift_months(payment_date, -back)
}

/// Date installment `current` is charged, given the original purchase date.
pub fn installment_payment_date(original: NaiveDate, current: u32) -> Option<NaiveDate> {
    let forward = i32::try_from(current.saturating_sub(1)).ok()?;
    shift_months(original, forward)
}
