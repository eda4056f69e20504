//! Sign conventions per account source.
//!
//! Checking and savings exports already use the economic sign. Cash-ledger
//! rows are withdrawals no matter how they are written. Card issuers report
//! purchases as positive numbers, which for us are expenses, so the sign is
//! inverted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tally_core::TransactionType;

use crate::error::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignSource {
    Checking,
    Savings,
    Cash,
    CreditCard,
}

impl SignSource {
    pub fn tag(&self) -> &'static str {
        match self {
            SignSource::Checking => "checking",
            SignSource::Savings => "savings",
            SignSource::Cash => "cash",
            SignSource::CreditCard => "credit_card",
        }
    }
}

impl fmt::Display for SignSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SignSource {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "checking" => Ok(SignSource::Checking),
            "savings" => Ok(SignSource::Savings),
            "cash" => Ok(SignSource::Cash),
            "credit_card" => Ok(SignSource::CreditCard),
            _ => Err(IngestError::UnsupportedSource(s.to_string())),
        }
    }
}

/// Amount carrying its economic sign, plus the type that sign implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedAmount {
    pub amount: i64,
    pub transaction_type: TransactionType,
}

impl SignedAmount {
    fn from_signed(amount: i64) -> Self {
        Self {
            amount,
            transaction_type: TransactionType::from_signed(amount),
        }
    }
}

pub fn normalize_sign(raw: i64, source: SignSource) -> SignedAmount {
    match source {
        SignSource::Checking | SignSource::Savings => SignedAmount::from_signed(raw),
        SignSource::Cash => SignedAmount {
            amount: raw.saturating_abs().saturating_neg(),
            transaction_type: TransactionType::Expense,
        },
        SignSource::CreditCard => SignedAmount::from_signed(raw.saturating_neg()),
    }
}

/// [`normalize_sign`] for a source given as its tag. An unknown tag is an
/// error rather than a guess.
pub fn normalize_sign_tag(raw: i64, tag: &str) -> Result<SignedAmount, IngestError> {
    Ok(normalize_sign(raw, tag.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_sources_pass_through() {
        let s = normalize_sign(-4500, SignSource::Checking);
        assert_eq!(s.amount, -4500);
        assert_eq!(s.transaction_type, TransactionType::Expense);

        let s = normalize_sign(120000, SignSource::Savings);
        assert_eq!(s.amount, 120000);
        assert_eq!(s.transaction_type, TransactionType::Income);
    }

    #[test]
    fn test_cash_is_always_expense() {
        for raw in [5000, -5000] {
            let s = normalize_sign(raw, SignSource::Cash);
            assert_eq!(s.amount, -5000);
            assert_eq!(s.transaction_type, TransactionType::Expense);
        }
    }

    #[test]
    fn test_credit_card_inverts() {
        let purchase = normalize_sign(4500, SignSource::CreditCard);
        assert_eq!(purchase.amount, -4500);
        assert_eq!(purchase.transaction_type, TransactionType::Expense);

        let refund = normalize_sign(-4500, SignSource::CreditCard);
        assert_eq!(refund.amount, 4500);
        assert_eq!(refund.transaction_type, TransactionType::Income);
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let s = normalize_sign(i64::MIN, SignSource::CreditCard);
        assert_eq!(s.amount, i64::MAX);
        assert_eq!(normalize_sign(i64::MIN, SignSource::Cash).amount, -i64::MAX);
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        assert_eq!(
            normalize_sign_tag(100, "investment"),
            Err(IngestError::UnsupportedSource("investment".to_string()))
        );
        assert!(normalize_sign_tag(100, "CREDIT_CARD").is_ok());
    }
}
