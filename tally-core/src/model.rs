//! Transaction, rule, history and catalog types exchanged between the
//! parsers, the review pipeline and whatever stores the results.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::installment::{installment_payment_date, original_purchase_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// Positive amounts are income; zero and negative are expenses.
    pub fn from_signed(amount: i64) -> Self {
        if amount > 0 {
            TransactionType::Income
        } else {
            TransactionType::Expense
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

/// Which parser produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Ofx,
    BankStatement,
    CashLedger,
    CardStatement,
    RevenueSummary,
}

/// A statement line after parsing, before review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub description: String,
    /// Absolute value in cents; the sign lives in `transaction_type`.
    pub amount: i64,
    pub transaction_type: TransactionType,
    pub purchase_date: NaiveDate,
    pub payment_date: NaiveDate,
    pub is_installment: bool,
    pub installment_number: Option<u32>,
    pub installment_total: Option<u32>,
    /// Only set for installments.
    pub original_purchase_date: Option<NaiveDate>,
    /// Bank-issued unique id (OFX FITID).
    pub bank_id: Option<String>,
    pub source_format: SourceFormat,
    pub source_file_name: String,
}

impl ParsedTransaction {
    /// A single-payment record dated `date`. `amount` is stored as its
    /// absolute value.
    pub fn new(
        description: impl Into<String>,
        amount: i64,
        transaction_type: TransactionType,
        date: NaiveDate,
        source_format: SourceFormat,
        source_file_name: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.saturating_abs(),
            transaction_type,
            purchase_date: date,
            payment_date: date,
            is_installment: false,
            installment_number: None,
            installment_total: None,
            original_purchase_date: None,
            bank_id: None,
            source_format,
            source_file_name: source_file_name.into(),
        }
    }

    pub fn with_bank_id(mut self, bank_id: Option<String>) -> Self {
        self.bank_id = bank_id.filter(|id| !id.trim().is_empty());
        self
    }

    /// Mark as installment `current` of `total` when the record's date is the
    /// day this installment was charged (OFX posted date). The purchase date
    /// is reconstructed backwards.
    pub fn with_installment_paid_on(mut self, current: u32, total: u32) -> Option<Self> {
        let original = original_purchase_date(self.payment_date, current)?;
        self.purchase_date = original;
        self.original_purchase_date = Some(original);
        self.is_installment = true;
        self.installment_number = Some(current);
        self.installment_total = Some(total);
        Some(self)
    }

    /// Mark as installment `current` of `total` when the record's date is the
    /// original purchase date (card exports). The payment date is projected
    /// forwards.
    pub fn with_installment_bought_on(mut self, current: u32, total: u32) -> Option<Self> {
        let original = self.purchase_date;
        self.payment_date = installment_payment_date(original, current)?;
        self.original_purchase_date = Some(original);
        self.is_installment = true;
        self.installment_number = Some(current);
        self.installment_total = Some(total);
        Some(self)
    }

    /// Amount with its economic sign (expenses negative).
    pub fn signed_amount(&self) -> i64 {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

impl AsRef<ParsedTransaction> for ParsedTransaction {
    fn as_ref(&self) -> &ParsedTransaction {
        self
    }
}

/// Header data from a structured statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub bank_id: Option<String>,
    pub account_id: Option<String>,
    pub account_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
    Rule,
    History,
    Ai,
    Manual,
}

/// Where a stored record sits in its classification lifecycle.
///
/// `Unresolved` moves to one of the four cascade outcomes; `Corrected` is only
/// reached through a human edit and can be re-entered by further edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationStatus {
    #[default]
    Unresolved,
    Ruled,
    Historied,
    AiSuggested,
    Unclassified,
    Corrected,
}

impl ClassificationStatus {
    /// Status produced by a cascade result.
    pub fn from_cascade(method: ClassificationMethod, has_category: bool) -> Self {
        match (method, has_category) {
            (ClassificationMethod::Rule, true) => ClassificationStatus::Ruled,
            (ClassificationMethod::History, true) => ClassificationStatus::Historied,
            (ClassificationMethod::Ai, true) => ClassificationStatus::AiSuggested,
            _ => ClassificationStatus::Unclassified,
        }
    }
}

/// A record as the storage collaborator keeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTransaction {
    pub id: i64,
    pub account_id: i64,
    #[serde(flatten)]
    pub transaction: ParsedTransaction,
    pub category_id: Option<i64>,
    pub suggested_category_id: Option<i64>,
    pub classification_method: ClassificationMethod,
    #[serde(default)]
    pub status: ClassificationStatus,
    #[serde(default)]
    pub is_ignored: bool,
}

impl StoredTransaction {
    pub fn toggle_ignored(&mut self) {
        self.is_ignored = !self.is_ignored;
    }

    /// Record a human category assignment. Any pending suggestion is
    /// consumed. Callers must also feed the pair back into the learned
    /// history.
    pub fn correct_category(&mut self, category_id: i64) {
        self.category_id = Some(category_id);
        self.suggested_category_id = None;
        self.classification_method = ClassificationMethod::Manual;
        self.status = ClassificationStatus::Corrected;
    }
}

impl AsRef<ParsedTransaction> for StoredTransaction {
    fn as_ref(&self) -> &ParsedTransaction {
        &self.transaction
    }
}

/// How a rule's sub-patterns are compared against a description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Contains,
    StartsWith,
    EndsWith,
    Exact,
}

impl MatchMode {
    /// Both sides are expected to be normalized already.
    pub fn matches(&self, text: &str, pattern: &str) -> bool {
        match self {
            MatchMode::Contains => text.contains(pattern),
            MatchMode::StartsWith => text.starts_with(pattern),
            MatchMode::EndsWith => text.ends_with(pattern),
            MatchMode::Exact => text == pattern,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub id: i64,
    /// One or more sub-patterns joined by `;`; any of them may match.
    pub pattern: String,
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Higher is evaluated first.
    #[serde(default)]
    pub priority: i32,
    /// Restricts the rule to one account when set.
    pub account_id: Option<i64>,
    /// Inclusive bounds on the absolute amount, in cents.
    pub min_amount: Option<i64>,
    pub max_amount: Option<i64>,
    pub category_id: i64,
    pub transaction_type: Option<TransactionType>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ClassificationRule {
    pub fn sub_patterns(&self) -> impl Iterator<Item = &str> {
        self.pattern.split(';').map(str::trim).filter(|p| !p.is_empty())
    }

    pub fn applies_to_account(&self, account_id: Option<i64>) -> bool {
        match self.account_id {
            None => true,
            Some(scope) => account_id == Some(scope),
        }
    }

    pub fn amount_in_range(&self, amount: i64) -> bool {
        let amount = amount.saturating_abs();
        self.min_amount.is_none_or(|min| amount >= min)
            && self.max_amount.is_none_or(|max| amount <= max)
    }
}

/// A human-confirmed (description, category) pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedPattern {
    pub description: String,
    pub category_id: i64,
    pub usage_count: u32,
    pub last_used_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub subcategory: Option<String>,
}

impl Category {
    /// `name` or `name > subcategory`.
    pub fn rendered_name(&self) -> String {
        match &self.subcategory {
            Some(sub) if !sub.trim().is_empty() => format!("{} > {}", self.name, sub),
            _ => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rule(pattern: &str) -> ClassificationRule {
        ClassificationRule {
            id: 1,
            pattern: pattern.to_string(),
            match_mode: MatchMode::Contains,
            priority: 0,
            account_id: None,
            min_amount: None,
            max_amount: None,
            category_id: 10,
            transaction_type: None,
            is_active: true,
        }
    }

    #[test]
    fn test_amount_stored_absolute() {
        let tx = ParsedTransaction::new(
            "PADARIA",
            -1250,
            TransactionType::Expense,
            d(2024, 9, 10),
            SourceFormat::Ofx,
            "extrato.ofx",
        );
        assert_eq!(tx.amount, 1250);
        assert_eq!(tx.signed_amount(), -1250);
    }

    #[test]
    fn test_installment_paid_on_reconstructs_purchase() {
        let tx = ParsedTransaction::new(
            "UBER",
            4500,
            TransactionType::Expense,
            d(2024, 9, 10),
            SourceFormat::Ofx,
            "extrato.ofx",
        )
        .with_installment_paid_on(3, 6)
        .unwrap();
        assert_eq!(tx.original_purchase_date, Some(d(2024, 7, 10)));
        assert_eq!(tx.purchase_date, d(2024, 7, 10));
        assert_eq!(tx.payment_date, d(2024, 9, 10));
    }

    #[test]
    fn test_installment_bought_on_projects_payment() {
        let tx = ParsedTransaction::new(
            "LOJA",
            10000,
            TransactionType::Expense,
            d(2024, 7, 10),
            SourceFormat::CardStatement,
            "fatura.csv",
        )
        .with_installment_bought_on(3, 6)
        .unwrap();
        assert_eq!(tx.payment_date, d(2024, 9, 10));
        assert_eq!(tx.original_purchase_date, Some(d(2024, 7, 10)));
    }

    #[test]
    fn test_match_modes() {
        assert!(MatchMode::Contains.matches("99pop viagem", "99pop"));
        assert!(MatchMode::StartsWith.matches("uber trip", "uber"));
        assert!(!MatchMode::StartsWith.matches("pay uber", "uber"));
        assert!(MatchMode::EndsWith.matches("pay uber", "uber"));
        assert!(MatchMode::Exact.matches("uber", "uber"));
        assert!(!MatchMode::Exact.matches("uber trip", "uber"));
    }

    #[test]
    fn test_rule_amount_range_inclusive() {
        let mut r = rule("x");
        r.min_amount = Some(1000);
        r.max_amount = Some(5000);
        assert!(r.amount_in_range(1000));
        assert!(r.amount_in_range(-5000));
        assert!(!r.amount_in_range(5001));
        assert!(!r.amount_in_range(999));
    }

    #[test]
    fn test_rule_sub_patterns() {
        let r = rule("UBER; 99POP ;;");
        assert_eq!(r.sub_patterns().collect::<Vec<_>>(), vec!["UBER", "99POP"]);
    }

    #[test]
    fn test_rule_deserializes_with_defaults() {
        let r: ClassificationRule = serde_json::from_str(
            r#"{"id":3,"pattern":"IFOOD","account_id":null,"min_amount":null,
                "max_amount":null,"category_id":7,"transaction_type":"expense"}"#,
        )
        .unwrap();
        assert_eq!(r.match_mode, MatchMode::Contains);
        assert!(r.is_active);
        assert_eq!(r.transaction_type, Some(TransactionType::Expense));
    }

    #[test]
    fn test_rendered_category_name() {
        let plain = Category { id: 1, name: "Transporte".into(), subcategory: None };
        let nested = Category {
            id: 2,
            name: "Alimentação".into(),
            subcategory: Some("Restaurantes".into()),
        };
        assert_eq!(plain.rendered_name(), "Transporte");
        assert_eq!(nested.rendered_name(), "Alimentação > Restaurantes");
    }

    #[test]
    fn test_correct_category_consumes_suggestion() {
        let mut stored: StoredTransaction = serde_json::from_str(
            r#"{"id":1,"account_id":2,"description":"PADARIA","amount":1250,
                "transaction_type":"expense","purchase_date":"2024-09-10",
                "payment_date":"2024-09-10","is_installment":false,
                "installment_number":null,"installment_total":null,
                "original_purchase_date":null,"bank_id":null,
                "source_format":"bank_statement","source_file_name":"extrato.csv",
                "category_id":null,"suggested_category_id":4,
                "classification_method":"manual"}"#,
        )
        .unwrap();
        assert_eq!(stored.status, ClassificationStatus::Unresolved);
        assert!(!stored.is_ignored);

        stored.correct_category(9);
        assert_eq!(stored.category_id, Some(9));
        assert_eq!(stored.suggested_category_id, None);
        assert_eq!(stored.status, ClassificationStatus::Corrected);

        stored.toggle_ignored();
        assert!(stored.is_ignored);
    }

    #[test]
    fn test_status_from_cascade() {
        assert_eq!(
            ClassificationStatus::from_cascade(ClassificationMethod::Rule, true),
            ClassificationStatus::Ruled
        );
        assert_eq!(
            ClassificationStatus::from_cascade(ClassificationMethod::Manual, false),
            ClassificationStatus::Unclassified
        );
    }
}
