//! tally-core: transaction model and the text, money and date normalizers
//! shared by the statement parsers and the review pipeline.

pub mod dates;
pub mod error;
pub mod installment;
pub mod model;
pub mod money;
pub mod text;

pub use dates::{parse_date, parse_month_year, shift_months};
pub use error::{CoreError, Result};
pub use installment::{
    detect_installment, installment_payment_date, original_purchase_date, InstallmentInfo,
};
pub use model::{
    AccountInfo, Category, ClassificationMethod, ClassificationRule, ClassificationStatus,
    LearnedPattern, MatchMode, ParsedTransaction, SourceFormat, StoredTransaction,
    TransactionType,
};
pub use money::{format_cents, parse_currency_to_cents};
pub use text::{normalize_description, normalize_text, strip_accents};
