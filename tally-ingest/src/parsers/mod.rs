pub mod card_statement;
pub mod ofx;
pub mod revenue_summary;
pub mod three_column;

pub use card_statement::parse_card_statement;
pub use ofx::parse_ofx;
pub use revenue_summary::parse_revenue_summary;
pub use three_column::{parse_bank_statement, parse_cash_ledger};
