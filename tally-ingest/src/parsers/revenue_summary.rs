//! Monthly revenue summary ("faturamento") with one column per payment
//! channel:
//!
//!   Mês;PIX;Crédito;Débito;Dinheiro
//!   01/2024;1.500,00;3.200,50;800,00;150,00
//!   01/02/2024;1.250,00;0,00;;90,00
//!
//! Every non-zero channel cell becomes one income record dated on the first
//! day of the month. Blank cells mean no revenue on that channel.

use chrono::NaiveDate;
use tally_core::{
    parse_currency_to_cents, parse_month_year, ParsedTransaction, SourceFormat, TransactionType,
};

use crate::delimited::read_rows;
use crate::types::ParseResult;

const HEADER_KEYWORDS: &[&str] = &["mes", "competencia"];

/// Channel columns, in file order after the month column.
pub const CHANNELS: [&str; 4] = ["PIX", "Crédito", "Débito", "Dinheiro"];

fn channel_record(
    channel: &str,
    month: NaiveDate,
    cents: i64,
    file_name: &str,
) -> ParsedTransaction {
    ParsedTransaction::new(
        format!("Receita {channel} {}", month.format("%m/%Y")),
        cents,
        TransactionType::Income,
        month,
        SourceFormat::RevenueSummary,
        file_name,
    )
}

pub fn parse_revenue_summary(content: &str, file_name: &str) -> ParseResult {
    let mut result = ParseResult::default();

    for (i, row) in read_rows(content, b';').into_iter().enumerate() {
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                result.push_error(e);
                continue;
            }
        };
        if i == 0 && row.mentions_any(HEADER_KEYWORDS) {
            continue;
        }

        let month = match parse_month_year(row.field(0)) {
            Ok(m) => m,
            Err(e) => {
                result.push_error(format!("line {}: {e}", row.line));
                continue;
            }
        };

        for (offset, channel) in CHANNELS.iter().enumerate() {
            let cell = row.field(offset + 1);
            if cell.is_empty() {
                continue;
            }
            match parse_currency_to_cents(cell) {
                Ok(0) => {}
                Ok(cents) => result
                    .transactions
                    .push(channel_record(channel, month, cents, file_name)),
                Err(e) => result.push_error(format!("line {} ({channel}): {e}", row.line)),
            }
        }
    }

    tracing::info!(
        file = file_name,
        parsed = result.transactions.len(),
        errors = result.errors.len(),
        "parsed revenue summary"
    );
    result
}
