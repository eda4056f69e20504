//! `date;description;amount` exports.
//!
//! Two files share this layout:
//!   - bank statements, where the amount carries its natural sign
//!       Data;Descrição;Valor
//!       10/09/2024;PIX RECEBIDO JOAO;150,00
//!       11/09/2024;SUPERMERCADO EXTRA;-50,00
//!   - the cash ledger of withdrawals, where every row is an expense
//!       Data;Histórico;Valor
//!       12/09/2024;Feira;80,00

use tally_core::{parse_currency_to_cents, parse_date, ParsedTransaction, SourceFormat};

use crate::delimited::{read_rows, Row};
use crate::sign::{normalize_sign, SignSource};
use crate::types::ParseResult;

const HEADER_KEYWORDS: &[&str] = &["data"];

fn parse_row(
    row: &Row,
    file_name: &str,
    format: SourceFormat,
    source: SignSource,
) -> Result<ParsedTransaction, String> {
    if row.fields.len() < 3 {
        return Err(format!("expected 3 columns, found {}", row.fields.len()));
    }
    let date = parse_date(row.field(0)).map_err(|e| e.to_string())?;
    let description = row.field(1);
    if description.is_empty() {
        return Err("missing description".to_string());
    }
    let cents = parse_currency_to_cents(row.field(2)).map_err(|e| e.to_string())?;
    let signed = normalize_sign(cents, source);

    Ok(ParsedTransaction::new(
        description,
        signed.amount,
        signed.transaction_type,
        date,
        format,
        file_name,
    ))
}

fn parse_dated_rows(
    content: &str,
    file_name: &str,
    format: SourceFormat,
    source: SignSource,
) -> ParseResult {
    let mut result = ParseResult::default();

    for (i, row) in read_rows(content, b';').into_iter().enumerate() {
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                result.push_error(e);
                continue;
            }
        };
        if i == 0 && row.mentions_any(HEADER_KEYWORDS) && parse_date(row.field(0)).is_err() {
            continue;
        }
        match parse_row(&row, file_name, format, source) {
            Ok(tx) => result.transactions.push(tx),
            Err(e) => result.push_error(format!("line {}: {e}", row.line)),
        }
    }

    tracing::info!(
        file = file_name,
        ?format,
        parsed = result.transactions.len(),
        errors = result.errors.len(),
        "parsed delimited statement"
    );
    result
}

/// Bank-account export; `source` is normally [`SignSource::Checking`].
pub fn parse_bank_statement(content: &str, file_name: &str, source: SignSource) -> ParseResult {
    parse_dated_rows(content, file_name, SourceFormat::BankStatement, source)
}

/// Cash-withdrawal ledger; every row becomes an expense.
pub fn parse_cash_ledger(content: &str, file_name: &str) -> ParseResult {
    parse_dated_rows(content, file_name, SourceFormat::CashLedger, SignSource::Cash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_core::TransactionType;

    #[test]
    fn test_bank_statement_natural_sign() {
        let csv = "Data;Descrição;Valor\n\
                   10/09/2024;PIX RECEBIDO JOAO;150,00\n\
                   11/09/2024;SUPERMERCADO EXTRA;-50,00\n";
        let result = parse_bank_statement(csv, "extrato.csv", SignSource::Checking);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.transactions.len(), 2);

        let pix = &result.transactions[0];
        assert_eq!(pix.transaction_type, TransactionType::Income);
        assert_eq!(pix.amount, 15000);
        assert_eq!(pix.source_format, SourceFormat::BankStatement);

        let market = &result.transactions[1];
        assert_eq!(market.transaction_type, TransactionType::Expense);
        assert_eq!(market.amount, 5000);
        assert_eq!(market.payment_date, NaiveDate::from_ymd_opt(2024, 9, 11).unwrap());
    }

    #[test]
    fn test_bad_lines_are_reported_not_fatal() {
        let csv = "10/09/2024;PADARIA;-12,50\n\
                   99/99/2024;QUEBRADO;-1,00\n\
                   12/09/2024;;-3,00\n\
                   13/09/2024;FARMACIA;abc\n\
                   14/09/2024;CURTO\n\
                   15/09/2024;MERCADO;-20,00\n";
        let result = parse_bank_statement(csv, "extrato.csv", SignSource::Checking);
        assert_eq!(result.transactions.len(), 2);
        assert_eq!(result.errors.len(), 4);
        assert!(result.errors[0].starts_with("line 2:"));
        assert!(result.errors[1].contains("missing description"));
    }

    #[test]
    fn test_headerless_file_keeps_first_row() {
        let csv = "10/09/2024;PADARIA;-12,50\n";
        let result = parse_bank_statement(csv, "extrato.csv", SignSource::Checking);
        assert_eq!(result.transactions.len(), 1);
    }

    #[test]
    fn test_keyword_in_first_data_row_is_not_a_header() {
        let csv = "10/09/2024;DATAPREV;-10,00\n11/09/2024;PADARIA;-2,00\n";
        let result = parse_bank_statement(csv, "extrato.csv", SignSource::Checking);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.transactions.len(), 2);
        assert_eq!(result.transactions[0].description, "DATAPREV");
    }

    #[test]
    fn test_huge_amount_is_one_bad_line() {
        let csv = "10/09/2024;PADARIA;-12,50\n\
                   11/09/2024;QUEBRADO;-99999999999999999999,00\n\
                   12/09/2024;MERCADO;-20,00\n";
        for source in [SignSource::Checking, SignSource::CreditCard] {
            let result = parse_bank_statement(csv, "extrato.csv", source);
            assert_eq!(result.transactions.len(), 2);
            assert_eq!(result.errors.len(), 1);
            assert!(result.errors[0].starts_with("line 2:"));
            assert!(result.transactions.iter().all(|tx| tx.amount > 0));
        }
        let cash = parse_cash_ledger(csv, "caixa.csv");
        assert_eq!(cash.transactions.len(), 2);
        assert_eq!(cash.errors.len(), 1);
    }

    #[test]
    fn test_cash_ledger_forces_expense() {
        let csv = "Data;Histórico;Valor\n12/09/2024;Feira;80,00\n13/09/2024;Gás;-120,00\n";
        let result = parse_cash_ledger(csv, "caixa_setembro.csv");
        assert_eq!(result.transactions.len(), 2);
        for tx in &result.transactions {
            assert_eq!(tx.transaction_type, TransactionType::Expense);
            assert_eq!(tx.source_format, SourceFormat::CashLedger);
            assert_eq!(tx.source_file_name, "caixa_setembro.csv");
        }
        assert_eq!(result.transactions[1].amount, 12000);
    }
}
