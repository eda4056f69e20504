//! Credit-card invoice export ("fatura").
//!
//!   Nº,Data,Descrição,Valor,Tipo,Cartão
//!   1,10/07/2024,MAGAZINE LUIZA 3/6,"150,00",D,final 1234
//!   2,02/09/2024,ESTORNO NETFLIX,"39,90",C,final 1234
//!
//! The `Tipo` column says credit (`C`) or debit (`D`) explicitly, so the
//! amount column is read as a magnitude. When the flag is blank the card
//! convention applies (positive = purchase). The date column is the original
//! purchase date; installment rows get their charge date projected forward.

use tally_core::{
    detect_installment, parse_currency_to_cents, parse_date, normalize_text, ParsedTransaction,
    SourceFormat, TransactionType,
};

use crate::delimited::{read_rows, Row};
use crate::sign::{normalize_sign, SignSource};
use crate::types::ParseResult;

const HEADER_KEYWORDS: &[&str] = &["nº", "n°", "numero", "#"];
const MIN_COLUMNS: usize = 5;

fn flag_type(flag: &str, cents: i64) -> Result<(i64, TransactionType), String> {
    let flag = normalize_text(flag);
    if flag.is_empty() {
        let signed = normalize_sign(cents, SignSource::CreditCard);
        return Ok((signed.amount, signed.transaction_type));
    }
    match flag.chars().next() {
        Some('c') => Ok((cents.saturating_abs(), TransactionType::Income)),
        Some('d') => Ok((cents.saturating_abs().saturating_neg(), TransactionType::Expense)),
        _ => Err(format!("unknown credit/debit flag {flag:?}")),
    }
}

fn parse_row(row: &Row, file_name: &str) -> Result<ParsedTransaction, String> {
    if row.fields.len() < MIN_COLUMNS {
        return Err(format!(
            "expected at least {MIN_COLUMNS} columns, found {}",
            row.fields.len()
        ));
    }
    let date = parse_date(row.field(1)).map_err(|e| e.to_string())?;
    let raw_description = row.field(2);
    if raw_description.is_empty() {
        return Err("missing description".to_string());
    }
    let cents = parse_currency_to_cents(row.field(3)).map_err(|e| e.to_string())?;
    let (amount, transaction_type) = flag_type(row.field(4), cents)?;

    let installment = detect_installment(raw_description);
    let tx = ParsedTransaction::new(
        installment.clean_description.clone(),
        amount,
        transaction_type,
        date,
        SourceFormat::CardStatement,
        file_name,
    );
    match (installment.current, installment.total) {
        (Some(current), Some(total)) => tx
            .with_installment_bought_on(current, total)
            .ok_or_else(|| "installment date out of range".to_string()),
        _ => Ok(tx),
    }
}

pub fn parse_card_statement(content: &str, file_name: &str) -> ParseResult {
    let mut result = ParseResult::default();

    for (i, row) in read_rows(content, b',').into_iter().enumerate() {
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                result.push_error(e);
                continue;
            }
        };
        if i == 0 && row.mentions_any(HEADER_KEYWORDS) && parse_date(row.field(1)).is_err() {
            continue;
        }
        match parse_row(&row, file_name) {
            Ok(tx) => result.transactions.push(tx),
            Err(e) => result.push_error(format!("line {}: {e}", row.line)),
        }
    }

    tracing::info!(
        file = file_name,
        parsed = result.transactions.len(),
        errors = result.errors.len(),
        "parsed card statement"
    );
    result
}
