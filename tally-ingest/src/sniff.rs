//! Pick a parser for an uploaded file.
//!
//! OFX is recognised by extension or by its markup. Delimited exports all
//! share the `.csv` extension, so the variant comes from words in the file
//! name, with the plain bank statement as the fallback.

use std::path::Path;

use tally_core::{normalize_text, SourceFormat};

use crate::error::IngestError;
use crate::parsers::{
    parse_bank_statement, parse_card_statement, parse_cash_ledger, parse_ofx,
    parse_revenue_summary,
};
use crate::sign::SignSource;
use crate::types::ParseResult;

const REVENUE_HINTS: &[&str] = &["receita", "faturamento"];
const CASH_HINTS: &[&str] = &["caixa", "saque"];
const CARD_HINTS: &[&str] = &["fatura", "cartao"];

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn looks_like_ofx(content: &str) -> bool {
    let upper = content.to_ascii_uppercase();
    upper.contains("<OFX>") || upper.contains("<STMTTRN>")
}

fn hinted(name: &str, hints: &[&str]) -> bool {
    hints.iter().any(|h| name.contains(h))
}

/// Decide which parser handles a file; `None` for unsupported files.
pub fn detect_format(file_name: &str, content: &str) -> Option<SourceFormat> {
    let ext = extension(file_name);
    if ext.as_deref() == Some("ofx") || looks_like_ofx(content) {
        return Some(SourceFormat::Ofx);
    }
    if ext.as_deref() != Some("csv") {
        return None;
    }

    let name = normalize_text(file_name);
    // "faturamento" also contains "fatura", so revenue goes first.
    let format = if hinted(&name, REVENUE_HINTS) {
        SourceFormat::RevenueSummary
    } else if hinted(&name, CASH_HINTS) {
        SourceFormat::CashLedger
    } else if hinted(&name, CARD_HINTS) {
        SourceFormat::CardStatement
    } else {
        SourceFormat::BankStatement
    };
    Some(format)
}

fn parse_detected(file_name: &str, content: &str, source: Option<SignSource>) -> ParseResult {
    let Some(format) = detect_format(file_name, content) else {
        let ext = extension(file_name).unwrap_or_default();
        tracing::warn!(file = file_name, "unsupported statement file");
        return ParseResult::failed(format!(
            "unsupported file type {:?} for {file_name}: expected an .ofx or .csv statement",
            ext
        ));
    };
    tracing::debug!(file = file_name, ?format, "detected statement format");

    let natural = source.unwrap_or(SignSource::Checking);
    match format {
        SourceFormat::Ofx => parse_ofx(content, file_name, natural),
        SourceFormat::BankStatement => parse_bank_statement(content, file_name, natural),
        SourceFormat::CashLedger => parse_cash_ledger(content, file_name),
        SourceFormat::CardStatement => parse_card_statement(content, file_name),
        SourceFormat::RevenueSummary => parse_revenue_summary(content, file_name),
    }
}

/// Parse an uploaded statement, choosing the parser from its name and
/// content. Never fails: unsupported files give an empty result with one
/// error.
pub fn parse_file(file_name: &str, content: &str) -> ParseResult {
    parse_detected(file_name, content, None)
}

/// Like [`parse_file`], with the sign convention of the account the file
/// belongs to. OFX and bank-statement amounts are read through it; the other
/// formats carry their own convention. An unknown tag is rejected before any
/// parsing happens.
pub fn parse_file_as(
    file_name: &str,
    content: &str,
    source_tag: &str,
) -> Result<ParseResult, IngestError> {
    let source: SignSource = source_tag.parse()?;
    Ok(parse_detected(file_name, content, Some(source)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::TransactionType;

    #[test]
    fn test_unknown_extension_gives_one_error() {
        let result = parse_file("notas.txt", "10/09/2024;PADARIA;-12,50\n");
        assert!(result.transactions.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(!result.success());
    }

    #[test]
    fn test_ofx_detected_by_content() {
        let content = "<OFX><STMTTRN><DTPOSTED>20240101<TRNAMT>-1.00<MEMO>X</STMTTRN></OFX>";
        assert_eq!(detect_format("download.txt", content), Some(SourceFormat::Ofx));
        assert_eq!(parse_file("download.txt", content).transactions.len(), 1);
    }

    #[test]
    fn test_filename_hints() {
        assert_eq!(detect_format("Extrato.OFX", ""), Some(SourceFormat::Ofx));
        assert_eq!(detect_format("faturamento_2024.csv", ""), Some(SourceFormat::RevenueSummary));
        assert_eq!(detect_format("caixa_set.csv", ""), Some(SourceFormat::CashLedger));
        assert_eq!(detect_format("Fatura-Cartão.csv", ""), Some(SourceFormat::CardStatement));
        assert_eq!(detect_format("extrato.csv", ""), Some(SourceFormat::BankStatement));
        assert_eq!(detect_format("extrato.pdf", ""), None);
    }

    #[test]
    fn test_declared_source_applies_to_bank_statement() {
        let content = "10/09/2024;ESTORNO;12,50\n";
        let natural = parse_file("extrato.csv", content);
        assert_eq!(natural.transactions[0].transaction_type, TransactionType::Income);

        let card = parse_file_as("extrato.csv", content, "credit_card").unwrap();
        assert_eq!(card.transactions[0].transaction_type, TransactionType::Expense);
    }

    #[test]
    fn test_unknown_source_tag_is_fatal() {
        let err = parse_file_as("extrato.csv", "", "brokerage").unwrap_err();
        assert_eq!(err, IngestError::UnsupportedSource("brokerage".to_string()));
    }
}
