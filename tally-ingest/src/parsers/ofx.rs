//! OFX statement parser.
//!
//! Only the transaction list and the account header are read:
//!   <BANKACCTFROM><BANKID>0341<ACCTID>12345-6<ACCTTYPE>CHECKING</BANKACCTFROM>
//!   <STMTTRN>
//!     <TRNTYPE>DEBIT
//!     <DTPOSTED>20240910120000[-3:BRT]
//!     <TRNAMT>-45.00
//!     <FITID>2024091001
//!     <MEMO>UBER 3/6
//!   </STMTTRN>
//! Banks emit both SGML (unclosed leaf tags) and XML flavours; a field value
//! runs up to the next `<` or line break either way.

use std::sync::OnceLock;

use regex::Regex;
use tally_core::{
    detect_installment, parse_currency_to_cents, parse_date, AccountInfo, ParsedTransaction,
    SourceFormat,
};

use crate::sign::{normalize_sign, SignSource};
use crate::types::ParseResult;

fn block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<STMTTRN>(.*?)</STMTTRN>").expect("invalid STMTTRN regex")
    })
}

fn field<'a>(block: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag.to_ascii_uppercase());
    let upper = block.to_ascii_uppercase();
    let start = upper.find(&open)? + open.len();
    let rest = &block[start..];
    let end = rest.find(['<', '\r', '\n']).unwrap_or(rest.len());
    let value = rest[..end].trim();
    (!value.is_empty()).then_some(value)
}

fn account_info(content: &str) -> Option<AccountInfo> {
    let info = AccountInfo {
        bank_id: field(content, "BANKID").map(str::to_string),
        account_id: field(content, "ACCTID").map(str::to_string),
        account_type: field(content, "ACCTTYPE").map(str::to_string),
    };
    (info != AccountInfo::default()).then_some(info)
}

/// Parse OFX text. `source` decides how `TRNAMT` signs are read; OFX is
/// natural-signed for bank accounts.
pub fn parse_ofx(content: &str, file_name: &str, source: SignSource) -> ParseResult {
    let mut result = ParseResult {
        account_info: account_info(content),
        ..ParseResult::default()
    };

    for (i, caps) in block_re().captures_iter(content).enumerate() {
        let n = i + 1;
        let Some(block) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };

        let Some(posted) = field(block, "DTPOSTED") else {
            result.push_error(format!("transaction {n}: missing DTPOSTED"));
            continue;
        };
        let Some(raw_amount) = field(block, "TRNAMT") else {
            result.push_error(format!("transaction {n}: missing TRNAMT"));
            continue;
        };
        let Some(memo) = field(block, "MEMO").or_else(|| field(block, "NAME")) else {
            result.push_error(format!("transaction {n}: missing MEMO"));
            continue;
        };

        let compact: String = posted.chars().take(8).collect();
        let date = match parse_date(&compact) {
            Ok(d) if compact.len() == 8 => d,
            _ => {
                result.push_error(format!("transaction {n}: invalid DTPOSTED {posted:?}"));
                continue;
            }
        };
        let cents = match parse_currency_to_cents(raw_amount) {
            Ok(c) => c,
            Err(e) => {
                result.push_error(format!("transaction {n}: {e}"));
                continue;
            }
        };

        let signed = normalize_sign(cents, source);
        let installment = detect_installment(memo);
        let tx = ParsedTransaction::new(
            installment.clean_description.clone(),
            signed.amount,
            signed.transaction_type,
            date,
            SourceFormat::Ofx,
            file_name,
        )
        .with_bank_id(field(block, "FITID").map(str::to_string));

        let tx = match (installment.current, installment.total) {
            (Some(current), Some(total)) => match tx.with_installment_paid_on(current, total) {
                Some(tx) => tx,
                None => {
                    result.push_error(format!("transaction {n}: installment date out of range"));
                    continue;
                }
            },
            _ => tx,
        };
        result.transactions.push(tx);
    }

    tracing::info!(
        file = file_name,
        parsed = result.transactions.len(),
        errors = result.errors.len(),
        "parsed OFX statement"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_core::TransactionType;

    const SAMPLE: &str = r#"OFXHEADER:100
DATA:OFXSGML
<OFX>
<BANKMSGSRSV1><STMTTRNRS><STMTRS>
<BANKACCTFROM>
<BANKID>0341
<ACCTID>12345-6
<ACCTTYPE>CHECKING
</BANKACCTFROM>
<BANKTRANLIST>
<STMTTRN>
<TRNTYPE>DEBIT
<DTPOSTED>20240910120000[-3:BRT]
<TRNAMT>-45.00
<FITID>2024091001
<MEMO>UBER 3/6
</STMTTRN>
<STMTTRN>
<TRNTYPE>CREDIT
<DTPOSTED>20240905
<TRNAMT>3500,00
<FITID>2024090501
<MEMO>SALARIO ACME
</STMTTRN>
<STMTTRN>
<TRNTYPE>DEBIT
<TRNAMT>-10.00
<MEMO>SEM DATA
</STMTTRN>
</BANKTRANLIST>
</STMTRS></STMTTRNRS></BANKMSGSRSV1>
</OFX>
"#;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parses_blocks_and_skips_incomplete() {
        let result = parse_ofx(SAMPLE, "extrato.ofx", SignSource::Checking);
        assert_eq!(result.transactions.len(), 2);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("DTPOSTED"));
        assert!(result.success());
    }

    #[test]
    fn test_installment_reconstruction() {
        let result = parse_ofx(SAMPLE, "extrato.ofx", SignSource::Checking);
        let uber = &result.transactions[0];
        assert_eq!(uber.description, "UBER");
        assert_eq!(uber.amount, 4500);
        assert_eq!(uber.transaction_type, TransactionType::Expense);
        assert!(uber.is_installment);
        assert_eq!(uber.installment_number, Some(3));
        assert_eq!(uber.installment_total, Some(6));
        assert_eq!(uber.payment_date, d(2024, 9, 10));
        assert_eq!(uber.original_purchase_date, Some(d(2024, 7, 10)));
        assert_eq!(uber.bank_id.as_deref(), Some("2024091001"));
        assert_eq!(uber.source_file_name, "extrato.ofx");
    }

    #[test]
    fn test_income_and_account_info() {
        let result = parse_ofx(SAMPLE, "extrato.ofx", SignSource::Checking);
        let salary = &result.transactions[1];
        assert_eq!(salary.transaction_type, TransactionType::Income);
        assert_eq!(salary.amount, 350000);
        assert!(!salary.is_installment);

        let info = result.account_info.unwrap();
        assert_eq!(info.bank_id.as_deref(), Some("0341"));
        assert_eq!(info.account_id.as_deref(), Some("12345-6"));
        assert_eq!(info.account_type.as_deref(), Some("CHECKING"));
    }

    #[test]
    fn test_xml_flavour_and_name_fallback() {
        let xml = "<OFX><STMTTRN><DTPOSTED>20240101</DTPOSTED><TRNAMT>-9.90</TRNAMT>\
                   <NAME>SPOTIFY</NAME></STMTTRN></OFX>";
        let result = parse_ofx(xml, "a.ofx", SignSource::Checking);
        assert_eq!(result.transactions.len(), 1);
        assert_eq!(result.transactions[0].description, "SPOTIFY");
        assert_eq!(result.transactions[0].amount, 990);
        assert!(result.account_info.is_none());
    }

    #[test]
    fn test_card_source_inverts_sign() {
        let ofx = "<STMTTRN><DTPOSTED>20240101<TRNAMT>120.00<MEMO>LOJA</STMTTRN>";
        let result = parse_ofx(ofx, "card.ofx", SignSource::CreditCard);
        assert_eq!(result.transactions[0].transaction_type, TransactionType::Expense);
    }
}
