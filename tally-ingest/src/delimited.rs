//! Row reader shared by the delimited-text parsers.
//!
//! `"` opens and closes a quoted field; the delimiter is literal inside
//! quotes, so `"1.234,56"` survives a `,`-separated file intact.

use tally_core::normalize_text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based line number in the source text.
    pub line: u64,
    pub fields: Vec<String>,
}

impl Row {
    pub fn field(&self, idx: usize) -> &str {
        self.fields.get(idx).map(String::as_str).unwrap_or("")
    }

    /// True when any field, normalized, contains one of `keywords`.
    pub fn mentions_any(&self, keywords: &[&str]) -> bool {
        self.fields.iter().any(|f| {
            let f = normalize_text(f);
            keywords.iter().any(|k| f.contains(k))
        })
    }
}

/// 1-based line of the record whose position the reader reported at `byte`.
///
/// The reader records a position before it consumes the empty lines in front
/// of a record, so line terminators are skipped first.
fn physical_line(content: &str, line_starts: &[usize], byte: usize) -> u64 {
    let start = content.as_bytes().get(byte..).map_or(byte, |rest| {
        byte + rest.iter().take_while(|&&b| b == b'\r' || b == b'\n').count()
    });
    line_starts.partition_point(|&s| s <= start) as u64
}

/// Split `content` into rows of trimmed fields. Blank lines are skipped; a
/// row the reader cannot decode becomes an error entry in place.
pub fn read_rows(content: &str, delimiter: u8) -> Vec<Result<Row, String>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(content.match_indices('\n').map(|(i, _)| i + 1))
        .collect();
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .quote(b'"')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    rdr.records()
        .map(|result| {
            let record = result.map_err(|e| format!("unreadable row: {e}"))?;
            let line = record
                .position()
                .map(|p| physical_line(content, &line_starts, p.byte() as usize))
                .unwrap_or(0);
            Ok(Row {
                line,
                fields: record.iter().map(str::to_string).collect(),
            })
        })
        .filter(|row| match row {
            Ok(r) => r.fields.iter().any(|f| !f.is_empty()),
            Err(_) => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_protect_delimiter() {
        let rows = read_rows("1,10/09/2024,\"LOJA, CENTRO\",\"1.234,56\",D\n", b',');
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.fields, vec!["1", "10/09/2024", "LOJA, CENTRO", "1.234,56", "D"]);
    }

    #[test]
    fn test_semicolon_and_line_numbers() {
        let rows = read_rows("Data;Descricao;Valor\n\n10/09/2024; PADARIA ;-12,50\n", b';');
        assert_eq!(rows.len(), 2);
        let data = rows[1].as_ref().unwrap();
        assert_eq!(data.line, 3);
        assert_eq!(data.field(1), "PADARIA");
        assert_eq!(data.field(7), "");
    }

    #[test]
    fn test_line_numbers_count_every_blank_line() {
        let content = "\r\nA;1\r\n\r\n\r\nB;2\n   \nC;3\n";
        let lines: Vec<u64> = read_rows(content, b';')
            .into_iter()
            .map(|r| r.unwrap().line)
            .collect();
        assert_eq!(lines, vec![2, 5, 7]);
    }

    #[test]
    fn test_header_keywords() {
        let rows = read_rows("DATA;Descrição;Valor\n", b';');
        let header = rows[0].as_ref().unwrap();
        assert!(header.mentions_any(&["descricao"]));
        assert!(!header.mentions_any(&["saldo"]));
    }

    #[test]
    fn test_strips_bom() {
        let rows = read_rows("\u{feff}Data;Valor\n", b';');
        assert_eq!(rows[0].as_ref().unwrap().field(0), "Data");
    }
}
