//! CSV serialization
//!
//! Every field is double-quoted, embedded quotes are doubled, and embedded
//! line breaks are collapsed to a single space so each record stays on one
//! line. The output starts with a UTF-8 byte-order mark so spreadsheet
//! tools pick the right encoding.

use super::rows::RowSet;

const BOM: &str = "\u{feff}";

fn field(value: &str) -> String {
    let escaped = value
        .replace('"', "\"\"")
        .replace("\r\n", " ")
        .replace('\r', " ")
        .replace('\n', " ");
    format!("\"{}\"", escaped)
}

fn line(cells: impl Iterator<Item = String>) -> String {
    cells.map(|c| field(&c)).collect::<Vec<_>>().join(",")
}

/// Serialize a row set to CSV text
pub fn to_csv(set: &RowSet) -> String {
    let mut out = String::from(BOM);
    out.push_str(&line(set.headers.iter().cloned()));

    for row in &set.rows {
        out.push('\n');
        out.push_str(&line(row.iter().map(|c| c.as_text())));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::rows::Cell;

    #[test]
    fn test_bom_and_quoting() {
        let set = RowSet {
            headers: vec!["A".into(), "B".into()],
            rows: vec![vec![Cell::from("plain"), Cell::Int(7)]],
        };

        let csv = to_csv(&set);
        assert!(csv.starts_with('\u{feff}'));
        assert_eq!(csv.trim_start_matches('\u{feff}'), "\"A\",\"B\"\n\"plain\",\"7\"");
    }

    #[test]
    fn test_quotes_doubled_and_newlines_collapsed() {
        let set = RowSet {
            headers: vec!["text".into()],
            rows: vec![vec![Cell::from("He said \"no\" \n really")]],
        };

        let csv = to_csv(&set);
        let data_line = csv.lines().nth(1).unwrap();
        assert_eq!(data_line, "\"He said \"\"no\"\"   really\"");
    }

    #[test]
    fn test_crlf_collapses_to_single_space() {
        let set = RowSet {
            headers: vec!["text".into()],
            rows: vec![vec![Cell::from("one\r\ntwo\rthree\nfour")]],
        };

        let csv = to_csv(&set);
        let data_line = csv.lines().nth(1).unwrap();
        assert_eq!(data_line, "\"one two three four\"");
    }
}
