//! Delimited-text parsing for spreadsheet exports.
//!
//! A single-pass, RFC 4180 style reader: double quotes delimit fields that may
//! contain commas, line breaks and doubled (escaped) quotes.

/// Split `raw` into rows of fields.
///
/// * `""` inside a quoted field is one literal `"`.
/// * `\n`, `\r` and `\r\n` all end a row when outside quotes.
/// * Blank lines (a single empty field) are dropped.
/// * A final row without a trailing line break is still returned.
pub fn parse_rows(raw: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                current.push(std::mem::take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                current.push(std::mem::take(&mut field));
                let row = std::mem::take(&mut current);
                if !is_blank_row(&row) {
                    rows.push(row);
                }
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !current.is_empty() {
        current.push(field);
        rows.push(current);
    }

    rows
}

/// A row made of exactly one empty field, i.e. an empty line.
fn is_blank_row(row: &[String]) -> bool {
    row.len() == 1 && row[0].is_empty()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
