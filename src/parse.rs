/// A parsed CSV grid: rows of cells, in source order.
/// Rows may differ in width when the source is ragged.
pub type Grid = Vec<Vec<String>>;

const BOM: char = '\u{feff}';

/// Split raw CSV text into rows of string cells.
///
/// Handles quoted fields (with embedded commas and newlines), `""` escapes,
/// CRLF and LF terminators and a leading byte-order mark. Trailing rows made
/// only of empty cells are dropped. Never fails: malformed input still yields
/// a best-effort grid.
pub fn parse_csv(text: &str) -> Grid {
    let text = text.strip_prefix(BOM).unwrap_or(text);

    let mut rows: Grid = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => row.push(std::mem::take(&mut field)),
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(ch),
        }
    }

    // last field/row when the input has no trailing terminator
    row.push(field);
    rows.push(row);

    while rows
        .last()
        .is_some_and(|r| r.iter().all(|cell| cell.is_empty()))
    {
        rows.pop();
    }
    rows
}
