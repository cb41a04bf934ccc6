// Primitives for reading and writing delimited text.

/// Splits raw CSV text into rows of trimmed fields.
///
/// The scan is quote-aware: a `"` toggles quoting, a doubled `""` inside
/// quotes is a literal quote. Commas and line terminators inside quotes are
/// field content. `\r\n` counts as a single terminator. Rows that end up
/// entirely empty are dropped; every field loses its surrounding
/// whitespace. Rows may have differing lengths, no column count is
/// enforced here.
pub fn parse(text: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
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
                row.push(field.trim().to_string());
                field.clear();
            }
            '\n' | '\r' if !in_quotes => {
                if !field.is_empty() || !row.is_empty() {
                    row.push(field.trim().to_string());
                    field.clear();
                    rows.push(std::mem::take(&mut row));
                }
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field.trim().to_string());
        rows.push(row);
    }

    rows.into_iter()
        .filter(|r| !r.is_empty() && r.iter().any(|f| !f.is_empty()))
        .collect()
}

/// Joins rows back into CSV text.
///
/// Fields containing a quote, comma or line terminator are wrapped in
/// quotes with internal quotes doubled. `parse(serialize(rows))` gives back
/// the same field values, modulo the trimming and empty-row pruning that
/// `parse` applies.
pub fn serialize(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|field| quote_field(field))
                .collect::<Vec<String>>()
                .join(",")
        })
        .collect::<Vec<String>>()
        .join("\n")
}

fn quote_field(field: &str) -> String {
    if field.contains('"') || field.contains(',') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|f| f.to_string()).collect())
            .collect()
    }

    #[test]
    fn splits_fields_and_rows() {
        assert_eq!(
            parse("a,b,c\nd,e,f"),
            owned(&[&["a", "b", "c"], &["d", "e", "f"]])
        );
    }

    #[test]
    fn quoted_commas_and_doubled_quotes() {
        let rows = parse("name,note\n\"Smith, \"\"Jr.\"\"\",ok");
        assert_eq!(rows[1][0], "Smith, \"Jr.\"");
        assert_eq!(rows[1][1], "ok");
    }

    #[test]
    fn quoted_newlines_stay_in_the_field() {
        let rows = parse("\"line1\nline2\",x");
        assert_eq!(rows, owned(&[&["line1\nline2", "x"]]));
    }

    #[test]
    fn crlf_is_one_terminator() {
        assert_eq!(parse("a,b\r\nc,d\r\n"), owned(&[&["a", "b"], &["c", "d"]]));
    }

    #[test]
    fn fields_are_trimmed() {
        assert_eq!(parse(" a , b \n"), owned(&[&["a", "b"]]));
        // Trimming applies to quoted content as well.
        assert_eq!(parse("\" a \",b"), owned(&[&["a", "b"]]));
    }

    #[test]
    fn empty_rows_are_pruned() {
        assert_eq!(
            parse("a,b\n\n , \nc,d"),
            owned(&[&["a", "b"], &["c", "d"]])
        );
        assert_eq!(parse(""), owned(&[]));
    }

    #[test]
    fn ragged_rows_are_legal() {
        assert_eq!(parse("a,b,c\nd"), owned(&[&["a", "b", "c"], &["d"]]));
    }

    #[test]
    fn serialize_quotes_what_needs_quoting() {
        let rows = owned(&[&["plain", "with,comma", "with \"quote\"", "with\nnewline"]]);
        assert_eq!(
            serialize(&rows),
            "plain,\"with,comma\",\"with \"\"quote\"\"\",\"with\nnewline\""
        );
    }

    #[test]
    fn round_trip_preserves_trimmed_values() {
        let rows = owned(&[
            &["Child Name", "Age", "Note"],
            &["Smith, \"Jr.\"", "2", "line1\nline2"],
            &["Ana", "0", ""],
        ]);
        assert_eq!(parse(&serialize(&rows)), rows);
    }
}
