//! CSV field encoding.
//!
//! The delimiter is always `,`, the quote character is always `"` and every
//! record ends with `\n`. A field is quoted when it contains the delimiter,
//! a quote or a line break; embedded quotes are doubled.
//!
//! A carriage return counts as a line break, so a field holding a lone `\r`
//! or a `\r\n` pair is quoted too. Parsers that treat `\r` as a record
//! terminator then read the field back unchanged.

use std::borrow::Cow;

/// Field delimiter.
pub const DELIMITER: char = ',';

/// Quote character.
pub const QUOTE: char = '"';

/// Record terminator.
pub const LINE_TERMINATOR: &str = "\n";

/// Whether a field must be wrapped in quotes.
pub fn needs_quoting(value: &str) -> bool {
    value.contains(|c: char| matches!(c, DELIMITER | QUOTE | '\n' | '\r'))
}

/// Escape a value for CSV (double quotes and add quotes if needed).
pub fn escape_csv(value: &str) -> Cow<'_, str> {
    if needs_quoting(value) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Encode one field. Absent fields become empty, never the text `null`.
pub fn encode_field(field: Option<&str>) -> Cow<'_, str> {
    match field {
        Some(value) => escape_csv(value),
        None => Cow::Borrowed(""),
    }
}

/// Encode a whole record as one terminated line.
///
/// Returns `None` when there are no fields at all, so callers emit nothing
/// rather than a blank line.
pub fn encode_record<I, S>(fields: I) -> Option<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut line = String::new();
    let mut any = false;
    for field in fields {
        if any {
            line.push(DELIMITER);
        }
        any = true;
        line.push_str(&encode_field(field.as_ref().map(|s| s.as_ref())));
    }
    if !any {
        return None;
    }
    line.push_str(LINE_TERMINATOR);
    Some(line)
}
