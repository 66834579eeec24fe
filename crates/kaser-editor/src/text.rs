//! Character-column helpers. Columns count Unicode scalar values, not bytes.

use crate::LineEnding;

/// Splits `text` into lines, returning each line with the terminator that ended it.
///
/// `"a\nb"` yields two lines (the last unterminated), `"a\n"` yields one, and the empty
/// string yields a single empty unterminated line.
pub(crate) fn split_lines_with_endings(text: &str) -> Vec<(String, Option<LineEnding>)> {
    let mut lines = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push((text[start..i].to_string(), Some(LineEnding::Lf)));
                i += 1;
                start = i;
            }
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                lines.push((text[start..i].to_string(), Some(LineEnding::Crlf)));
                i += 2;
                start = i;
            }
            b'\r' => {
                lines.push((text[start..i].to_string(), Some(LineEnding::Cr)));
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }

    if start < bytes.len() || lines.is_empty() {
        lines.push((text[start..].to_string(), None));
    }
    lines
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn byte_offset(text: &str, column: usize) -> usize {
    text.char_indices()
        .nth(column)
        .map_or(text.len(), |(offset, _)| offset)
}

pub(crate) fn insert_char(text: &str, column: usize, ch: char) -> String {
    let at = byte_offset(text, column);
    let mut out = String::with_capacity(text.len() + ch.len_utf8());
    out.push_str(&text[..at]);
    out.push(ch);
    out.push_str(&text[at..]);
    out
}

/// Replaces the character at `column`, or appends when `column` is at the end.
pub(crate) fn overwrite_char(text: &str, column: usize, ch: char) -> String {
    let at = byte_offset(text, column);
    let mut out = String::with_capacity(text.len() + ch.len_utf8());
    out.push_str(&text[..at]);
    out.push(ch);
    if let Some(replaced) = text[at..].chars().next() {
        out.push_str(&text[at + replaced.len_utf8()..]);
    }
    out
}

pub(crate) fn remove_char(text: &str, column: usize) -> String {
    let at = byte_offset(text, column);
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..at]);
    if let Some(removed) = text[at..].chars().next() {
        out.push_str(&text[at + removed.len_utf8()..]);
    }
    out
}

pub(crate) fn split_at_column(text: &str, column: usize) -> (String, String) {
    let at = byte_offset(text, column);
    (text[..at].to_string(), text[at..].to_string())
}
