// List Continuation
// Decides what a line break inserts: a new bullet, the next number of an
// ordered list, or just a newline

use super::styled_buffer::byte_index;
use regex::Regex;
use std::sync::LazyLock;

static ORDERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s").expect("ordered marker pattern is valid"));

/// What to insert at the break and where the cursor goes afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub inserted_text: String,
    /// Char offset right after the inserted text
    pub new_cursor_offset: usize,
}

impl Continuation {
    /// `text` with the insertion applied at `break_offset`
    pub fn apply(&self, text: &str, break_offset: usize) -> String {
        let at = byte_index(text, break_offset);
        let mut result = String::with_capacity(text.len() + self.inserted_text.len());
        result.push_str(&text[..at]);
        result.push_str(&self.inserted_text);
        result.push_str(&text[at..]);
        result
    }
}

/// Decide the insertion for a line break at char offset `break_offset`.
/// Offsets past the end are clamped; this never fails.
pub fn on_line_break(text: &str, break_offset: usize) -> Continuation {
    let offset = break_offset.min(text.chars().count());
    let line = line_at(text, byte_index(text, offset)).trim();

    let inserted_text = if line.starts_with('-') {
        "\n- ".to_string()
    } else if let Some(next) = next_ordered_number(line) {
        format!("\n{}. ", next)
    } else {
        "\n".to_string()
    };

    let new_cursor_offset = offset + inserted_text.chars().count();
    Continuation {
        inserted_text,
        new_cursor_offset,
    }
}

/// The line containing byte `at`, without its line terminator
fn line_at(text: &str, at: usize) -> &str {
    let start = text[..at].rfind('\n').map(|idx| idx + 1).unwrap_or(0);
    let end = text[at..].find('\n').map(|idx| at + idx).unwrap_or(text.len());
    &text[start..end]
}

/// Number for the next item when `line` starts with an ordered marker.
/// Unparsable or overflowing numbers give `None`.
fn next_ordered_number(line: &str) -> Option<u64> {
    let captures = ORDERED_MARKER.captures(line)?;
    let number = captures.get(1)?.as_str().parse::<u64>().ok()?;
    number.checked_add(1)
}
