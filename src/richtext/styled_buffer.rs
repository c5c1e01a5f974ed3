// Styled Text Buffer
// An ordered sequence of runs over one logical string. Offsets and lengths
// are counted in chars so a host can re-anchor its cursor directly.

use super::style::StyleAttributes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by buffer range operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("range {offset}..{offset}+{length} is outside the buffer (length {len})")]
    OutOfBounds {
        offset: usize,
        length: usize,
        len: usize,
    },
}

/// A contiguous piece of text with uniform attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub attributes: StyleAttributes,
}

impl Run {
    pub fn new(text: impl Into<String>, attributes: StyleAttributes) -> Self {
        Run {
            text: text.into(),
            attributes,
        }
    }

    pub fn plain(text: impl Into<String>, base_size: u32) -> Self {
        Self::new(text, StyleAttributes::plain(base_size))
    }

    /// Length in chars
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Split this run at the given char offset
    /// Returns (left_run, right_run)
    pub fn split_at(&self, offset: usize) -> (Run, Run) {
        let (left, right) = self.text.split_at(byte_index(&self.text, offset));
        (
            Run::new(left, self.attributes.clone()),
            Run::new(right, self.attributes.clone()),
        )
    }
}

/// Byte index of the char at `char_offset`, or the end of the string
pub(crate) fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

/// Rich text as a sequence of non-empty runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledTextBuffer {
    runs: Vec<Run>,
}

impl StyledTextBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        StyledTextBuffer { runs: Vec::new() }
    }

    /// Create a buffer holding `text` as a single plain run
    pub fn from_plain(text: &str, base_size: u32) -> Self {
        let mut buffer = Self::new();
        buffer.set_text(text, base_size);
        buffer
    }

    /// Create a buffer from existing runs; empty runs are dropped and
    /// neighbours with equal attributes merged
    pub fn from_runs(runs: impl IntoIterator<Item = Run>) -> Self {
        StyledTextBuffer {
            runs: normalize(runs.into_iter()),
        }
    }

    /// Replace the whole content with plain text
    pub fn set_text(&mut self, text: &str, base_size: u32) {
        self.runs.clear();
        if !text.is_empty() {
            self.runs.push(Run::plain(text, base_size));
        }
    }

    /// Concatenation of all runs' text
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.runs.iter().map(Run::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Attributes of the char at `offset`, if there is one
    pub fn attributes_at(&self, offset: usize) -> Option<&StyleAttributes> {
        let mut pos = 0;
        for run in &self.runs {
            let len = run.char_len();
            if offset < pos + len {
                return Some(&run.attributes);
            }
            pos += len;
        }
        None
    }

    /// Whether any char in `[offset, offset + length)` has attributes
    /// accepted by `predicate`
    pub fn any_in_range(
        &self,
        offset: usize,
        length: usize,
        predicate: impl Fn(&StyleAttributes) -> bool,
    ) -> bool {
        if length == 0 {
            return false;
        }
        let end = offset.saturating_add(length);
        let mut pos = 0;
        for run in &self.runs {
            let run_end = pos + run.char_len();
            if run_end > offset && pos < end && predicate(&run.attributes) {
                return true;
            }
            if run_end >= end {
                break;
            }
            pos = run_end;
        }
        false
    }

    /// Replace the chars `[offset, offset + length)` with `new_text` carrying
    /// `attributes`. Runs straddling either boundary are split so the new
    /// run's boundaries are exact.
    pub fn replace_range(
        &mut self,
        offset: usize,
        length: usize,
        new_text: &str,
        attributes: StyleAttributes,
    ) -> Result<(), BufferError> {
        let len = self.len();
        let end = match offset.checked_add(length) {
            Some(end) if end <= len => end,
            _ => {
                return Err(BufferError::OutOfBounds {
                    offset,
                    length,
                    len,
                });
            }
        };

        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut pos = 0usize;

        for run in self.runs.drain(..) {
            let run_len = run.char_len();
            let run_end = pos + run_len;

            if run_end <= offset {
                left.push(run);
            } else if pos >= end {
                right.push(run);
            } else {
                // Overlap: keep the parts outside the replaced range
                if pos < offset {
                    let (head, _) = run.split_at(offset - pos);
                    left.push(head);
                }
                if run_end > end {
                    let (_, tail) = run.split_at(end - pos);
                    right.push(tail);
                }
            }

            pos = run_end;
        }

        let new_run = Run::new(new_text, attributes);
        self.runs = normalize(left.into_iter().chain(Some(new_run)).chain(right));
        Ok(())
    }
}

/// Drop empty runs and merge neighbours with equal attributes
fn normalize(runs: impl Iterator<Item = Run>) -> Vec<Run> {
    let mut result: Vec<Run> = Vec::new();
    for run in runs {
        if run.is_empty() {
            continue;
        }
        match result.last_mut() {
            Some(last) if last.attributes == run.attributes => last.text.push_str(&run.text),
            _ => result.push(run),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: u32 = 18;

    #[test]
    fn test_from_plain() {
        let buffer = StyledTextBuffer::from_plain("Hello world", BASE);
        assert_eq!(buffer.runs().len(), 1);
        assert_eq!(buffer.text(), "Hello world");
        assert_eq!(buffer.len(), 11);

        assert!(StyledTextBuffer::from_plain("", BASE).is_empty());
    }

    #[test]
    fn test_replace_splits_runs() {
        let mut buffer = StyledTextBuffer::from_plain("Hello world", BASE);
        buffer
            .replace_range(6, 5, "there", StyleAttributes::bold(BASE))
            .unwrap();

        assert_eq!(buffer.text(), "Hello there");
        assert_eq!(buffer.runs().len(), 2);
        assert_eq!(buffer.runs()[0].text, "Hello ");
        assert_eq!(buffer.runs()[1].text, "there");
        assert!(buffer.runs()[1].attributes.bold);
    }

    #[test]
    fn test_replace_inside_single_run() {
        let mut buffer = StyledTextBuffer::from_plain("a **b** c", BASE);
        buffer
            .replace_range(2, 5, "b", StyleAttributes::bold(BASE))
            .unwrap();

        let texts: Vec<&str> = buffer.runs().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["a ", "b", " c"]);
        assert_eq!(buffer.attributes_at(2), Some(&StyleAttributes::bold(BASE)));
        assert_eq!(buffer.attributes_at(3), Some(&StyleAttributes::plain(BASE)));
    }

    #[test]
    fn test_replace_across_runs() {
        let mut buffer = StyledTextBuffer::from_runs(vec![
            Run::plain("one ", BASE),
            Run::new("two", StyleAttributes::italic(BASE)),
            Run::plain(" three", BASE),
        ]);
        buffer
            .replace_range(2, 7, "-", StyleAttributes::plain(BASE))
            .unwrap();

        assert_eq!(buffer.text(), "on-hree");
        // Everything is plain again, so the runs collapse into one
        assert_eq!(buffer.runs().len(), 1);
    }

    #[test]
    fn test_replace_with_empty_text_deletes() {
        let mut buffer = StyledTextBuffer::from_plain("abcdef", BASE);
        buffer
            .replace_range(1, 2, "", StyleAttributes::plain(BASE))
            .unwrap();
        assert_eq!(buffer.text(), "adef");
    }

    #[test]
    fn test_insert_at_end() {
        let mut buffer = StyledTextBuffer::from_plain("abc", BASE);
        buffer
            .replace_range(3, 0, "d", StyleAttributes::monospace(BASE))
            .unwrap();
        assert_eq!(buffer.text(), "abcd");
        assert_eq!(buffer.runs().len(), 2);
    }

    #[test]
    fn test_any_in_range() {
        let buffer = StyledTextBuffer::from_runs(vec![
            Run::plain("ab", BASE),
            Run::new("cd", StyleAttributes::monospace(BASE)),
            Run::plain("ef", BASE),
        ]);
        let mono = |attrs: &StyleAttributes| attrs.monospace;

        assert!(!buffer.any_in_range(0, 2, mono));
        assert!(buffer.any_in_range(1, 2, mono));
        assert!(buffer.any_in_range(3, 3, mono));
        assert!(!buffer.any_in_range(4, 2, mono));
        assert!(!buffer.any_in_range(3, 0, mono));
    }

    #[test]
    fn test_offsets_count_chars() {
        let mut buffer = StyledTextBuffer::from_plain("жирный текст", BASE);
        assert_eq!(buffer.len(), 12);
        buffer
            .replace_range(0, 6, "курсив", StyleAttributes::italic(BASE))
            .unwrap();
        assert_eq!(buffer.text(), "курсив текст");
        assert_eq!(buffer.runs()[0].text, "курсив");
    }

    #[test]
    fn test_out_of_bounds() {
        let mut buffer = StyledTextBuffer::from_plain("abc", BASE);
        let err = buffer
            .replace_range(2, 5, "x", StyleAttributes::plain(BASE))
            .unwrap_err();
        assert_eq!(
            err,
            BufferError::OutOfBounds {
                offset: 2,
                length: 5,
                len: 3
            }
        );
        assert_eq!(buffer.text(), "abc");

        assert!(
            buffer
                .replace_range(usize::MAX, 1, "x", StyleAttributes::plain(BASE))
                .is_err()
        );
    }

    #[test]
    fn test_from_runs_merges_equal_neighbours() {
        let buffer = StyledTextBuffer::from_runs(vec![
            Run::plain("a", BASE),
            Run::plain("", BASE),
            Run::plain("b", BASE),
            Run::new("c", StyleAttributes::bold(BASE)),
        ]);
        assert_eq!(buffer.runs().len(), 2);
        assert_eq!(buffer.runs()[0].text, "ab");
    }
}
