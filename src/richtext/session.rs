// Editing Session
// Owns the buffer of one editor view and runs the edit pipeline:
// optional list continuation, the edit itself, then a full restyle

use super::emitter::to_markdown;
use super::list_continuation::{Continuation, on_line_break};
use super::style::StyleAttributes;
use super::styled_buffer::{BufferError, StyledTextBuffer};
use super::styler::{StyleReport, StylerConfig, apply_styles};

/// Result of an edit: the re-anchored cursor offset
pub type EditResult = Result<usize, BufferError>;

pub struct EditingSession {
    buffer: StyledTextBuffer,
    config: StylerConfig,
}

impl EditingSession {
    /// Load markdown and style it
    pub fn new(markdown: &str, config: StylerConfig) -> Self {
        let mut session = EditingSession {
            buffer: StyledTextBuffer::from_plain(markdown, config.base_size),
            config,
        };
        session.restyle();
        session
    }

    pub fn buffer(&self) -> &StyledTextBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &StylerConfig {
        &self.config
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Re-derive styling for the whole buffer
    pub fn restyle(&mut self) -> StyleReport {
        apply_styles(&mut self.buffer, &self.config)
    }

    /// Handle the line-break key at `cursor`
    pub fn insert_line_break(&mut self, cursor: usize) -> EditResult {
        let len = self.buffer.len();
        if cursor > len {
            return Err(BufferError::OutOfBounds {
                offset: cursor,
                length: 0,
                len,
            });
        }

        let Continuation {
            inserted_text,
            new_cursor_offset,
        } = on_line_break(&self.buffer.text(), cursor);
        let at = new_cursor_offset - inserted_text.chars().count();

        self.buffer.replace_range(
            at,
            0,
            &inserted_text,
            StyleAttributes::plain(self.config.base_size),
        )?;
        Ok(self.restyle().map_offset(new_cursor_offset))
    }

    /// Insert typed text at `cursor`. The text takes the attributes of the
    /// char before the cursor, except that a space always starts plain text.
    pub fn insert_text(&mut self, cursor: usize, text: &str) -> EditResult {
        let attributes = self.typing_attributes(cursor, text);
        self.buffer.replace_range(cursor, 0, text, attributes)?;
        let cursor = cursor + text.chars().count();
        Ok(self.restyle().map_offset(cursor))
    }

    /// Replace `length` chars at `offset` with plain `text` (paste, delete)
    pub fn replace_range(&mut self, offset: usize, length: usize, text: &str) -> EditResult {
        self.buffer.replace_range(
            offset,
            length,
            text,
            StyleAttributes::plain(self.config.base_size),
        )?;
        let cursor = offset + text.chars().count();
        Ok(self.restyle().map_offset(cursor))
    }

    /// Export the buffer as markdown
    pub fn to_markdown(&self) -> String {
        to_markdown(&self.buffer, self.config.base_size)
    }

    fn typing_attributes(&self, cursor: usize, text: &str) -> StyleAttributes {
        let plain = StyleAttributes::plain(self.config.base_size);
        if text == " " || cursor == 0 {
            return plain;
        }
        self.buffer
            .attributes_at(cursor - 1)
            .map(StyleAttributes::without_link)
            .unwrap_or(plain)
    }
}
