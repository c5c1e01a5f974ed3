// Forward Styler
// Re-parses the buffer's text and replaces each recognized markdown
// construct with its bare text, tagged with the matching attributes

use super::markdown_ast::*;
use super::markdown_parser::parse_markdown;
use super::style::{DEFAULT_BASE_SIZE, StyleAttributes};
use super::styled_buffer::{StyledTextBuffer, byte_index};
use serde::{Deserialize, Serialize};
use url::Url;

/// How a parsed node is located in the buffer's current text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Search only inside the node's own source span, shifted by what
    /// earlier replacements removed
    #[default]
    Aligned,
    /// Search the whole buffer and take the first occurrence. Kept for
    /// compatibility; duplicated literals are consumed in text order, not
    /// in node order.
    FirstOccurrence,
}

/// Settings threaded into every styling pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylerConfig {
    pub base_size: u32,
    pub match_mode: MatchMode,
}

impl Default for StylerConfig {
    fn default() -> Self {
        StylerConfig {
            base_size: DEFAULT_BASE_SIZE,
            match_mode: MatchMode::default(),
        }
    }
}

impl StylerConfig {
    pub fn new(base_size: u32) -> Self {
        StylerConfig {
            base_size,
            ..Self::default()
        }
    }

    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }
}

/// One literal replaced during a pass, in the coordinates of the text at
/// the time of the replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replacement {
    pub offset: usize,
    pub removed_len: usize,
    pub inserted_len: usize,
}

/// Outcome of a styling pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleReport {
    pub applied: usize,
    pub skipped: usize,
    pub replacements: Vec<Replacement>,
}

impl StyleReport {
    /// Map an offset in the text before the pass to the text after it.
    /// Offsets inside a replaced literal are clamped into its replacement.
    pub fn map_offset(&self, offset: usize) -> usize {
        self.replacements.iter().fold(offset, |pos, edit| {
            if pos <= edit.offset {
                pos
            } else if pos >= edit.offset + edit.removed_len {
                pos - edit.removed_len + edit.inserted_len
            } else {
                edit.offset + (pos - edit.offset).min(edit.inserted_len)
            }
        })
    }

    /// Characters the pass removed from the text
    pub fn removed_chars(&self) -> usize {
        self.replacements
            .iter()
            .map(|edit| edit.removed_len - edit.inserted_len)
            .sum()
    }
}

/// A literal form to look for and what replaces it
struct Candidate {
    literal: String,
    replacement: String,
    attributes: StyleAttributes,
}

impl Candidate {
    fn wrapped(delimiter: &str, text: &str, attributes: StyleAttributes) -> Self {
        Candidate {
            literal: format!("{delimiter}{text}{delimiter}"),
            replacement: text.to_string(),
            attributes,
        }
    }
}

/// Style every recognized markdown construct in `buffer`. Constructs whose
/// literal form cannot be found are left as they are.
pub fn apply_styles(buffer: &mut StyledTextBuffer, config: &StylerConfig) -> StyleReport {
    let source = buffer.text();
    let document = parse_markdown(&source);

    let mut styler = Styler {
        buffer,
        config,
        char_offsets: CharOffsets::new(&source),
        report: StyleReport::default(),
    };
    styler.blocks(&document.blocks);

    let report = styler.report;
    tracing::debug!(
        constructs = document.construct_count(),
        applied = report.applied,
        skipped = report.skipped,
        removed = report.removed_chars(),
        "styling pass finished"
    );
    report
}

/// Style a markdown string into a fresh buffer
pub fn markdown_to_buffer(markdown: &str, config: &StylerConfig) -> StyledTextBuffer {
    let mut buffer = StyledTextBuffer::from_plain(markdown, config.base_size);
    apply_styles(&mut buffer, config);
    buffer
}

/// Byte to char offset conversion for the parsed source
struct CharOffsets {
    boundaries: Vec<usize>,
}

impl CharOffsets {
    fn new(source: &str) -> Self {
        CharOffsets {
            boundaries: source
                .char_indices()
                .map(|(idx, _)| idx)
                .chain(std::iter::once(source.len()))
                .collect(),
        }
    }

    fn char_offset(&self, byte: usize) -> usize {
        match self.boundaries.binary_search(&byte) {
            Ok(idx) | Err(idx) => idx,
        }
    }
}

struct Styler<'a> {
    buffer: &'a mut StyledTextBuffer,
    config: &'a StylerConfig,
    char_offsets: CharOffsets,
    report: StyleReport,
}

impl Styler<'_> {
    fn blocks(&mut self, blocks: &[BlockNode]) {
        for block in blocks {
            match &block.kind {
                BlockKind::Heading { level, plain_text } => {
                    let candidate = Candidate {
                        literal: format!("{} {}", "#".repeat(usize::from(*level)), plain_text),
                        replacement: plain_text.clone(),
                        attributes: StyleAttributes::heading(*level, self.config.base_size),
                    };
                    self.apply("heading", block.span, vec![candidate]);
                }
                BlockKind::Paragraph { inlines } => self.inlines(inlines),
                BlockKind::UnorderedList { items } | BlockKind::OrderedList { items, .. } => {
                    // Markers stay literal text; only item content is styled
                    for item in items {
                        self.blocks(&item.blocks);
                    }
                }
            }
        }
    }

    fn inlines(&mut self, inlines: &[InlineNode]) {
        let base = self.config.base_size;

        for inline in inlines {
            match &inline.kind {
                InlineKind::Strong { plain_text } => {
                    let candidates = ["**", "__"]
                        .into_iter()
                        .map(|d| Candidate::wrapped(d, plain_text, StyleAttributes::bold(base)))
                        .collect();
                    self.apply("strong", inline.span, candidates);
                }
                InlineKind::Emphasis { children } => self.emphasis(inline, children),
                InlineKind::Link {
                    plain_text,
                    destination,
                } => {
                    let literal = format!("[{plain_text}]({destination})");
                    if is_resolvable_link(destination) {
                        let candidate = Candidate {
                            literal,
                            replacement: plain_text.clone(),
                            attributes: StyleAttributes::link(destination.clone(), base),
                        };
                        self.apply("link", inline.span, vec![candidate]);
                    } else {
                        // The link text still replaces the literal, without a link
                        tracing::debug!(%destination, "unresolved link destination, attribute skipped");
                        let candidate = Candidate {
                            literal,
                            replacement: plain_text.clone(),
                            attributes: StyleAttributes::plain(base),
                        };
                        self.replace("link", inline.span, vec![candidate]);
                        self.report.skipped += 1;
                    }
                }
                InlineKind::InlineCode { plain_text } => {
                    let candidate = Candidate {
                        literal: plain_text.clone(),
                        replacement: strip_outer_chars(plain_text).to_string(),
                        attributes: StyleAttributes::monospace(base),
                    };
                    self.apply("inline code", inline.span, vec![candidate]);
                }
                InlineKind::Strikethrough { plain_text } => {
                    let candidates = ["~~", "~"]
                        .into_iter()
                        .map(|d| {
                            Candidate::wrapped(d, plain_text, StyleAttributes::strikethrough(base))
                        })
                        .collect();
                    self.apply("strikethrough", inline.span, candidates);
                }
                InlineKind::Text(_) | InlineKind::SoftBreak | InlineKind::HardBreak => {}
            }
        }
    }

    /// `***x***` parses as emphasis around strong and becomes bold-italic;
    /// any other emphasis content is styled italic as a whole
    fn emphasis(&mut self, node: &InlineNode, children: &[InlineNode]) {
        let base = self.config.base_size;
        let mut has_other_content = false;

        for child in children {
            match &child.kind {
                InlineKind::Strong { plain_text } => {
                    let candidates = ["***", "___"]
                        .into_iter()
                        .map(|d| {
                            Candidate::wrapped(d, plain_text, StyleAttributes::bold_italic(base))
                        })
                        .collect();
                    self.apply("bold italic", node.span, candidates);
                }
                _ => has_other_content = true,
            }
        }

        if has_other_content {
            let text = node.plain_text();
            let candidates = ["_", "*"]
                .into_iter()
                .map(|d| Candidate::wrapped(d, &text, StyleAttributes::italic(base)))
                .collect();
            self.apply("emphasis", node.span, candidates);
        }
    }

    /// Replace the first candidate found; record a skip when none is
    fn apply(&mut self, construct: &str, span: SourceSpan, candidates: Vec<Candidate>) {
        if self.replace(construct, span, candidates) {
            self.report.applied += 1;
        } else {
            tracing::debug!(construct, ?span, "construct not found in text, left unstyled");
            self.report.skipped += 1;
        }
    }

    /// Replace the first candidate found and record the edit
    fn replace(&mut self, construct: &str, span: SourceSpan, candidates: Vec<Candidate>) -> bool {
        let text = self.buffer.text();

        for candidate in candidates {
            let Some(offset) = self.find(&text, span, &candidate.literal) else {
                continue;
            };
            let removed_len = candidate.literal.chars().count();
            let inserted_len = candidate.replacement.chars().count();

            if self
                .buffer
                .replace_range(offset, removed_len, &candidate.replacement, candidate.attributes)
                .is_err()
            {
                return false;
            }

            tracing::trace!(construct, offset, literal = %candidate.literal, "styled");
            self.report.replacements.push(Replacement {
                offset,
                removed_len,
                inserted_len,
            });
            return true;
        }
        false
    }

    /// Char offset of the first occurrence of `literal` in the search range
    /// that does not touch monospace text. Code span contents keep their
    /// markdown-looking characters, so they are never matched again.
    fn find(&self, text: &str, span: SourceSpan, literal: &str) -> Option<usize> {
        let (window_start, window_end) = match self.config.match_mode {
            MatchMode::FirstOccurrence => (0, text.len()),
            MatchMode::Aligned => {
                // Carry the node's source span through the edits made so far
                let start = self
                    .report
                    .map_offset(self.char_offsets.char_offset(span.start));
                let end = self
                    .report
                    .map_offset(self.char_offsets.char_offset(span.end));
                (byte_index(text, start), byte_index(text, end.max(start)))
            }
        };

        let literal_len = literal.chars().count();
        text.get(window_start..window_end)?
            .match_indices(literal)
            .map(|(byte, _)| text[..window_start + byte].chars().count())
            .find(|&offset| {
                !self
                    .buffer
                    .any_in_range(offset, literal_len, |attrs| attrs.monospace)
            })
    }
}

/// Drop the first and last char
fn strip_outer_chars(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Absolute URLs and references that resolve against a base are accepted
fn is_resolvable_link(destination: &str) -> bool {
    if destination.trim().is_empty() {
        return false;
    }
    if Url::parse(destination).is_ok() {
        return true;
    }
    Url::parse("https://localhost/")
        .and_then(|base| base.join(destination))
        .is_ok()
}
