// Markdown Document
// The block and inline tree the styler walks. Only the constructs the
// editor styles are modeled; everything else is dropped by the parser.

use std::fmt;

/// Byte range of a node in the parsed source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        SourceSpan { start, end }
    }

    /// Smallest span covering both
    pub fn cover(self, other: SourceSpan) -> Self {
        SourceSpan {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Block-level node kinds
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Heading { level: u8, plain_text: String },
    Paragraph { inlines: Vec<InlineNode> },
    UnorderedList { items: Vec<ListItem> },
    OrderedList { start: u64, items: Vec<ListItem> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    pub kind: BlockKind,
    pub span: SourceSpan,
}

impl BlockNode {
    pub fn new(kind: BlockKind, span: SourceSpan) -> Self {
        BlockNode { kind, span }
    }
}

/// One entry of an ordered or unordered list
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub blocks: Vec<BlockNode>,
    pub span: SourceSpan,
}

/// Inline node kinds
#[derive(Debug, Clone, PartialEq)]
pub enum InlineKind {
    Text(String),
    Strong { plain_text: String },
    Emphasis { children: Vec<InlineNode> },
    Link { plain_text: String, destination: String },
    /// `plain_text` keeps the surrounding backticks
    InlineCode { plain_text: String },
    Strikethrough { plain_text: String },
    SoftBreak,
    HardBreak,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineNode {
    pub kind: InlineKind,
    pub span: SourceSpan,
}

impl InlineNode {
    pub fn new(kind: InlineKind, span: SourceSpan) -> Self {
        InlineNode { kind, span }
    }

    /// Text of this node without markdown delimiters, except for inline
    /// code which keeps its backticks
    pub fn plain_text(&self) -> String {
        let mut result = String::new();
        self.flatten_text_recursive(&mut result);
        result
    }

    fn flatten_text_recursive(&self, buffer: &mut String) {
        match &self.kind {
            InlineKind::Text(content) => buffer.push_str(content),
            InlineKind::Strong { plain_text }
            | InlineKind::Link { plain_text, .. }
            | InlineKind::InlineCode { plain_text }
            | InlineKind::Strikethrough { plain_text } => buffer.push_str(plain_text),
            InlineKind::Emphasis { children } => {
                for child in children {
                    child.flatten_text_recursive(buffer);
                }
            }
            InlineKind::SoftBreak | InlineKind::HardBreak => buffer.push('\n'),
        }
    }
}

/// Flatten a sequence of inline nodes
pub fn flatten_inlines(nodes: &[InlineNode]) -> String {
    nodes.iter().map(InlineNode::plain_text).collect()
}

/// A parsed markdown document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<BlockNode>,

    /// Source text that was parsed
    pub source: String,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes the styler may act on (headings and inline constructs)
    pub fn construct_count(&self) -> usize {
        fn count_blocks(blocks: &[BlockNode]) -> usize {
            blocks
                .iter()
                .map(|block| match &block.kind {
                    BlockKind::Heading { .. } => 1,
                    BlockKind::Paragraph { inlines } => inlines
                        .iter()
                        .filter(|inline| {
                            !matches!(
                                inline.kind,
                                InlineKind::Text(_) | InlineKind::SoftBreak | InlineKind::HardBreak
                            )
                        })
                        .count(),
                    BlockKind::UnorderedList { items } | BlockKind::OrderedList { items, .. } => {
                        items.iter().map(|item| count_blocks(&item.blocks)).sum()
                    }
                })
                .sum()
        }
        count_blocks(&self.blocks)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Document (source: {} bytes)", self.source.len())?;
        for block in &self.blocks {
            block.fmt_recursive(f, 1)?;
        }
        Ok(())
    }
}

impl BlockNode {
    fn fmt_recursive(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let indent_str = "  ".repeat(indent);
        let SourceSpan { start, end } = self.span;

        match &self.kind {
            BlockKind::Heading { level, plain_text } => writeln!(
                f,
                "{}Heading(h{}) {:?} [{}-{}]",
                indent_str, level, plain_text, start, end
            ),
            BlockKind::Paragraph { inlines } => {
                writeln!(f, "{}Paragraph [{}-{}]", indent_str, start, end)?;
                for inline in inlines {
                    inline.fmt_recursive(f, indent + 1)?;
                }
                Ok(())
            }
            BlockKind::UnorderedList { items } | BlockKind::OrderedList { items, .. } => {
                let label = match &self.kind {
                    BlockKind::OrderedList { start: first, .. } => format!("ordered from {}", first),
                    _ => "unordered".to_string(),
                };
                writeln!(f, "{}List({}) [{}-{}]", indent_str, label, start, end)?;
                for item in items {
                    writeln!(
                        f,
                        "{}  Item [{}-{}]",
                        indent_str, item.span.start, item.span.end
                    )?;
                    for block in &item.blocks {
                        block.fmt_recursive(f, indent + 2)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl InlineNode {
    fn fmt_recursive(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let indent_str = "  ".repeat(indent);
        let SourceSpan { start, end } = self.span;

        match &self.kind {
            InlineKind::Text(content) => {
                writeln!(f, "{}Text {:?} [{}-{}]", indent_str, content, start, end)
            }
            InlineKind::Strong { plain_text } => {
                writeln!(f, "{}Strong {:?} [{}-{}]", indent_str, plain_text, start, end)
            }
            InlineKind::Emphasis { children } => {
                writeln!(f, "{}Emphasis [{}-{}]", indent_str, start, end)?;
                for child in children {
                    child.fmt_recursive(f, indent + 1)?;
                }
                Ok(())
            }
            InlineKind::Link {
                plain_text,
                destination,
            } => writeln!(
                f,
                "{}Link {:?} -> {:?} [{}-{}]",
                indent_str, plain_text, destination, start, end
            ),
            InlineKind::InlineCode { plain_text } => {
                writeln!(f, "{}InlineCode {:?} [{}-{}]", indent_str, plain_text, start, end)
            }
            InlineKind::Strikethrough { plain_text } => writeln!(
                f,
                "{}Strikethrough {:?} [{}-{}]",
                indent_str, plain_text, start, end
            ),
            InlineKind::SoftBreak => writeln!(f, "{}SoftBreak [{}-{}]", indent_str, start, end),
            InlineKind::HardBreak => writeln!(f, "{}HardBreak [{}-{}]", indent_str, start, end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(content: &str, start: usize) -> InlineNode {
        InlineNode::new(
            InlineKind::Text(content.to_string()),
            SourceSpan::new(start, start + content.len()),
        )
    }

    #[test]
    fn test_flatten_text() {
        let emphasis = InlineNode::new(
            InlineKind::Emphasis {
                children: vec![
                    text("hello ", 1),
                    InlineNode::new(
                        InlineKind::InlineCode {
                            plain_text: "`x`".to_string(),
                        },
                        SourceSpan::new(7, 10),
                    ),
                ],
            },
            SourceSpan::new(0, 11),
        );

        assert_eq!(emphasis.plain_text(), "hello `x`");
    }

    #[test]
    fn test_span_cover() {
        let span = SourceSpan::new(4, 8).cover(SourceSpan::new(2, 6));
        assert_eq!(span, SourceSpan::new(2, 8));
    }

    #[test]
    fn test_construct_count() {
        let doc = Document {
            blocks: vec![
                BlockNode::new(
                    BlockKind::Heading {
                        level: 1,
                        plain_text: "Title".to_string(),
                    },
                    SourceSpan::new(0, 7),
                ),
                BlockNode::new(
                    BlockKind::Paragraph {
                        inlines: vec![
                            text("plain ", 8),
                            InlineNode::new(
                                InlineKind::Strong {
                                    plain_text: "bold".to_string(),
                                },
                                SourceSpan::new(14, 22),
                            ),
                        ],
                    },
                    SourceSpan::new(8, 22),
                ),
            ],
            source: String::new(),
        };

        assert_eq!(doc.construct_count(), 2);
    }
}
