// Markdown Parser - converts pulldown-cmark events into our Document
use super::markdown_ast::*;
use pulldown_cmark::{Event, Options, Parser, Tag};
use std::ops::Range;

/// Container kinds tracked while walking the event stream
#[derive(Debug)]
enum FrameTag {
    Document,
    Paragraph,
    Heading(u8),
    List(Option<u64>),
    Item,
    Strong,
    Emphasis,
    Strikethrough,
    Link(String),
    /// Block quotes, code blocks, images, tables, ... Their content is dropped.
    Ignored,
}

/// An open container and the children collected so far
struct Frame {
    tag: FrameTag,
    start: usize,
    inlines: Vec<InlineNode>,
    blocks: Vec<BlockNode>,
    items: Vec<ListItem>,
}

impl Frame {
    fn new(tag: FrameTag, start: usize) -> Self {
        Frame {
            tag,
            start,
            inlines: Vec::new(),
            blocks: Vec::new(),
            items: Vec::new(),
        }
    }

    fn push_inline(&mut self, node: InlineNode) {
        match self.tag {
            FrameTag::Document | FrameTag::List(_) | FrameTag::Ignored => return,
            _ => {}
        }

        // pulldown-cmark splits text at delimiter candidates; join the pieces
        if let (InlineKind::Text(content), Some(last)) = (&node.kind, self.inlines.last_mut()) {
            if let InlineKind::Text(previous) = &mut last.kind {
                if last.span.end == node.span.start {
                    previous.push_str(content);
                    last.span.end = node.span.end;
                    return;
                }
            }
        }
        self.inlines.push(node);
    }

    fn push_block(&mut self, block: BlockNode) {
        match self.tag {
            FrameTag::Document => self.blocks.push(block),
            FrameTag::Item => {
                self.flush_tight_paragraph();
                self.blocks.push(block);
            }
            _ => {}
        }
    }

    /// Items of tight lists hold inline content without a paragraph; wrap it
    /// so list items always contain blocks
    fn flush_tight_paragraph(&mut self) {
        if self.inlines.is_empty() {
            return;
        }
        let inlines = std::mem::take(&mut self.inlines);
        let span = inlines
            .iter()
            .map(|inline| inline.span)
            .reduce(SourceSpan::cover)
            .unwrap_or(SourceSpan::new(self.start, self.start));
        self.blocks
            .push(BlockNode::new(BlockKind::Paragraph { inlines }, span));
    }
}

/// Parse markdown text into a Document
pub fn parse_markdown(text: &str) -> Document {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(text, options).into_offset_iter();

    // The document frame stays at the bottom of the stack
    let mut stack: Vec<Frame> = vec![Frame::new(FrameTag::Document, 0)];

    for (event, range) in parser {
        match event {
            Event::Start(tag) => {
                stack.push(Frame::new(frame_tag(tag), range.start));
            }

            Event::End(_) => {
                if stack.len() < 2 {
                    continue;
                }
                if let Some(frame) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        close_frame(frame, range.end, parent);
                    }
                }
            }

            Event::Text(content) => {
                push_inline(&mut stack, InlineKind::Text(content.to_string()), range);
            }

            Event::Code(content) => {
                let plain_text = format!("`{}`", content);
                push_inline(&mut stack, InlineKind::InlineCode { plain_text }, range);
            }

            Event::SoftBreak => push_inline(&mut stack, InlineKind::SoftBreak, range),

            Event::HardBreak => push_inline(&mut stack, InlineKind::HardBreak, range),

            _ => {
                // HTML, rules, footnotes, task markers and math are not styled
            }
        }
    }

    let blocks = stack
        .into_iter()
        .next()
        .map(|root| root.blocks)
        .unwrap_or_default();

    Document {
        blocks,
        source: text.to_string(),
    }
}

fn push_inline(stack: &mut [Frame], kind: InlineKind, range: Range<usize>) {
    if let Some(frame) = stack.last_mut() {
        frame.push_inline(InlineNode::new(
            kind,
            SourceSpan::new(range.start, range.end),
        ));
    }
}

fn frame_tag(tag: Tag) -> FrameTag {
    match tag {
        Tag::Paragraph => FrameTag::Paragraph,
        Tag::Heading { level, .. } => FrameTag::Heading(level as u8),
        Tag::List(start) => FrameTag::List(start),
        Tag::Item => FrameTag::Item,
        Tag::Strong => FrameTag::Strong,
        Tag::Emphasis => FrameTag::Emphasis,
        Tag::Strikethrough => FrameTag::Strikethrough,
        Tag::Link { dest_url, .. } => FrameTag::Link(dest_url.to_string()),
        _ => FrameTag::Ignored,
    }
}

/// Turn a finished frame into a node and hand it to its parent
fn close_frame(mut frame: Frame, end: usize, parent: &mut Frame) {
    let span = SourceSpan::new(frame.start, end);

    match frame.tag {
        FrameTag::Paragraph => parent.push_block(BlockNode::new(
            BlockKind::Paragraph {
                inlines: frame.inlines,
            },
            span,
        )),
        FrameTag::Heading(level) => parent.push_block(BlockNode::new(
            BlockKind::Heading {
                level,
                plain_text: flatten_inlines(&frame.inlines),
            },
            span,
        )),
        FrameTag::List(start) => {
            let kind = match start {
                Some(start) => BlockKind::OrderedList {
                    start,
                    items: frame.items,
                },
                None => BlockKind::UnorderedList { items: frame.items },
            };
            parent.push_block(BlockNode::new(kind, span));
        }
        FrameTag::Item => {
            frame.flush_tight_paragraph();
            if let FrameTag::List(_) = parent.tag {
                parent.items.push(ListItem {
                    blocks: frame.blocks,
                    span,
                });
            }
        }
        FrameTag::Strong => parent.push_inline(InlineNode::new(
            InlineKind::Strong {
                plain_text: flatten_inlines(&frame.inlines),
            },
            span,
        )),
        FrameTag::Emphasis => parent.push_inline(InlineNode::new(
            InlineKind::Emphasis {
                children: frame.inlines,
            },
            span,
        )),
        FrameTag::Strikethrough => parent.push_inline(InlineNode::new(
            InlineKind::Strikethrough {
                plain_text: flatten_inlines(&frame.inlines),
            },
            span,
        )),
        FrameTag::Link(destination) => parent.push_inline(InlineNode::new(
            InlineKind::Link {
                plain_text: flatten_inlines(&frame.inlines),
                destination,
            },
            span,
        )),
        FrameTag::Document | FrameTag::Ignored => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph_inlines(doc: &Document, index: usize) -> &[InlineNode] {
        match &doc.blocks[index].kind {
            BlockKind::Paragraph { inlines } => inlines,
            other => panic!("Expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_heading() {
        let doc = parse_markdown("## Second level\n\nBody");
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(
            doc.blocks[0].kind,
            BlockKind::Heading {
                level: 2,
                plain_text: "Second level".to_string()
            }
        );
        assert_eq!(doc.blocks[0].span.start, 0);
    }

    #[test]
    fn test_inline_constructs() {
        let doc = parse_markdown("**bold** and _italic_ and `code` and ~~gone~~");
        let inlines = paragraph_inlines(&doc, 0);

        assert_eq!(
            inlines[0].kind,
            InlineKind::Strong {
                plain_text: "bold".to_string()
            }
        );
        assert_eq!(inlines[0].span, SourceSpan::new(0, 8));
        assert!(matches!(inlines[2].kind, InlineKind::Emphasis { .. }));
        assert_eq!(inlines[2].plain_text(), "italic");
        assert_eq!(
            inlines[4].kind,
            InlineKind::InlineCode {
                plain_text: "`code`".to_string()
            }
        );
        assert_eq!(
            inlines[6].kind,
            InlineKind::Strikethrough {
                plain_text: "gone".to_string()
            }
        );
    }

    #[test]
    fn test_bold_italic_nests_strong_in_emphasis() {
        let doc = parse_markdown("***both***");
        let inlines = paragraph_inlines(&doc, 0);
        assert_eq!(inlines.len(), 1);

        let InlineKind::Emphasis { children } = &inlines[0].kind else {
            panic!("Expected emphasis");
        };
        assert!(matches!(children[0].kind, InlineKind::Strong { .. }));
        assert_eq!(children[0].plain_text(), "both");
    }

    #[test]
    fn test_link() {
        let doc = parse_markdown("[go](https://example.com)");
        let inlines = paragraph_inlines(&doc, 0);
        assert_eq!(
            inlines[0].kind,
            InlineKind::Link {
                plain_text: "go".to_string(),
                destination: "https://example.com".to_string()
            }
        );
    }

    #[test]
    fn test_tight_list_items_get_paragraphs() {
        let doc = parse_markdown("- one\n- **two**\n");
        let BlockKind::UnorderedList { items } = &doc.blocks[0].kind else {
            panic!("Expected unordered list");
        };
        assert_eq!(items.len(), 2);
        for item in items {
            assert_eq!(item.blocks.len(), 1);
            assert!(matches!(item.blocks[0].kind, BlockKind::Paragraph { .. }));
        }
    }

    #[test]
    fn test_ordered_list_start() {
        let doc = parse_markdown("3. three\n4. four\n");
        assert!(matches!(
            doc.blocks[0].kind,
            BlockKind::OrderedList { start: 3, .. }
        ));
    }

    #[test]
    fn test_unsupported_blocks_are_dropped() {
        let doc = parse_markdown("> **quoted**\n\n```\ncode\n```\n\nafter");
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(paragraph_inlines(&doc, 0)[0].plain_text(), "after");
    }

    #[test]
    fn test_empty_input() {
        let doc = parse_markdown("");
        assert!(doc.blocks.is_empty());
        assert_eq!(doc.construct_count(), 0);
    }
}
