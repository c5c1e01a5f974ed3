// Reverse Emitter
// Writes markdown for a sequence of runs. Each run is wrapped by the first
// rule in EMIT_RULES whose predicate accepts its attributes.

use super::style::{StyleAttributes, heading_level_for_size};
use super::styled_buffer::{Run, StyledTextBuffer};

/// One entry of the emission precedence table
pub struct EmitRule {
    pub name: &'static str,
    pub applies: fn(&StyleAttributes, u32) -> bool,
    pub emit: fn(&str, &StyleAttributes, u32, &mut String),
}

/// Emission rules in precedence order. The last rule accepts everything.
pub static EMIT_RULES: &[EmitRule] = &[
    EmitRule {
        name: "heading",
        applies: is_heading,
        emit: emit_heading,
    },
    EmitRule {
        name: "bold italic",
        applies: |attrs, _| attrs.bold && attrs.italic,
        emit: |text, _, _, out| wrap(out, "***", text, "***"),
    },
    EmitRule {
        name: "bold",
        applies: |attrs, _| attrs.bold,
        emit: |text, _, _, out| wrap(out, "**", text, "**"),
    },
    EmitRule {
        name: "italic",
        applies: |attrs, _| attrs.italic,
        emit: |text, _, _, out| wrap(out, "_", text, "_"),
    },
    EmitRule {
        name: "link",
        applies: |attrs, _| attrs.link.is_some(),
        emit: emit_link,
    },
    EmitRule {
        name: "strikethrough",
        applies: |attrs, _| attrs.strikethrough,
        emit: |text, _, _, out| wrap(out, "~~", text, "~~"),
    },
    EmitRule {
        name: "monospace",
        applies: |attrs, _| attrs.monospace,
        emit: |text, _, _, out| wrap(out, "`", text, "`"),
    },
    EmitRule {
        name: "plain",
        applies: |_, _| true,
        emit: |text, _, _, out| out.push_str(text),
    },
];

/// The rule that emits a run with these attributes
pub fn rule_for(attributes: &StyleAttributes, base_size: u32) -> &'static EmitRule {
    EMIT_RULES
        .iter()
        .find(|rule| (rule.applies)(attributes, base_size))
        .unwrap_or(&EMIT_RULES[EMIT_RULES.len() - 1])
}

/// Markdown for a buffer. `base_size` must be the one used to style it, or
/// heading levels decode wrongly.
pub fn to_markdown(buffer: &StyledTextBuffer, base_size: u32) -> String {
    runs_to_markdown(buffer.runs(), base_size)
}

/// Markdown for a sequence of runs
pub fn runs_to_markdown(runs: &[Run], base_size: u32) -> String {
    let mut output = String::new();
    for run in runs {
        let rule = rule_for(&run.attributes, base_size);
        (rule.emit)(&run.text, &run.attributes, base_size, &mut output);
    }
    output
}

fn wrap(out: &mut String, open: &str, text: &str, close: &str) {
    out.push_str(open);
    out.push_str(text);
    out.push_str(close);
}

/// Bold text whose size decodes to a heading level. At exactly the base
/// size only runs marked as headings qualify, since level 6 and bold body
/// text share that size.
fn is_heading(attrs: &StyleAttributes, base_size: u32) -> bool {
    attrs.bold
        && heading_level_for_size(attrs.size, base_size).is_some()
        && (attrs.size != base_size || attrs.heading_level > 0)
}

fn emit_heading(text: &str, attrs: &StyleAttributes, base_size: u32, out: &mut String) {
    let level = heading_level_for_size(attrs.size, base_size).unwrap_or(1);
    out.push_str(&"#".repeat(usize::from(level)));
    out.push(' ');
    out.push_str(text);
}

fn emit_link(text: &str, attrs: &StyleAttributes, _: u32, out: &mut String) {
    match &attrs.link {
        Some(destination) => {
            out.push('[');
            out.push_str(text);
            out.push_str("](");
            out.push_str(destination);
            out.push(')');
        }
        None => out.push_str(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: u32 = 18;

    fn emit_one(text: &str, attributes: StyleAttributes) -> String {
        runs_to_markdown(&[Run::new(text, attributes)], BASE)
    }

    #[test]
    fn test_bold() {
        assert_eq!(emit_one("x", StyleAttributes::bold(BASE)), "**x**");
    }

    #[test]
    fn test_bold_italic_uses_triple_stars() {
        assert_eq!(emit_one("x", StyleAttributes::bold_italic(BASE)), "***x***");
        assert_eq!(rule_for(&StyleAttributes::bold_italic(BASE), BASE).name, "bold italic");
    }

    #[test]
    fn test_each_style() {
        assert_eq!(emit_one("x", StyleAttributes::italic(BASE)), "_x_");
        assert_eq!(emit_one("x", StyleAttributes::strikethrough(BASE)), "~~x~~");
        assert_eq!(emit_one("x", StyleAttributes::monospace(BASE)), "`x`");
        assert_eq!(emit_one("x", StyleAttributes::plain(BASE)), "x");
        assert_eq!(
            emit_one("go", StyleAttributes::link("https://example.com", BASE)),
            "[go](https://example.com)"
        );
    }

    #[test]
    fn test_heading_levels() {
        for level in 1..=6 {
            let expected = format!("{} Title", "#".repeat(usize::from(level)));
            assert_eq!(emit_one("Title", StyleAttributes::heading(level, BASE)), expected);
        }
    }

    #[test]
    fn test_heading_level_comes_from_size() {
        // Level field says 1, size says 4: size wins
        let attrs = StyleAttributes {
            size: 22,
            ..StyleAttributes::heading(1, BASE)
        };
        assert_eq!(emit_one("T", attrs), "#### T");
    }

    #[test]
    fn test_bold_larger_than_any_heading_is_plain_bold() {
        let attrs = StyleAttributes {
            size: 40,
            ..StyleAttributes::bold(BASE)
        };
        assert_eq!(emit_one("x", attrs), "**x**");
    }

    #[test]
    fn test_mismatched_base_size_misreads_levels() {
        let heading = Run::new("T", StyleAttributes::heading(1, BASE));
        // Styled with 18, exported with 24: size 28 decodes as level 4
        assert_eq!(runs_to_markdown(&[heading], 24), "#### T");
    }

    #[test]
    fn test_precedence_order() {
        let names: Vec<&str> = EMIT_RULES.iter().map(|rule| rule.name).collect();
        assert_eq!(
            names,
            vec![
                "heading",
                "bold italic",
                "bold",
                "italic",
                "link",
                "strikethrough",
                "monospace",
                "plain"
            ]
        );

        // Conflicting combinations resolve to the earliest rule
        let attrs = StyleAttributes {
            italic: true,
            strikethrough: true,
            monospace: true,
            ..StyleAttributes::link("https://example.com", BASE)
        };
        assert_eq!(emit_one("x", attrs), "_x_");
    }

    #[test]
    fn test_runs_concatenate() {
        let runs = vec![
            Run::new("Title", StyleAttributes::heading(2, BASE)),
            Run::plain("\nsome ", BASE),
            Run::new("bold", StyleAttributes::bold(BASE)),
            Run::plain(" text", BASE),
        ];
        assert_eq!(runs_to_markdown(&runs, BASE), "## Title\nsome **bold** text");
    }
}
