// Style Model
// The attribute vocabulary attached to runs of rich text, plus the
// heading size encoding shared by the styler and the emitter

use serde::{Deserialize, Serialize};

/// Body text size used when no configuration says otherwise
pub const DEFAULT_BASE_SIZE: u32 = 18;

/// Deepest heading level that can be encoded
pub const MAX_HEADING_LEVEL: u8 = 6;

/// Point size step between two adjacent heading levels
const HEADING_SIZE_STEP: u32 = 2;

/// Attributes of one run of text.
///
/// A heading run is always bold and never monospace. A link run carries no
/// other emphasis. The constructors below uphold both rules; code that
/// builds attributes field by field is on its own, and the emitter resolves
/// any conflicting combination by its fixed precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleAttributes {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub monospace: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// 0 = not a heading
    pub heading_level: u8,
    /// Point size of the run
    pub size: u32,
}

impl Default for StyleAttributes {
    fn default() -> Self {
        Self::plain(DEFAULT_BASE_SIZE)
    }
}

impl StyleAttributes {
    pub fn plain(base_size: u32) -> Self {
        StyleAttributes {
            bold: false,
            italic: false,
            strikethrough: false,
            monospace: false,
            link: None,
            heading_level: 0,
            size: base_size,
        }
    }

    pub fn bold(base_size: u32) -> Self {
        StyleAttributes {
            bold: true,
            ..Self::plain(base_size)
        }
    }

    pub fn italic(base_size: u32) -> Self {
        StyleAttributes {
            italic: true,
            ..Self::plain(base_size)
        }
    }

    pub fn bold_italic(base_size: u32) -> Self {
        StyleAttributes {
            bold: true,
            italic: true,
            ..Self::plain(base_size)
        }
    }

    pub fn strikethrough(base_size: u32) -> Self {
        StyleAttributes {
            strikethrough: true,
            ..Self::plain(base_size)
        }
    }

    pub fn monospace(base_size: u32) -> Self {
        StyleAttributes {
            monospace: true,
            ..Self::plain(base_size)
        }
    }

    pub fn link(destination: impl Into<String>, base_size: u32) -> Self {
        StyleAttributes {
            link: Some(destination.into()),
            ..Self::plain(base_size)
        }
    }

    /// Heading attributes; the level is clamped to 1..=6
    pub fn heading(level: u8, base_size: u32) -> Self {
        let level = level.clamp(1, MAX_HEADING_LEVEL);
        StyleAttributes {
            bold: true,
            heading_level: level,
            size: heading_size(level, base_size),
            ..Self::plain(base_size)
        }
    }

    /// True when no attribute differs from plain body text of `base_size`
    pub fn is_plain(&self, base_size: u32) -> bool {
        *self == Self::plain(base_size)
    }

    /// The same attributes with any link dropped
    pub fn without_link(&self) -> Self {
        StyleAttributes {
            link: None,
            ..self.clone()
        }
    }
}

/// Point size for a heading: level 1 is the largest, level 6 equals the base
pub fn heading_size(level: u8, base_size: u32) -> u32 {
    let level = level.clamp(1, MAX_HEADING_LEVEL);
    base_size + HEADING_SIZE_STEP * u32::from(MAX_HEADING_LEVEL - level)
}

/// Inverse of [`heading_size`]. Sizes outside the encoded range, or between
/// two encoded sizes, decode to `None`.
pub fn heading_level_for_size(size: u32, base_size: u32) -> Option<u8> {
    let offset = size.checked_sub(base_size)?;
    if offset % HEADING_SIZE_STEP != 0 {
        return None;
    }
    let steps = offset / HEADING_SIZE_STEP;
    if steps >= u32::from(MAX_HEADING_LEVEL) {
        return None;
    }
    Some(MAX_HEADING_LEVEL - steps as u8)
}
