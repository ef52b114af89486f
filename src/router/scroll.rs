use serde::{Deserialize, Serialize};

use super::Resolved;

/// Scroll offset of the content area, in rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub left: u16,
    pub top: u16,
}

impl ScrollPosition {
    pub const TOP: ScrollPosition = ScrollPosition { left: 0, top: 0 };

    /// Moves by `rows`, staying within `0..=max_top`.
    pub fn scrolled_by(self, rows: i32, max_top: u16) -> Self {
        let top = (self.top as i32 + rows).clamp(0, max_top as i32) as u16;
        Self { top, ..self }
    }

    pub fn clamped(self, max_top: u16) -> Self {
        Self {
            top: self.top.min(max_top),
            ..self
        }
    }

    /// Largest useful `top` for `content_rows` rows shown in `viewport_rows`.
    pub fn max_top(content_rows: usize, viewport_rows: u16) -> u16 {
        content_rows
            .saturating_sub(viewport_rows as usize)
            .min(u16::MAX as usize) as u16
    }
}

/// Position to show after navigating from `_from` to `_to`: the saved one on
/// history traversal, the top of the page otherwise.
pub fn scroll_behavior(
    _to: &Resolved,
    _from: Option<&Resolved>,
    saved: Option<ScrollPosition>,
) -> ScrollPosition {
    saved.unwrap_or(ScrollPosition::TOP)
}
