//! Render snapshot
//!
//! Plain data handed to the presentation loop each render: which lines are visible, what
//! they contain, and which of them carry pending edits.

use crate::Cursor;
use crate::viewport::ViewportWindow;

/// One visible line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLine {
    /// Line index (0-based).
    pub index: usize,
    /// Effective content.
    pub text: String,
    /// `true` when the line has a pending edit.
    pub modified: bool,
    /// `true` for the cursor line.
    pub current: bool,
}

/// Visible portion of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    /// Visible line range.
    pub window: ViewportWindow,
    /// Visible lines, in order.
    pub lines: Vec<ViewLine>,
    /// Cursor at the time of the snapshot.
    pub cursor: Cursor,
    /// Total number of lines, pending appended lines included.
    pub total_lines: usize,
}

impl ViewSnapshot {
    /// Row of the cursor inside the window, if it is visible.
    pub fn cursor_row(&self) -> Option<usize> {
        self.window
            .contains(self.cursor.line)
            .then(|| self.cursor.line - self.window.start)
    }
}
