//! Viewport Calculator
//!
//! Picks the range of lines to draw so the current line sits in the middle of the screen
//! whenever there is enough text above and below it. Stateless: call it every render with
//! the row count known at that moment.

use std::ops::Range;

/// Smallest page used by page-up/page-down.
pub const MIN_PAGE_SIZE: usize = 5;

/// Rows the viewer keeps for its header and footer when paging.
pub const PAGE_CHROME_ROWS: usize = 8;

/// Half-open range of line indices to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportWindow {
    /// First visible line.
    pub start: usize,
    /// One past the last visible line.
    pub end: usize,
}

impl ViewportWindow {
    /// Number of visible lines.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// `true` when nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// `true` when `line` is inside the window.
    pub fn contains(&self, line: usize) -> bool {
        (self.start..self.end).contains(&line)
    }

    /// The window as an iterable range.
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Compute the visible window for `current_line` among `total_lines`.
///
/// `start = max(0, current - rows / 2)`, `end = min(total, start + rows)`.
pub fn compute_window(total_lines: usize, current_line: usize, visible_rows: usize) -> ViewportWindow {
    let start = current_line
        .saturating_sub(visible_rows / 2)
        .min(total_lines);
    let end = total_lines.min(start + visible_rows);
    ViewportWindow { start, end }
}

/// Lines moved by one page-up/page-down for a terminal `terminal_rows` tall.
pub fn page_size(terminal_rows: usize) -> usize {
    terminal_rows.saturating_sub(PAGE_CHROME_ROWS).max(MIN_PAGE_SIZE)
}
