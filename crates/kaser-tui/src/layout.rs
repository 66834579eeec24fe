//! Cell measurement for drawing lines into a fixed-width terminal area.
//!
//! Columns in the engine are counted in `char`s; the terminal counts cells. These helpers
//! convert between the two with `unicode-width` and expand tabs to the next tab stop.

use std::iter;
use unicode_width::UnicodeWidthChar;

/// Tab stop distance used for display.
pub const TAB_WIDTH: usize = 4;

/// Marker drawn in the last cell of a line that does not fit.
pub const ELLIPSIS: char = '…';

/// Display width of `ch` in cells (UAX #11; unknown widths count as one cell).
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Width of `ch` when it starts at `cell_offset`; tabs advance to the next tab stop.
pub fn cell_width_at(ch: char, cell_offset: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        tab_width - cell_offset % tab_width
    } else {
        char_width(ch)
    }
}

/// Total width of `line` in cells.
pub fn str_width(line: &str, tab_width: usize) -> usize {
    line.chars().fold(0, |x, ch| x + cell_width_at(ch, x, tab_width))
}

/// Cell offset of character `column` within `line`.
pub fn visual_x_for_column(line: &str, column: usize, tab_width: usize) -> usize {
    line.chars()
        .take(column)
        .fold(0, |x, ch| x + cell_width_at(ch, x, tab_width))
}

/// First visible cell so that a cursor at `cursor_x` stays on screen in a `width`-cell area,
/// clear of the ellipsis cell.
pub fn horizontal_scroll(cursor_x: usize, width: usize) -> usize {
    if width < 2 {
        return cursor_x;
    }
    if cursor_x + 1 < width {
        0
    } else {
        cursor_x + 2 - width
    }
}

/// The part of `line` visible in a `width`-cell area that starts at cell `scroll_x`.
///
/// Tabs become spaces, control characters become `?`, wide characters cut by an edge become
/// blanks, and a line that continues past the right edge ends with [`ELLIPSIS`].
pub fn clip_line(line: &str, scroll_x: usize, width: usize, tab_width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let overflow = str_width(line, tab_width).saturating_sub(scroll_x) > width;
    let end = scroll_x + if overflow { width - 1 } else { width };

    let mut out = String::with_capacity(width + 4);
    let mut x = 0;
    for ch in line.chars() {
        let w = cell_width_at(ch, x, tab_width);
        let (start, stop) = (x, x + w);
        x = stop;

        if start < scroll_x && stop <= scroll_x {
            continue;
        }
        if start >= end {
            break;
        }
        if start < scroll_x || stop > end {
            let visible = stop.min(end) - start.max(scroll_x);
            out.extend(iter::repeat_n(' ', visible));
        } else if ch == '\t' {
            out.extend(iter::repeat_n(' ', w));
        } else if ch.is_control() {
            out.extend(iter::repeat_n('?', w));
        } else {
            out.push(ch);
        }
    }

    if overflow {
        out.push(ELLIPSIS);
    }
    out
}

/// Digits needed to print line numbers up to `total_lines`.
pub fn line_number_width(total_lines: usize) -> usize {
    total_lines.max(1).ilog10() as usize + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wide_characters_take_two_cells() {
        assert_eq!(str_width("ab", TAB_WIDTH), 2);
        assert_eq!(str_width("中文", TAB_WIDTH), 4);
        assert_eq!(visual_x_for_column("a中b", 2, TAB_WIDTH), 3);
    }

    #[test]
    fn tabs_advance_to_next_stop() {
        assert_eq!(visual_x_for_column("\tx", 1, 4), 4);
        assert_eq!(visual_x_for_column("ab\tx", 3, 4), 4);
        assert_eq!(str_width("abcd\t", 4), 8);
    }

    #[test]
    fn short_lines_are_not_clipped() {
        assert_eq!(clip_line("hello", 0, 10, TAB_WIDTH), "hello");
        assert_eq!(clip_line("a\tb", 0, 10, 4), "a   b");
        assert_eq!(clip_line("", 0, 10, TAB_WIDTH), "");
    }

    #[test]
    fn long_lines_end_with_ellipsis() {
        assert_eq!(clip_line("abcdefghij", 0, 5, TAB_WIDTH), "abcd…");
        assert_eq!(clip_line("abcdef", 0, 6, TAB_WIDTH), "abcdef");
        assert_eq!(clip_line("abcdefg", 0, 6, TAB_WIDTH), "abcde…");
    }

    #[test]
    fn wide_character_cut_by_edge_becomes_blank() {
        // "中" would straddle the ellipsis cell.
        assert_eq!(clip_line("abc中de", 0, 5, TAB_WIDTH), "abc …");
        assert_eq!(clip_line("中文abc", 1, 10, TAB_WIDTH), " 文abc");
    }

    #[test]
    fn scrolled_lines_start_mid_line() {
        assert_eq!(clip_line("abcdefghij", 4, 4, TAB_WIDTH), "efg…");
        assert_eq!(clip_line("abcdefghij", 6, 4, TAB_WIDTH), "ghij");
    }

    #[test]
    fn cursor_stays_visible_when_scrolling() {
        assert_eq!(horizontal_scroll(0, 10), 0);
        assert_eq!(horizontal_scroll(8, 10), 0);
        assert_eq!(horizontal_scroll(9, 10), 1);
        assert_eq!(horizontal_scroll(30, 10), 22);
        assert_eq!(horizontal_scroll(3, 1), 3);
    }

    #[test]
    fn line_number_width_counts_digits() {
        assert_eq!(line_number_width(0), 1);
        assert_eq!(line_number_width(9), 1);
        assert_eq!(line_number_width(10), 2);
        assert_eq!(line_number_width(12_345), 5);
    }
}
