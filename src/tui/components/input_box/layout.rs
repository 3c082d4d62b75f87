//! Row layout for the input box.
//!
//! The box wraps like a plain text area: hard breaks at `\n`, soft breaks
//! when the next character would overflow the inner width. Rows are byte
//! ranges into the buffer so the cursor maps to a (row, column) pair without
//! re-wrapping.

use std::ops::Range;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders consumed vertically
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// The box grows with its content up to this many rows, then scrolls.
pub(super) const MAX_VISIBLE_LINES: u16 = 5;
/// Offset from area edge to content (border + left padding)
pub(super) const CONTENT_OFFSET: u16 = 2;

pub(super) fn inner_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD).max(1)
}

/// Visual rows of `text` at `width` columns. Never empty.
pub(super) fn rows(text: &str, width: u16) -> Vec<Range<usize>> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();
    let mut start = 0;
    let mut used = 0;
    for (i, c) in text.char_indices() {
        if c == '\n' {
            rows.push(start..i);
            start = i + 1;
            used = 0;
            continue;
        }
        let w = c.width().unwrap_or(0);
        if used > 0 && used + w > width {
            rows.push(start..i);
            start = i;
            used = 0;
        }
        used += w;
    }
    rows.push(start..text.len());
    rows
}

/// Row index and display column of byte offset `pos`.
///
/// A position on a soft-wrap boundary belongs to the row it starts.
pub(super) fn locate(text: &str, rows: &[Range<usize>], pos: usize) -> (usize, u16) {
    let row = rows
        .partition_point(|r| r.start <= pos)
        .saturating_sub(1);
    let start = rows.get(row).map_or(0, |r| r.start);
    (row, text[start..pos].width() as u16)
}

/// Byte offset in `row` closest to display column `col` without passing it.
pub(super) fn offset_at(text: &str, row: &Range<usize>, col: u16) -> usize {
    let mut used = 0;
    for (i, c) in text[row.clone()].char_indices() {
        let w = c.width().unwrap_or(0) as u16;
        if used + w > col {
            return row.start + i;
        }
        used += w;
    }
    row.end
}

pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_one_row() {
        assert_eq!(rows("", 10), vec![0..0]);
    }

    #[test]
    fn newline_starts_a_row() {
        assert_eq!(rows("ab\ncd", 10), vec![0..2, 3..5]);
        assert_eq!(rows("ab\n", 10), vec![0..2, 3..3]);
    }

    #[test]
    fn overflow_wraps_at_character() {
        assert_eq!(rows("abcdefg", 3), vec![0..3, 3..6, 6..7]);
    }

    #[test]
    fn wide_characters_count_double() {
        // Each CJK char is 2 columns; two fit in 4
        let text = "日本語";
        assert_eq!(rows(text, 4), vec![0..6, 6..9]);
    }

    #[test]
    fn locate_after_newline_is_next_row() {
        let text = "ab\ncd";
        let r = rows(text, 10);
        assert_eq!(locate(text, &r, 2), (0, 2));
        assert_eq!(locate(text, &r, 3), (1, 0));
        assert_eq!(locate(text, &r, 5), (1, 2));
    }

    #[test]
    fn locate_on_soft_wrap_boundary() {
        let text = "abcdef";
        let r = rows(text, 3);
        assert_eq!(locate(text, &r, 3), (1, 0));
    }

    #[test]
    fn offset_at_clamps_to_row_end() {
        let text = "abcdef\nxy";
        let r = rows(text, 10);
        assert_eq!(offset_at(text, &r[0], 4), 4);
        assert_eq!(offset_at(text, &r[1], 4), 9);
    }

    #[test]
    fn char_boundaries_handle_multibyte() {
        let s = "a🔥b";
        assert_eq!(next_char_boundary(s, 1), 5);
        assert_eq!(prev_char_boundary(s, 5), 1);
        assert_eq!(next_char_boundary(s, 6), 6);
    }
}
