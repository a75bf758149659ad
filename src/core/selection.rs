//! Mouse selection over visual lines.
//!
//! Points address the wrapped transcript: `line` indexes the visual line
//! sequence and `col` counts display cells, not characters.

use crate::core::layout::{char_width, VisualLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Point {
    pub line: usize,
    pub col: usize,
}

impl Point {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// A press anchor plus the point the pointer has been dragged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    anchor: Point,
    head: Point,
}

impl Selection {
    pub fn new(at: Point) -> Self {
        Self {
            anchor: at,
            head: at,
        }
    }

    pub fn extend_to(&mut self, point: Point) {
        self.head = point;
    }

    /// Start and end in reading order.
    pub fn normalized(&self) -> (Point, Point) {
        normalize(self.anchor, self.head)
    }

    pub fn text(&self, lines: &[VisualLine]) -> String {
        update_selection(lines, self.anchor, self.head)
    }

    /// Character range of `line_index` covered by this selection, if any.
    pub fn range_on_line(&self, line_index: usize, line: &str) -> Option<(usize, usize)> {
        let (start, end) = self.normalized();
        selected_char_range(line_index, line, start, end)
    }
}

fn normalize(a: Point, b: Point) -> (Point, Point) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Maps a display column to a character index by scanning forward and
/// accumulating cell widths. Columns past the end map to the line length.
pub fn visual_column_to_char_index(chars: &[char], col: usize) -> usize {
    let mut width = 0;
    for (index, ch) in chars.iter().enumerate() {
        if width >= col {
            return index;
        }
        width += char_width(*ch);
    }
    chars.len()
}

fn selected_char_range(
    line_index: usize,
    line: &str,
    start: Point,
    end: Point,
) -> Option<(usize, usize)> {
    if line_index < start.line || line_index > end.line {
        return None;
    }

    let chars: Vec<char> = line.chars().collect();
    let from = if line_index == start.line {
        visual_column_to_char_index(&chars, start.col)
    } else {
        0
    };
    let to = if line_index == end.line {
        visual_column_to_char_index(&chars, end.col)
    } else {
        chars.len()
    };

    (from < to).then_some((from, to))
}

/// Text covered by the selection between `start` and `end`, in either order.
///
/// Lines are clamped into the visible sequence. Inner lines are copied whole
/// and joined with `'\n'`. Zero-width or empty selections return "".
pub fn update_selection(lines: &[VisualLine], start: Point, end: Point) -> String {
    let Some(last_line) = lines.len().checked_sub(1) else {
        return String::new();
    };

    let (mut start, mut end) = normalize(start, end);
    start.line = start.line.min(last_line);
    end.line = end.line.min(last_line);

    let slice = |index: usize| -> String {
        let content = &lines[index].content;
        selected_char_range(index, content, start, end)
            .map(|(from, to)| content.chars().skip(from).take(to - from).collect())
            .unwrap_or_default()
    };

    if start.line == end.line {
        return slice(start.line);
    }

    (start.line..=end.line)
        .map(slice)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::display_width;
    use crate::core::message::MessageKind;

    fn lines(contents: &[&str]) -> Vec<VisualLine> {
        contents
            .iter()
            .map(|text| VisualLine::new(MessageKind::Assistant, *text))
            .collect()
    }

    #[test]
    fn single_line_selection_matches_column_span() {
        let lines = lines(&["hello world"]);
        for (from, to) in [(0, 5), (2, 9), (6, 11), (0, 11)] {
            let text = update_selection(&lines, Point::new(0, from), Point::new(0, to));
            assert!(!text.is_empty());
            assert_eq!(display_width(&text), to - from);
        }
    }

    #[test]
    fn reversed_points_are_normalized() {
        let lines = lines(&["hello world"]);
        let text = update_selection(&lines, Point::new(0, 11), Point::new(0, 6));
        assert_eq!(text, "world");
    }

    #[test]
    fn zero_width_selection_is_empty() {
        let lines = lines(&["hello"]);
        assert_eq!(
            update_selection(&lines, Point::new(0, 3), Point::new(0, 3)),
            ""
        );
    }

    #[test]
    fn multi_line_selection_joins_with_newlines() {
        let lines = lines(&["first line", "middle", "last line"]);
        let text = update_selection(&lines, Point::new(0, 6), Point::new(2, 4));
        assert_eq!(text, "line\nmiddle\nlast");
    }

    #[test]
    fn out_of_range_lines_are_clamped() {
        let lines = lines(&["alpha", "beta"]);
        let text = update_selection(&lines, Point::new(1, 0), Point::new(9, 99));
        assert_eq!(text, "beta");
    }

    #[test]
    fn empty_line_sequence_yields_empty_string() {
        assert_eq!(update_selection(&[], Point::new(0, 0), Point::new(3, 3)), "");
    }

    #[test]
    fn wide_glyph_columns_map_to_characters() {
        let chars: Vec<char> = "a你b".chars().collect();
        assert_eq!(visual_column_to_char_index(&chars, 0), 0);
        assert_eq!(visual_column_to_char_index(&chars, 1), 1);
        assert_eq!(visual_column_to_char_index(&chars, 2), 2);
        assert_eq!(visual_column_to_char_index(&chars, 3), 2);
        assert_eq!(visual_column_to_char_index(&chars, 4), 3);
        assert_eq!(visual_column_to_char_index(&chars, 40), 3);

        let lines = lines(&["a你b"]);
        assert_eq!(
            update_selection(&lines, Point::new(0, 1), Point::new(0, 3)),
            "你"
        );
    }

    #[test]
    fn selection_tracks_drag_and_reports_line_ranges() {
        let mut selection = Selection::new(Point::new(2, 3));
        selection.extend_to(Point::new(0, 1));
        assert_eq!(selection.normalized(), (Point::new(0, 1), Point::new(2, 3)));
        assert_eq!(selection.range_on_line(0, "abcdef"), Some((1, 6)));
        assert_eq!(selection.range_on_line(1, "xyz"), Some((0, 3)));
        assert_eq!(selection.range_on_line(2, "abcdef"), Some((0, 3)));
        assert_eq!(selection.range_on_line(3, "abcdef"), None);
    }
}
