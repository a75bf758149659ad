//! Converts the transcript into width-bounded visual lines.
//!
//! Everything here is a pure function of the messages and the terminal width:
//! the renderer, the scroll bounds and the selection engine all recompute the
//! same lines on demand instead of caching them.
//!
//! Widths are measured in terminal cells using East Asian Width rules, so a
//! CJK glyph occupies two columns while most Latin characters occupy one.

use std::ops::Range;

use unicode_width::UnicodeWidthChar;

use crate::core::message::{Message, MessageKind};

/// One already-wrapped row of the conversation view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualLine {
    pub kind: MessageKind,
    pub content: String,
}

impl VisualLine {
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// Display width of a single character; control characters count as zero.
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

pub fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Lazily lays out every message at the given width.
pub fn layout_lines(messages: &[Message], width: usize) -> impl Iterator<Item = VisualLine> + '_ {
    messages
        .iter()
        .flat_map(move |message| wrap_message(message, width))
}

/// Lays out every message at the given width. A width of zero disables wrapping.
pub fn wrap(messages: &[Message], width: usize) -> Vec<VisualLine> {
    layout_lines(messages, width).collect()
}

/// Number of visual lines the transcript occupies at `width`.
pub fn line_count(messages: &[Message], width: usize) -> usize {
    layout_lines(messages, width).count()
}

/// Wraps one message, placing its kind prefix on the first line.
///
/// Assistant replies are followed by a blank separator line.
pub fn wrap_message(message: &Message, width: usize) -> Vec<VisualLine> {
    let prefix = message.kind.prefix();
    let mut lines: Vec<VisualLine> = wrap_text(&message.content, width, display_width(prefix))
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            if index == 0 {
                VisualLine::new(message.kind, format!("{prefix}{text}"))
            } else {
                VisualLine::new(message.kind, text)
            }
        })
        .collect();

    if message.kind == MessageKind::Assistant {
        lines.push(VisualLine::new(message.kind, String::new()));
    }
    lines
}

/// Splits `text` into display lines no wider than `width` cells.
///
/// `first_line_offset` cells are already taken on the first line (by a prefix).
/// Explicit newlines always start a new line and are not part of the output.
pub fn wrap_text(text: &str, width: usize, first_line_offset: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    wrap_ranges(&chars, width, first_line_offset)
        .into_iter()
        .map(|range| chars[range].iter().collect())
        .collect()
}

/// Character ranges of each display line of `chars`; see [`wrap_text`].
///
/// Ranges never include the `'\n'` characters that separate hard lines, so the
/// concatenation of all ranges plus the skipped newlines covers the input once.
pub fn wrap_ranges(chars: &[char], width: usize, first_line_offset: usize) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut offset = first_line_offset;
    let mut line_start = 0;

    loop {
        let line_end = chars[line_start..]
            .iter()
            .position(|ch| *ch == '\n')
            .map_or(chars.len(), |pos| line_start + pos);

        if width == 0 || line_start == line_end {
            ranges.push(line_start..line_end);
        } else {
            let mut start = line_start;
            while start < line_end {
                let available = width.saturating_sub(offset);
                let end = start + find_break_point(&chars[start..line_end], available);
                ranges.push(start..end);
                start = end;
                offset = 0;
            }
        }
        offset = 0;

        if line_end >= chars.len() {
            break;
        }
        line_start = line_end + 1;
    }

    ranges
}

/// Number of characters from `chars` that go on the current line.
///
/// Prefers breaking right after the last whitespace that still fits; falls back
/// to a hard break at the width limit. Always consumes at least one character.
fn find_break_point(chars: &[char], width: usize) -> usize {
    let mut used = 0;
    let mut limit = chars.len();
    for (index, ch) in chars.iter().enumerate() {
        used += char_width(*ch);
        if used > width {
            limit = index;
            break;
        }
    }

    if limit == chars.len() {
        return limit;
    }

    (1..limit)
        .rev()
        .find(|&index| chars[index].is_whitespace())
        .map_or(limit.max(1), |index| index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_first_prefix(lines: &[VisualLine], prefix: &str) -> String {
        lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                if index == 0 {
                    line.content.strip_prefix(prefix).unwrap_or(&line.content)
                } else {
                    line.content.as_str()
                }
            })
            .collect()
    }

    #[test]
    fn user_message_breaks_at_space() {
        let lines = wrap(&[Message::user("aaaaaaaaaa bbbbbbbbbb")], 20);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].content, "> aaaaaaaaaa ");
        assert_eq!(lines[1].content, "bbbbbbbbbb");
        assert!(display_width(&lines[0].content) <= 20);
    }

    #[test]
    fn wrapping_preserves_every_character() {
        let samples = [
            "The quick brown fox jumps over the lazy dog",
            "no-spaces-at-all-in-this-rather-long-token",
            "  leading and   repeated   spaces  ",
            "混合 wide 字符和 ascii text 在一起",
            "x",
        ];
        for content in samples {
            for width in 1..30 {
                let message = Message::user(content);
                let lines = wrap_message(&message, width);
                assert_eq!(strip_first_prefix(&lines, "> "), content, "width {width}");
            }
        }
    }

    #[test]
    fn lines_respect_width_when_possible() {
        let message = Message::system("lorem ipsum dolor sit amet consectetur adipiscing");
        for width in 10..40 {
            for line in wrap_message(&message, width) {
                assert!(display_width(&line.content) <= width, "width {width}");
            }
        }
    }

    #[test]
    fn wide_glyphs_count_as_two_cells() {
        let lines = wrap_text("你好世界", 4, 0);
        assert_eq!(lines, vec!["你好".to_string(), "世界".to_string()]);
    }

    #[test]
    fn hard_break_without_whitespace() {
        assert_eq!(
            wrap_text("abcdefgh", 3, 0),
            vec!["abc".to_string(), "def".to_string(), "gh".to_string()]
        );
    }

    #[test]
    fn zero_width_leaves_content_unwrapped() {
        let content = "a fairly long line that would normally wrap";
        let lines = wrap(&[Message::notice(content)], 0);
        assert_eq!(lines, vec![VisualLine::new(MessageKind::Notice, content)]);
    }

    #[test]
    fn explicit_newlines_start_new_lines() {
        let lines = wrap_text("one\n\ntwo", 10, 0);
        assert_eq!(
            lines,
            vec!["one".to_string(), String::new(), "two".to_string()]
        );
    }

    #[test]
    fn prefix_only_shrinks_the_first_line() {
        let lines = wrap_text("abcdef\nabcdef", 6, 2);
        assert_eq!(
            lines,
            vec!["abcd".to_string(), "ef".to_string(), "abcdef".to_string()]
        );
    }

    #[test]
    fn assistant_reply_gets_trailing_blank_line() {
        let lines = wrap(&[Message::assistant("hi")], 40);
        assert_eq!(
            lines,
            vec![
                VisualLine::new(MessageKind::Assistant, "Assistant: hi"),
                VisualLine::new(MessageKind::Assistant, ""),
            ]
        );
    }

    #[test]
    fn notices_have_no_prefix() {
        let lines = wrap(&[Message::notice("welcome")], 40);
        assert_eq!(lines[0].content, "welcome");
    }

    #[test]
    fn narrow_terminal_still_terminates() {
        let lines = wrap_text("你好", 1, 5);
        assert_eq!(lines, vec!["你".to_string(), "好".to_string()]);
    }

    #[test]
    fn ranges_skip_newlines() {
        let chars: Vec<char> = "ab\ncd".chars().collect();
        assert_eq!(wrap_ranges(&chars, 10, 0), vec![0..2, 3..5]);
    }
}
