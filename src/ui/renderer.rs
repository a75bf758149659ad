use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::core::app::{App, INPUT_RESERVED_ROWS};
use crate::core::layout::{display_width, wrap_ranges};
use crate::ui::selector::SelectorWidget;
use crate::ui::theme::Theme;

const PROMPT: &str = "> ";

pub fn ui(f: &mut Frame, app: &App, theme: &Theme) {
    if let Some(selector) = app.ui.selectors.active() {
        render_selector(f, f.area(), selector, theme);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(INPUT_RESERVED_ROWS),
        ])
        .split(f.area());

    f.render_widget(Paragraph::new(conversation_lines(app, theme)), chunks[0]);

    if app.shows_prompt() {
        let lines = input_lines(app, theme, usize::from(chunks[1].width));
        f.render_widget(Paragraph::new(lines), chunks[1]);
    }
}

/// The visible window of the transcript with the selection highlighted.
pub fn conversation_lines(app: &App, theme: &Theme) -> Vec<Line<'static>> {
    let lines = app.visual_lines();
    let start = app.ui.scroll.position.min(lines.len());
    let end = (start + app.viewport_height()).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            let style = theme.style_for(line.kind);
            let range = app
                .ui
                .selection
                .and_then(|selection| selection.range_on_line(start + offset, &line.content));

            match range {
                Some((from, to)) if from < to => {
                    let chars: Vec<char> = line.content.chars().collect();
                    let before: String = chars[..from].iter().collect();
                    let selected: String = chars[from..to].iter().collect();
                    let after: String = chars[to..].iter().collect();
                    Line::from(vec![
                        Span::styled(before, style),
                        Span::styled(selected, theme.selected_style_for(line.kind)),
                        Span::styled(after, style),
                    ])
                }
                _ => Line::from(Span::styled(line.content.clone(), style)),
            }
        })
        .collect()
}

/// Prompt rows around the cursor. API keys are shown as `*`.
pub fn input_lines(app: &App, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let chars: Vec<char> = if app.ui.api_key_entry.is_some() {
        vec!['*'; app.ui.input.chars().len()]
    } else {
        app.ui.input.chars().to_vec()
    };
    let cursor = app.ui.input.cursor();
    let prefix_width = display_width(PROMPT);

    // One spare cell keeps a cursor at the end of a full row visible.
    let ranges = wrap_ranges(&chars, width.saturating_sub(1), prefix_width);
    let cursor_row = ranges
        .iter()
        .rposition(|range| range.start <= cursor)
        .unwrap_or(0);

    let rows = usize::from(INPUT_RESERVED_ROWS);
    let first_row = (cursor_row + 1).saturating_sub(rows);

    ranges
        .iter()
        .enumerate()
        .skip(first_row)
        .take(rows)
        .map(|(row, range)| {
            let mut spans = Vec::new();
            if row == 0 {
                spans.push(Span::styled(PROMPT, theme.input_text_style));
            }
            if row == cursor_row && app.ui.cursor_visible {
                let at = cursor.clamp(range.start, range.end);
                let before: String = chars[range.start..at].iter().collect();
                let under = if at < range.end {
                    chars[at].to_string()
                } else {
                    " ".to_string()
                };
                let after: String = chars[(at + 1).min(range.end)..range.end].iter().collect();
                spans.push(Span::styled(before, theme.input_text_style));
                spans.push(Span::styled(under, theme.input_cursor_style));
                spans.push(Span::styled(after, theme.input_text_style));
            } else {
                let text: String = chars[range.clone()].iter().collect();
                spans.push(Span::styled(text, theme.input_text_style));
            }
            Line::from(spans)
        })
        .collect()
}

fn render_selector(f: &mut Frame, area: Rect, selector: &SelectorWidget, theme: &Theme) {
    let title = format!(
        " {} (↑/↓ to navigate, Enter to select, ESC to cancel):",
        selector.title
    );
    let visible = usize::from(area.height.saturating_sub(2)).max(1);
    let current = selector.current_index();
    let first = (current + 1).saturating_sub(visible);

    let mut lines = vec![
        Line::from(Span::styled(title, theme.selector_title_style)),
        Line::default(),
    ];
    lines.extend(selector_lines(selector, theme).into_iter().skip(first).take(visible));
    f.render_widget(Paragraph::new(lines), area);
}

pub fn selector_lines(selector: &SelectorWidget, theme: &Theme) -> Vec<Line<'static>> {
    selector
        .options()
        .iter()
        .enumerate()
        .map(|(index, option)| {
            if index == selector.current_index() {
                Line::from(Span::styled(
                    format!("> [*] {}. {}", index + 1, option.label),
                    theme.selector_highlight_style,
                ))
            } else {
                Line::from(Span::styled(
                    format!("  [ ] {}. {}", index + 1, option.label),
                    theme.selector_option_style,
                ))
            }
        })
        .collect()
}
