use super::{AppAction, AppCommand};
use crate::core::app::App;
use crate::core::selection::{update_selection, Point, Selection};

pub(super) fn handle_viewport_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    let total = app.total_lines();
    let height = app.viewport_height();

    match action {
        AppAction::ScrollBy(delta) => app.ui.scroll.scroll_by(delta, total, height),
        AppAction::PageUp => app.ui.scroll.page_up(total, height),
        AppAction::PageDown => app.ui.scroll.page_down(total, height),
        AppAction::ScrollToTop => app.ui.scroll.to_top(total, height),
        AppAction::ScrollToBottom => app.ui.scroll.to_bottom(total, height),
        AppAction::Resize { width, height } => {
            app.ui.width = width;
            app.ui.height = height;
            app.ui.selection = None;
            app.ui.selecting = false;
            app.follow_transcript();
        }
        AppAction::Tick => app.ui.cursor_visible = !app.ui.cursor_visible,
        AppAction::SelectionStart { column, row } => {
            if app.ui.selectors.active().is_some() || usize::from(row) >= height {
                return None;
            }
            let point = transcript_point(app, column, row);
            app.ui.selection = Some(Selection::new(point));
            app.ui.selecting = true;
            app.ui.scroll.auto_follow = false;
        }
        AppAction::SelectionDrag { column, row } => {
            if app.ui.selecting {
                let point = transcript_point(app, column, row);
                if let Some(selection) = app.ui.selection.as_mut() {
                    selection.extend_to(point);
                }
            }
        }
        AppAction::SelectionEnd { column, row } => {
            if !app.ui.selecting {
                return None;
            }
            app.ui.selecting = false;
            let point = transcript_point(app, column, row);
            let selection = app.ui.selection.as_mut()?;
            selection.extend_to(point);
            let (start, end) = selection.normalized();

            let text = update_selection(&app.visual_lines(), start, end);
            if text.is_empty() {
                app.ui.selection = None;
                return None;
            }
            return Some(AppCommand::CopyToClipboard(text));
        }
        _ => unreachable!("non-viewport action routed to viewport handler"),
    }
    None
}

/// Maps a screen cell inside the conversation area to visual-line space.
/// Rows below the conversation clamp to its last row.
fn transcript_point(app: &App, column: u16, row: u16) -> Point {
    let last_row = app.viewport_height().saturating_sub(1);
    let row = usize::from(row).min(last_row);
    Point::new(app.ui.scroll.position + row, usize::from(column))
}
