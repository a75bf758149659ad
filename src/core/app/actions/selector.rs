use tracing::{debug, warn};

use super::{AppAction, AppCommand};
use crate::core::app::{App, SessionMode};
use crate::core::message::Message;
use crate::ui::selector::{SelectorKind, SelectorSet, SelectorValue};

pub(super) fn handle_selector_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::OpenSelector(kind) => {
            if matches!(app.mode(), SessionMode::Idle | SessionMode::SelectorActive(_)) {
                open(app, kind);
            }
            None
        }
        AppAction::MoveUp => {
            match app.ui.selectors.active_mut() {
                Some(widget) => widget.previous(),
                None => scroll_line(app, -1),
            }
            None
        }
        AppAction::MoveDown => {
            match app.ui.selectors.active_mut() {
                Some(widget) => widget.next(),
                None => scroll_line(app, 1),
            }
            None
        }
        _ => unreachable!("non-selector action routed to selector handler"),
    }
}

fn scroll_line(app: &mut App, delta: isize) {
    let total = app.total_lines();
    let height = app.viewport_height();
    app.ui.scroll.scroll_by(delta, total, height);
}

/// Rebuilds the pickers from the registry and activates `kind`.
pub(super) fn open(app: &mut App, kind: SelectorKind) {
    app.ui.selectors = SelectorSet::from_registry(&app.session.providers);
    app.ui.selectors.activate(kind);
    debug!(selector = ?kind, "selector opened");
}

pub(super) fn confirm_active(app: &mut App) -> Option<AppCommand> {
    let value = app.ui.selectors.active_mut()?.confirm()?;
    apply_value(app, value);
    None
}

/// Numeric shortcut: `number` is 1-based. Out-of-range numbers are ignored.
pub(super) fn confirm_by_number(app: &mut App, number: usize) -> Option<AppCommand> {
    let widget = app.ui.selectors.active_mut()?;
    if !widget.select_by_index(number - 1) {
        return None;
    }
    confirm_active(app)
}

fn apply_value(app: &mut App, value: SelectorValue) {
    let registry = &mut app.session.providers;
    let result = match &value {
        SelectorValue::Provider(name) => registry.set_active_provider(name),
        SelectorValue::Model(model) => registry.set_model(model),
        SelectorValue::Temperature(temperature) => registry.set_temperature(*temperature),
    };

    match result {
        Ok(()) => debug!(value = ?value, "selection applied"),
        Err(err) if err.is_validation() => debug!(error = %err, "selection rejected"),
        Err(err) => {
            warn!(error = %err, "failed to apply selection");
            app.push_message(Message::error(err.to_string()));
        }
    }
    app.ui.selectors = SelectorSet::from_registry(&app.session.providers);
}
