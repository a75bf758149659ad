use tracing::{debug, warn};

use super::{selector, streaming, AppAction, AppCommand};
use crate::core::app::ui_state::ApiKeyEntry;
use crate::core::app::{help_text, App, SessionMode};
use crate::core::message::Message;
use crate::ui::selector::{SelectorKind, SelectorSet};
use crate::utils::input::{sanitize_text_input, InputBuffer};

pub(super) fn handle_input_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::Interrupt => {
            interrupt(app);
            None
        }
        AppAction::Submit => submit(app),
        AppAction::SubmitText(text) => {
            if app.mode() == SessionMode::Idle {
                streaming::start_turn(app, text)
            } else {
                None
            }
        }
        AppAction::InsertChar(ch) => {
            if matches!(app.mode(), SessionMode::SelectorActive(_)) {
                return ch
                    .to_digit(10)
                    .filter(|digit| *digit > 0)
                    .and_then(|digit| selector::confirm_by_number(app, digit as usize));
            }
            if !editable(app) {
                return None;
            }
            app.ui.input.insert(ch);
            run_command(app);
            None
        }
        action => {
            if editable(app) {
                edit(&mut app.ui.input, action);
            }
            None
        }
    }
}

/// The prompt accepts edits only while it is shown.
fn editable(app: &App) -> bool {
    match app.mode() {
        SessionMode::ApiKeyEntry => true,
        SessionMode::Idle => app.shows_prompt(),
        _ => false,
    }
}

fn edit(input: &mut InputBuffer, action: AppAction) {
    match action {
        AppAction::InsertNewline => input.insert('\n'),
        AppAction::Paste(text) => input.insert_str(&sanitize_text_input(&text)),
        AppAction::Backspace => input.backspace(),
        AppAction::Delete => input.delete(),
        AppAction::CursorLeft => input.move_left(),
        AppAction::CursorRight => input.move_right(),
        _ => unreachable!("non-editing action routed to input editor"),
    }
}

/// Esc / Ctrl-C unwind one level: selector, key entry, stream, then the session.
fn interrupt(app: &mut App) {
    match app.mode() {
        SessionMode::SelectorActive(kind) => {
            if let Some(widget) = app.ui.selectors.active_mut() {
                widget.cancel();
            }
            debug!(selector = ?kind, "selector cancelled");
        }
        SessionMode::ApiKeyEntry => finish_api_key_entry(app),
        SessionMode::Streaming => {
            streaming::cancel_turn(app);
        }
        SessionMode::Idle => app.ui.exit_requested = true,
    }
}

fn submit(app: &mut App) -> Option<AppCommand> {
    match app.mode() {
        SessionMode::SelectorActive(_) => selector::confirm_active(app),
        SessionMode::ApiKeyEntry => {
            submit_api_key(app);
            None
        }
        SessionMode::Streaming => None,
        SessionMode::Idle => {
            if !app.shows_prompt() {
                return None;
            }
            let text = app.ui.input.text();
            streaming::start_turn(app, text)
        }
    }
}

/// Runs the in-session command the prompt spells out, if any.
fn run_command(app: &mut App) {
    if app.ui.api_key_entry.is_some() {
        return;
    }
    let command = match app.ui.input.text().as_str() {
        ":h" => Command::Help,
        ":c" => Command::Clear,
        ":p" => Command::Select(SelectorKind::Provider),
        ":m" => Command::Select(SelectorKind::Model),
        ":t" => Command::Select(SelectorKind::Temperature),
        ":k" => Command::ApiKey,
        _ => return,
    };
    app.ui.input.clear();

    match command {
        Command::Help => {
            app.ui.scroll.auto_follow = true;
            let help = help_text(&app.session.providers.active());
            app.push_message(Message::notice(help));
        }
        Command::Clear => {
            app.ui.messages.clear();
            app.ui.selection = None;
            app.ui.scroll.auto_follow = true;
            app.follow_transcript();
        }
        Command::Select(kind) => selector::open(app, kind),
        Command::ApiKey => begin_api_key_entry(app, String::new()),
    }
}

enum Command {
    Help,
    Clear,
    Select(SelectorKind),
    ApiKey,
}

/// Switches the prompt to masked key entry for the active provider.
pub(super) fn begin_api_key_entry(app: &mut App, stashed_input: String) {
    let name = app.session.providers.active().name;
    app.ui.api_key_entry = Some(ApiKeyEntry { stashed_input });
    app.ui.input.clear();
    app.ui.scroll.auto_follow = true;
    app.push_message(Message::notice(format!(
        "Please enter your API key of {}:",
        name
    )));
}

fn submit_api_key(app: &mut App) {
    let key = app.ui.input.text();
    match app.session.providers.set_api_key(&key) {
        Ok(()) => {
            let name = app.session.providers.active().name;
            app.push_message(Message::notice(format!(
                "API key for '{}' has been set successfully.",
                name
            )));
        }
        Err(err) if err.is_validation() => {
            debug!(error = %err, "api key rejected");
            return;
        }
        Err(err) => {
            warn!(error = %err, "failed to store api key");
            app.push_message(Message::error(format!("Error setting API key: {}", err)));
        }
    }
    app.ui.selectors = SelectorSet::from_registry(&app.session.providers);
    finish_api_key_entry(app);
}

fn finish_api_key_entry(app: &mut App) {
    if let Some(entry) = app.ui.api_key_entry.take() {
        app.ui.input = InputBuffer::with_text(&entry.stashed_input);
    }
}
