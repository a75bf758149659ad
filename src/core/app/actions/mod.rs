mod input;
mod selector;
mod streaming;
mod viewport;

use super::App;
use crate::ui::selector::SelectorKind;

/// Everything the session reacts to. Terminal input is translated into these
/// by the key bindings; stream and timer events are produced by the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    InsertChar(char),
    InsertNewline,
    Paste(String),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    /// Enter: confirm a selector, store an API key, or send the prompt.
    Submit,
    /// Sends `text` as if it had been typed and submitted.
    SubmitText(String),
    /// Esc / Ctrl-C.
    Interrupt,
    OpenSelector(SelectorKind),
    MoveUp,
    MoveDown,
    ScrollBy(isize),
    PageUp,
    PageDown,
    ScrollToTop,
    ScrollToBottom,
    SelectionStart {
        column: u16,
        row: u16,
    },
    SelectionDrag {
        column: u16,
        row: u16,
    },
    SelectionEnd {
        column: u16,
        row: u16,
    },
    Resize {
        width: u16,
        height: u16,
    },
    /// Cursor blink timer.
    Tick,
    StreamChunk {
        stream_id: u64,
        content: String,
    },
    StreamErrored {
        stream_id: u64,
        message: String,
    },
    StreamCompleted {
        stream_id: u64,
    },
}

/// Side effects the loop performs on behalf of the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Await exactly one message from the stream, then feed it back in.
    ReceiveChunk { stream_id: u64 },
    CopyToClipboard(String),
}

pub fn apply_actions(app: &mut App, actions: impl IntoIterator<Item = AppAction>) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for action in actions {
        if let Some(cmd) = apply_action(app, action) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::StreamChunk { .. }
        | AppAction::StreamErrored { .. }
        | AppAction::StreamCompleted { .. } => streaming::handle_streaming_action(app, action),

        AppAction::InsertChar(_)
        | AppAction::InsertNewline
        | AppAction::Paste(_)
        | AppAction::Backspace
        | AppAction::Delete
        | AppAction::CursorLeft
        | AppAction::CursorRight
        | AppAction::Submit
        | AppAction::SubmitText(_)
        | AppAction::Interrupt => input::handle_input_action(app, action),

        AppAction::OpenSelector(_) | AppAction::MoveUp | AppAction::MoveDown => {
            selector::handle_selector_action(app, action)
        }

        AppAction::ScrollBy(_)
        | AppAction::PageUp
        | AppAction::PageDown
        | AppAction::ScrollToTop
        | AppAction::ScrollToBottom
        | AppAction::SelectionStart { .. }
        | AppAction::SelectionDrag { .. }
        | AppAction::SelectionEnd { .. }
        | AppAction::Resize { .. }
        | AppAction::Tick => viewport::handle_viewport_action(app, action),
    }
}
