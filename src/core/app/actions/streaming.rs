use tracing::{debug, warn};

use super::{input, AppAction, AppCommand};
use crate::core::app::App;
use crate::core::message::Message;

pub(super) fn handle_streaming_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::StreamChunk { stream_id, content } => {
            let index = app.session.current_reply(stream_id)?;
            app.ui.messages.extend_assistant(index, &content);
            app.follow_transcript();
            Some(AppCommand::ReceiveChunk { stream_id })
        }
        AppAction::StreamErrored { stream_id, message } => {
            let index = app.session.current_reply(stream_id)?;
            warn!(stream_id, error = %message, "stream failed");
            app.ui.messages.fail_assistant(index, message);
            end_turn(app);
            None
        }
        AppAction::StreamCompleted { stream_id } => {
            app.session.current_reply(stream_id)?;
            end_turn(app);
            None
        }
        _ => unreachable!("non-streaming action routed to streaming handler"),
    }
}

/// Appends `text` as a User message and asks the active provider for a reply.
///
/// A provider without an API key diverts into key entry instead, keeping the
/// text so it can be put back into the prompt.
pub(super) fn start_turn(app: &mut App, text: String) -> Option<AppCommand> {
    if text.trim().is_empty() {
        return None;
    }

    let status = app.session.providers.active();
    if !status.is_ready {
        debug!(provider = %status.name, "provider not ready, asking for a key");
        input::begin_api_key_entry(app, text);
        return None;
    }

    app.ui.scroll.auto_follow = true;
    app.push_message(Message::user(text));
    let history = app.ui.messages.recent_history(app.session.history_limit);
    let reply_index = app.push_message(Message::assistant(""));

    match app.session.begin_stream(history, reply_index) {
        Ok(stream_id) => {
            app.ui.input.clear();
            app.ui.input_enabled = false;
            Some(AppCommand::ReceiveChunk { stream_id })
        }
        Err(err) => {
            warn!(error = %err, "failed to start stream");
            app.ui.messages.fail_assistant(reply_index, err.to_string());
            app.follow_transcript();
            None
        }
    }
}

/// Stops consuming the current reply and signals its producer to stop.
pub(super) fn cancel_turn(app: &mut App) -> bool {
    if app.session.cancel_stream() {
        app.ui.input_enabled = true;
        app.follow_transcript();
        true
    } else {
        false
    }
}

fn end_turn(app: &mut App) {
    app.session.finish_stream();
    app.ui.input_enabled = true;
    app.follow_transcript();
}
