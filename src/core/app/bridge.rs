//! Turns the next message of the in-flight stream into an action.

use std::future::pending;

use super::actions::AppAction;
use super::session::ActiveStream;
use crate::core::chat_stream::StreamMessage;

/// Awaits one message from `stream`. Without a stream this never resolves,
/// so it can sit in a `select!` next to terminal input.
pub async fn receive_chunk(stream: Option<&mut ActiveStream>) -> AppAction {
    let Some(stream) = stream else {
        return pending().await;
    };
    let stream_id = stream.id;
    match stream.handle.recv().await {
        StreamMessage::Chunk(content) => AppAction::StreamChunk { stream_id, content },
        StreamMessage::Error(message) => AppAction::StreamErrored { stream_id, message },
        StreamMessage::End => AppAction::StreamCompleted { stream_id },
    }
}
