//! TUI-less query: stream one answer to stdout.

use std::error::Error;
use std::io::{self, Write};

use tokio_util::sync::CancellationToken;

use crate::api::ChatMessage;
use crate::core::chat_stream::{StreamHandle, StreamMessage};
use crate::core::providers::{ProviderError, ProviderRegistry};

pub async fn run_oneshot(
    registry: &ProviderRegistry,
    system_prompt: &str,
    prompt: &str,
) -> Result<(), Box<dyn Error>> {
    if prompt.trim().is_empty() {
        return Err("a prompt is required with --no-interaction".into());
    }

    let messages = vec![
        ChatMessage::new("system", system_prompt),
        ChatMessage::new("user", prompt),
    ];
    let handle = registry.send_streaming_chat_request(messages, CancellationToken::new())?;

    let mut stdout = io::stdout();
    stream_to_writer(handle, &mut stdout).await
}

/// Writes chunks as they arrive and ends the output with a newline.
pub async fn stream_to_writer<W: Write>(
    mut handle: StreamHandle,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    loop {
        match handle.recv().await {
            StreamMessage::Chunk(content) => {
                write!(out, "{}", content)?;
                out.flush()?;
            }
            StreamMessage::Error(message) => {
                writeln!(out)?;
                return Err(Box::new(ProviderError::Transport(message)));
            }
            StreamMessage::End => {
                writeln!(out)?;
                return Ok(());
            }
        }
    }
}
