use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::ChatMessage;
use crate::core::chat_stream::StreamHandle;
use crate::core::providers::{ProviderError, ProviderRegistry};

/// The single in-flight reply and everything needed to route its chunks.
#[derive(Debug)]
pub struct ActiveStream {
    pub id: u64,
    pub handle: StreamHandle,
    pub cancel: CancellationToken,
    /// Index of the Assistant message receiving the chunks.
    pub reply_index: usize,
}

pub struct SessionContext {
    pub providers: ProviderRegistry,
    pub stream: Option<ActiveStream>,
    pub history_limit: usize,
    last_stream_id: u64,
}

impl SessionContext {
    pub fn new(providers: ProviderRegistry, history_limit: usize) -> Self {
        Self {
            providers,
            stream: None,
            history_limit,
            last_stream_id: 0,
        }
    }

    /// Asks the active provider for a reply and takes ownership of the handle.
    /// Any previous stream is cancelled first.
    pub fn begin_stream(
        &mut self,
        messages: Vec<ChatMessage>,
        reply_index: usize,
    ) -> Result<u64, ProviderError> {
        self.cancel_stream();

        let cancel = CancellationToken::new();
        let handle = self
            .providers
            .send_streaming_chat_request(messages, cancel.clone())?;

        self.last_stream_id += 1;
        let id = self.last_stream_id;
        self.stream = Some(ActiveStream {
            id,
            handle,
            cancel,
            reply_index,
        });
        debug!(stream_id = id, "stream started");
        Ok(id)
    }

    /// Reply index of `stream_id` if it is still the current stream.
    pub fn current_reply(&self, stream_id: u64) -> Option<usize> {
        self.stream
            .as_ref()
            .filter(|stream| stream.id == stream_id)
            .map(|stream| stream.reply_index)
    }

    /// Drops the handle of a stream that ended on its own.
    pub fn finish_stream(&mut self) {
        if let Some(stream) = self.stream.take() {
            debug!(stream_id = stream.id, "stream finished");
        }
    }

    /// Signals the producer to stop and drops the handle.
    pub fn cancel_stream(&mut self) -> bool {
        match self.stream.take() {
            Some(stream) => {
                stream.cancel.cancel();
                debug!(stream_id = stream.id, "stream cancelled");
                true
            }
            None => false,
        }
    }
}
