use futures_util::StreamExt;
use memchr::memchr;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::utils::url::construct_api_url;

/// Chunks buffered between the network task and the UI. With one slot the
/// producer can only run a single chunk ahead of the consumer.
pub const STREAM_BUFFER: usize = 1;

#[derive(Clone, Debug, PartialEq)]
pub enum StreamMessage {
    Chunk(String),
    Error(String),
    End,
}

impl StreamMessage {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamMessage::Chunk(_))
    }
}

/// Receiving end of one streamed reply.
#[derive(Debug)]
pub struct StreamHandle {
    rx: mpsc::Receiver<StreamMessage>,
}

impl StreamHandle {
    pub fn channel(capacity: usize, cancel: CancellationToken) -> (StreamSender, StreamHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (StreamSender { tx, cancel }, StreamHandle { rx })
    }

    /// Waits for the next message. A producer that went away without a
    /// terminal message reads as `End`.
    pub async fn recv(&mut self) -> StreamMessage {
        self.rx.recv().await.unwrap_or(StreamMessage::End)
    }
}

#[derive(Clone, Debug)]
pub struct StreamSender {
    tx: mpsc::Sender<StreamMessage>,
    cancel: CancellationToken,
}

impl StreamSender {
    /// Waits for room in the channel. Returns false once the stream has been
    /// cancelled or the receiver is gone, so the producer never stays parked.
    pub async fn send(&self, message: StreamMessage) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            result = self.tx.send(message) => result.is_ok(),
        }
    }

    /// Non-blocking send for producers that already hold the whole reply.
    pub fn try_send(&self, message: StreamMessage) -> bool {
        !self.cancel.is_cancelled() && self.tx.try_send(message).is_ok()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim)
}

/// Interprets one SSE line. Returns `None` for lines that carry nothing for
/// the transcript: comments, blank keep-alives, empty deltas and payloads
/// that fail to parse.
pub fn parse_sse_line(line: &str) -> Option<StreamMessage> {
    let payload = extract_data_payload(line.trim())?;
    if payload == "[DONE]" {
        return Some(StreamMessage::End);
    }
    if payload.is_empty() {
        return None;
    }

    let response = match serde_json::from_str::<ChatResponse>(payload) {
        Ok(response) => response,
        Err(err) => {
            debug!(error = %err, "skipping malformed stream payload");
            return None;
        }
    };

    if let Some(error) = response.error.as_ref().filter(|value| !value.is_null()) {
        let summary = extract_error_summary(error).unwrap_or_else(|| error.to_string());
        return Some(StreamMessage::Error(format!("API error: {}", summary)));
    }

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
        .map(StreamMessage::Chunk)
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = match value {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(|message| message.as_str().map(str::to_owned))
            .or_else(|| {
                map.get("error")
                    .and_then(extract_error_summary)
            }),
        _ => None,
    };

    summary
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}

/// Formats a non-success HTTP response for display in the transcript.
pub fn format_api_error(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value) {
            return format!("API error ({}): {}", status, summary);
        }
    }

    if trimmed.is_empty() {
        format!("API error ({})", status)
    } else {
        format!("API error ({}): {}", status, trimmed)
    }
}

pub struct StreamParams {
    pub client: reqwest::Client,
    pub base_url: String,
    pub api_key: String,
    pub provider_name: String,
    pub model: String,
    pub temperature: Option<f64>,
    pub api_messages: Vec<ChatMessage>,
}

/// Runs the request on a background task that feeds `sender`.
pub fn spawn_stream(params: StreamParams, sender: StreamSender) {
    tokio::spawn(async move {
        let cancel_token = sender.cancel_token();
        let provider = params.provider_name.clone();
        tokio::select! {
            _ = run_stream(params, &sender) => {
                debug!(provider = %provider, "chat stream finished");
            }
            _ = cancel_token.cancelled() => {
                debug!(provider = %provider, "chat stream cancelled");
            }
        }
    });
}

async fn run_stream(params: StreamParams, sender: &StreamSender) {
    let StreamParams {
        client,
        base_url,
        api_key,
        provider_name,
        model,
        temperature,
        api_messages,
    } = params;

    debug!(
        provider = %provider_name,
        model = %model,
        messages = api_messages.len(),
        "starting chat stream"
    );

    let request = ChatRequest {
        model,
        messages: api_messages,
        temperature,
        stream: true,
    };

    let chat_url = construct_api_url(&base_url, "chat/completions");
    let response = match client
        .post(chat_url)
        .header("Content-Type", "application/json")
        .bearer_auth(&api_key)
        .json(&request)
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            sender
                .send(StreamMessage::Error(format!("Request failed: {}", err)))
                .await;
            return;
        }
    };

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        sender
            .send(StreamMessage::Error(format_api_error(status, &body)))
            .await;
        return;
    }

    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(err) => {
                sender
                    .send(StreamMessage::Error(format!("Error reading stream: {}", err)))
                    .await;
                return;
            }
        };
        buffer.extend_from_slice(&bytes);

        while let Some(newline_pos) = memchr(b'\n', &buffer) {
            let line: Vec<u8> = buffer.drain(..=newline_pos).collect();
            if !forward_line(&String::from_utf8_lossy(&line), sender).await {
                return;
            }
        }
    }

    if !buffer.is_empty() && !forward_line(&String::from_utf8_lossy(&buffer), sender).await {
        return;
    }

    // Body ended without [DONE].
    sender.send(StreamMessage::End).await;
}

/// Returns false when the stream is over, either because the line was
/// terminal or because nobody is listening any more.
async fn forward_line(line: &str, sender: &StreamSender) -> bool {
    match parse_sse_line(line) {
        Some(message) => {
            let terminal = message.is_terminal();
            sender.send(message).await && !terminal
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_deltas() {
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#),
            Some(StreamMessage::Chunk("Hel".into()))
        );
    }

    #[test]
    fn done_marker_ends_stream() {
        assert_eq!(parse_sse_line("data: [DONE]"), Some(StreamMessage::End));
        assert_eq!(parse_sse_line("data:[DONE]\r"), Some(StreamMessage::End));
    }

    #[test]
    fn skips_lines_without_content() {
        assert_eq!(parse_sse_line(""), None);
        assert_eq!(parse_sse_line(": keep-alive"), None);
        assert_eq!(parse_sse_line("event: ping"), None);
        assert_eq!(parse_sse_line("data: "), None);
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#),
            None
        );
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"content":""}}]}"#),
            None
        );
    }

    #[test]
    fn malformed_payloads_are_skipped() {
        assert_eq!(parse_sse_line("data: {not json"), None);
        assert_eq!(parse_sse_line("data: 42"), None);
    }

    #[test]
    fn error_payloads_end_the_stream() {
        let message = parse_sse_line(r#"data: {"error":{"message":"rate   limited"}}"#);
        assert_eq!(
            message,
            Some(StreamMessage::Error("API error: rate limited".into()))
        );
        assert!(message.is_some_and(|m| m.is_terminal()));
    }

    #[test]
    fn formats_http_errors() {
        assert_eq!(
            format_api_error(401, r#"{"error":{"message":"Invalid API key"}}"#),
            "API error (401): Invalid API key"
        );
        assert_eq!(format_api_error(502, "  "), "API error (502)");
        assert_eq!(
            format_api_error(500, "upstream exploded"),
            "API error (500): upstream exploded"
        );
    }

    #[tokio::test]
    async fn closed_channel_reads_as_end() {
        let (sender, mut handle) = StreamHandle::channel(4, CancellationToken::new());
        assert!(sender.try_send(StreamMessage::Chunk("a".into())));
        drop(sender);
        assert_eq!(handle.recv().await, StreamMessage::Chunk("a".into()));
        assert_eq!(handle.recv().await, StreamMessage::End);
    }

    #[tokio::test]
    async fn cancelled_sender_stops_waiting_for_room() {
        let cancel = CancellationToken::new();
        let (sender, _handle) = StreamHandle::channel(1, cancel.clone());
        assert!(sender.send(StreamMessage::Chunk("first".into())).await);

        let blocked = tokio::spawn({
            let sender = sender.clone();
            async move { sender.send(StreamMessage::Chunk("second".into())).await }
        });
        cancel.cancel();
        assert!(!blocked.await.expect("task joins"));
        assert!(!sender.try_send(StreamMessage::End));
    }
}
