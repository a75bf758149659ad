use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::api::ChatMessage;
use crate::core::app::App;
use crate::core::chat_stream::{StreamHandle, StreamMessage, STREAM_BUFFER};
use crate::core::providers::builtin::default_temperature_presets;
use crate::core::providers::{
    MemoryStore, Provider, ProviderError, ProviderRegistry, ProviderSettings, ProviderSpec,
};

pub const TEST_SYSTEM_PROMPT: &str = "You are a test assistant.";

/// What a [`FakeProvider`] saw, shared with the test that built it.
#[derive(Debug, Default)]
pub struct FakeLog {
    pub requests: Vec<Vec<ChatMessage>>,
    pub cancel_tokens: Vec<CancellationToken>,
}

/// Provider that answers every request with the same scripted messages.
pub struct FakeProvider {
    spec: ProviderSpec,
    settings: ProviderSettings,
    script: Vec<StreamMessage>,
    /// Deliver through a one-slot channel from a spawned task instead of
    /// preloading the whole script.
    paced: bool,
    /// Refuse to start a stream with this error.
    start_error: Option<ProviderError>,
    log: Arc<Mutex<FakeLog>>,
}

impl FakeProvider {
    pub fn new(name: &str, api_key: Option<&str>) -> Self {
        let spec = ProviderSpec {
            name: name.to_string(),
            base_url: "http://localhost:0/v1".to_string(),
            api_key_env: None,
            models: vec!["fake-small".to_string(), "fake-large".to_string()],
            default_model: "fake-small".to_string(),
            default_temperature: 1.0,
            min_temperature: 0.0,
            max_temperature: 2.0,
            fixed_temperature_models: Vec::new(),
            presets: default_temperature_presets(),
        };
        let mut settings = ProviderSettings::defaults_for(&spec);
        settings.api_key = api_key.map(str::to_string);
        Self {
            spec,
            settings,
            script: vec![StreamMessage::End],
            paced: false,
            start_error: None,
            log: Arc::new(Mutex::new(FakeLog::default())),
        }
    }

    pub fn with_script(mut self, script: Vec<StreamMessage>) -> Self {
        self.script = script;
        self
    }

    pub fn paced(mut self) -> Self {
        self.paced = true;
        self
    }

    pub fn failing_with(mut self, err: ProviderError) -> Self {
        self.start_error = Some(err);
        self
    }

    pub fn log(&self) -> Arc<Mutex<FakeLog>> {
        Arc::clone(&self.log)
    }
}

impl Provider for FakeProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut ProviderSettings {
        &mut self.settings
    }

    fn send_streaming_chat_request(
        &self,
        messages: Vec<ChatMessage>,
        cancel: CancellationToken,
    ) -> Result<StreamHandle, ProviderError> {
        self.require_api_key()?;
        if let Some(err) = &self.start_error {
            return Err(err.clone());
        }
        {
            let mut log = self.log.lock().expect("fake log poisoned");
            log.requests.push(messages);
            log.cancel_tokens.push(cancel.clone());
        }

        if self.paced {
            let (sender, handle) = StreamHandle::channel(STREAM_BUFFER, cancel);
            let script = self.script.clone();
            tokio::spawn(async move {
                for message in script {
                    if !sender.send(message).await {
                        break;
                    }
                }
            });
            return Ok(handle);
        }

        let (sender, handle) = StreamHandle::channel(self.script.len() + 1, cancel);
        for message in &self.script {
            sender.try_send(message.clone());
        }
        Ok(handle)
    }
}

pub fn create_test_registry(providers: Vec<FakeProvider>, store: MemoryStore) -> ProviderRegistry {
    let providers = providers
        .into_iter()
        .map(|provider| Box::new(provider) as Box<dyn Provider>)
        .collect();
    ProviderRegistry::new(providers, Box::new(store)).expect("at least one provider")
}

pub fn create_test_app_with(providers: Vec<FakeProvider>) -> App {
    App::new(
        create_test_registry(providers, MemoryStore::new()),
        TEST_SYSTEM_PROMPT,
        20,
    )
}

/// A session whose active provider `fake` is ready and answers "ok".
pub fn create_test_app() -> App {
    create_test_app_with(vec![
        FakeProvider::new("fake", Some("sk-fake-1234567890"))
            .with_script(vec![StreamMessage::Chunk("ok".into()), StreamMessage::End]),
        FakeProvider::new("offline", None),
    ])
}
