use tokio_util::sync::CancellationToken;

use super::{request_temperature, Provider, ProviderError, ProviderSettings, ProviderSpec};
use crate::api::ChatMessage;
use crate::core::chat_stream::{spawn_stream, StreamHandle, StreamParams, STREAM_BUFFER};

/// Provider speaking the OpenAI chat-completions SSE protocol.
pub struct OpenAiCompatibleProvider {
    spec: ProviderSpec,
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(spec: ProviderSpec, settings: ProviderSettings, client: reqwest::Client) -> Self {
        Self {
            spec,
            settings,
            client,
        }
    }
}

impl Provider for OpenAiCompatibleProvider {
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
        let api_key = self.require_api_key()?;
        let (sender, handle) = StreamHandle::channel(STREAM_BUFFER, cancel);

        spawn_stream(
            StreamParams {
                client: self.client.clone(),
                base_url: self.spec.base_url.clone(),
                api_key,
                provider_name: self.spec.name.clone(),
                model: self.settings.model.clone(),
                temperature: request_temperature(&self.spec, &self.settings),
                api_messages: messages,
            },
            sender,
        );

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::providers::builtin::load_builtin_providers;

    fn deepseek() -> OpenAiCompatibleProvider {
        let spec = load_builtin_providers()
            .expect("builtin table parses")
            .into_iter()
            .find(|spec| spec.name == "deepseek")
            .expect("deepseek present");
        let settings = ProviderSettings::defaults_for(&spec);
        OpenAiCompatibleProvider::new(spec, settings, reqwest::Client::new())
    }

    #[test]
    fn refuses_to_stream_without_key() {
        let provider = deepseek();
        assert!(!provider.is_ready());
        let result = provider.send_streaming_chat_request(Vec::new(), CancellationToken::new());
        assert!(matches!(result, Err(ProviderError::NotReady { .. })));
    }

    #[test]
    fn default_methods_validate_through_spec() {
        let mut provider = deepseek();
        assert!(provider.set_model("deepseek-reasoner").is_ok());
        assert_eq!(provider.settings().model, "deepseek-reasoner");
        assert!(provider.set_model("gpt-4o").is_err());
        assert_eq!(provider.settings().model, "deepseek-reasoner");

        assert!(provider.set_temperature(1.5).is_ok());
        assert!(provider.set_temperature(3.0).is_err());
        assert_eq!(provider.settings().temperature, 1.5);

        assert!(provider.set_api_key(" sk-deepseek-key ").is_ok());
        assert!(provider.is_ready());
        assert_eq!(provider.masked_api_key().as_deref(), Some("sk-d****-key"));
    }
}
