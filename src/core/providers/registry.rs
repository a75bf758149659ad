use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::openai_compatible::OpenAiCompatibleProvider;
use super::{
    validate_api_key, validate_model, validate_temperature, Provider, ProviderError,
    ProviderSettings, ProviderSpec, SettingsStore, TemperaturePreset,
};
use crate::api::ChatMessage;
use crate::core::chat_stream::StreamHandle;
use crate::core::config::data::Config;

/// Snapshot of the active provider for display and selector building.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderStatus {
    pub name: String,
    pub current_model: String,
    pub current_temperature: f64,
    pub available_models: Vec<String>,
    pub temperature_presets: Vec<TemperaturePreset>,
    pub is_ready: bool,
    pub masked_api_key: Option<String>,
}

/// The providers available to a session, in a stable order, plus which one
/// is active. Mutations are written to the store before they take effect.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn Provider>>,
    active: usize,
    store: Box<dyn SettingsStore>,
}

impl ProviderRegistry {
    /// The first provider starts out active.
    pub fn new(
        providers: Vec<Box<dyn Provider>>,
        store: Box<dyn SettingsStore>,
    ) -> Result<Self, ProviderError> {
        if providers.is_empty() {
            return Err(ProviderError::UnknownProvider(
                "no providers configured".to_string(),
            ));
        }
        Ok(Self {
            providers,
            active: 0,
            store,
        })
    }

    /// Builds OpenAI-compatible providers for `specs`, applying saved model,
    /// temperature and key choices from `config`. `lookup_key` supplies keys
    /// kept outside the config file.
    pub fn from_config(
        specs: Vec<ProviderSpec>,
        config: &Config,
        lookup_key: impl Fn(&ProviderSpec) -> Option<String>,
        store: Box<dyn SettingsStore>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::new();
        let providers = specs
            .into_iter()
            .map(|spec| {
                let settings = saved_settings(&spec, config, &lookup_key);
                Box::new(OpenAiCompatibleProvider::new(spec, settings, client.clone()))
                    as Box<dyn Provider>
            })
            .collect();

        let mut registry = Self::new(providers, store)?;
        if let Some(name) = config.provider.as_deref() {
            if let Err(err) = registry.activate_without_saving(name) {
                debug!(provider = %name, error = %err, "ignoring unknown saved provider");
            }
        }
        Ok(registry)
    }

    fn position(&self, name: &str) -> Result<usize, ProviderError> {
        self.providers
            .iter()
            .position(|provider| provider.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ProviderError::UnknownProvider(name.to_string()))
    }

    /// Switches provider for this session only.
    pub fn activate_without_saving(&mut self, name: &str) -> Result<(), ProviderError> {
        self.active = self.position(name)?;
        Ok(())
    }

    /// Overrides the active model for this session only.
    pub fn override_model(&mut self, model: &str) -> Result<(), ProviderError> {
        self.active_provider_mut().set_model(model)
    }

    pub fn active_provider(&self) -> &dyn Provider {
        self.providers[self.active].as_ref()
    }

    fn active_provider_mut(&mut self) -> &mut dyn Provider {
        self.providers[self.active].as_mut()
    }

    pub fn active(&self) -> ProviderStatus {
        let provider = self.active_provider();
        let settings = provider.settings();
        ProviderStatus {
            name: provider.name().to_string(),
            current_model: settings.model.clone(),
            current_temperature: settings.temperature,
            available_models: provider.models().to_vec(),
            temperature_presets: provider.temperature_presets().to_vec(),
            is_ready: provider.is_ready(),
            masked_api_key: provider.masked_api_key(),
        }
    }

    /// Every provider name with its readiness, in registry order.
    pub fn provider_names(&self) -> Vec<(String, bool)> {
        self.providers
            .iter()
            .map(|provider| (provider.name().to_string(), provider.is_ready()))
            .collect()
    }

    pub fn set_active_provider(&mut self, name: &str) -> Result<(), ProviderError> {
        let index = self.position(name)?;
        let canonical = self.providers[index].name().to_string();
        self.store.save_active_provider(&canonical)?;
        self.active = index;
        debug!(provider = %canonical, "active provider changed");
        Ok(())
    }

    pub fn set_model(&mut self, model: &str) -> Result<(), ProviderError> {
        let provider = self.active_provider();
        validate_model(provider.spec(), model)?;
        let name = provider.name().to_string();
        let temperature = provider.settings().temperature;

        self.store.save_provider_settings(&name, model, temperature)?;
        self.active_provider_mut().set_model(model)?;
        debug!(provider = %name, model = %model, "model changed");
        Ok(())
    }

    pub fn set_temperature(&mut self, value: f64) -> Result<(), ProviderError> {
        let provider = self.active_provider();
        validate_temperature(provider.spec(), value)?;
        let name = provider.name().to_string();
        let model = provider.settings().model.clone();

        self.store.save_provider_settings(&name, &model, value)?;
        self.active_provider_mut().set_temperature(value)?;
        debug!(provider = %name, temperature = value, "temperature changed");
        Ok(())
    }

    pub fn set_api_key(&mut self, api_key: &str) -> Result<(), ProviderError> {
        let api_key = validate_api_key(api_key)?;
        let name = self.active_provider().name().to_string();

        self.store.save_api_key(&name, &api_key)?;
        self.active_provider_mut().set_api_key(&api_key)?;
        debug!(provider = %name, "api key stored");
        Ok(())
    }

    pub fn send_streaming_chat_request(
        &self,
        messages: Vec<ChatMessage>,
        cancel: CancellationToken,
    ) -> Result<StreamHandle, ProviderError> {
        self.active_provider()
            .send_streaming_chat_request(messages, cancel)
    }
}

fn saved_settings(
    spec: &ProviderSpec,
    config: &Config,
    lookup_key: &impl Fn(&ProviderSpec) -> Option<String>,
) -> ProviderSettings {
    let mut settings = ProviderSettings::defaults_for(spec);
    let saved = config.providers.get(&spec.name);

    if let Some(model) = saved.and_then(|saved| saved.model.as_deref()) {
        if validate_model(spec, model).is_ok() {
            settings.model = model.to_string();
        } else {
            debug!(provider = %spec.name, model = %model, "ignoring unknown saved model");
        }
    }
    if let Some(temperature) = saved.and_then(|saved| saved.temperature) {
        if validate_temperature(spec, temperature).is_ok() {
            settings.temperature = temperature;
        }
    }

    settings.api_key = saved
        .and_then(|saved| saved.api_key.clone())
        .filter(|key| !key.trim().is_empty())
        .or_else(|| lookup_key(spec));
    settings
}
