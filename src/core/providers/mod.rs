//! Provider capability set.
//!
//! A provider is described by a static [`ProviderSpec`] and carries mutable
//! [`ProviderSettings`]. The [`Provider`] trait only asks implementors for
//! access to those two structs and for a way to start a stream; everything
//! else is provided on top of the free validation functions below.

pub mod builtin;
pub mod openai_compatible;
pub mod registry;
pub mod store;

use std::error::Error;
use std::fmt;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::api::ChatMessage;
use crate::core::chat_stream::StreamHandle;

pub use registry::{ProviderRegistry, ProviderStatus};
pub use store::{MemoryStore, SettingsStore};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemperaturePreset {
    pub name: String,
    pub value: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderSpec {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub api_key_env: Option<String>,
    pub models: Vec<String>,
    pub default_model: String,
    pub default_temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    #[serde(default)]
    pub fixed_temperature_models: Vec<String>,
    #[serde(default)]
    pub presets: Vec<TemperaturePreset>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
}

impl ProviderSettings {
    pub fn defaults_for(spec: &ProviderSpec) -> Self {
        Self {
            api_key: None,
            model: spec.default_model.clone(),
            temperature: spec.default_temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// No API key configured for the provider.
    NotReady { provider: String },
    /// Network or HTTP failure talking to the provider.
    Transport(String),
    UnknownProvider(String),
    InvalidModel { provider: String, model: String },
    InvalidTemperature { provider: String, value: f64, min: f64, max: f64 },
    EmptyApiKey,
    /// The change could not be written to durable storage.
    Persist(String),
}

impl ProviderError {
    /// Validation failures are rejected in place without user-visible output.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ProviderError::UnknownProvider(_)
                | ProviderError::InvalidModel { .. }
                | ProviderError::InvalidTemperature { .. }
                | ProviderError::EmptyApiKey
        )
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::NotReady { provider } => {
                write!(f, "API key for '{}' is not set", provider)
            }
            ProviderError::Transport(message) => write!(f, "{}", message),
            ProviderError::UnknownProvider(name) => write!(f, "Unknown provider '{}'", name),
            ProviderError::InvalidModel { provider, model } => {
                write!(f, "Model '{}' is not available for {}", model, provider)
            }
            ProviderError::InvalidTemperature {
                provider,
                value,
                min,
                max,
            } => write!(
                f,
                "Temperature {} is outside {}..={} for {}",
                value, min, max, provider
            ),
            ProviderError::EmptyApiKey => write!(f, "API key cannot be empty"),
            ProviderError::Persist(message) => write!(f, "Failed to save settings: {}", message),
        }
    }
}

impl Error for ProviderError {}

pub fn validate_model(spec: &ProviderSpec, model: &str) -> Result<(), ProviderError> {
    if spec.models.iter().any(|candidate| candidate == model) {
        Ok(())
    } else {
        Err(ProviderError::InvalidModel {
            provider: spec.name.clone(),
            model: model.to_string(),
        })
    }
}

pub fn validate_temperature(spec: &ProviderSpec, value: f64) -> Result<(), ProviderError> {
    if value.is_finite() && value >= spec.min_temperature && value <= spec.max_temperature {
        Ok(())
    } else {
        Err(ProviderError::InvalidTemperature {
            provider: spec.name.clone(),
            value,
            min: spec.min_temperature,
            max: spec.max_temperature,
        })
    }
}

/// Trims the key and rejects blanks.
pub fn validate_api_key(key: &str) -> Result<String, ProviderError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        Err(ProviderError::EmptyApiKey)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Shows the first and last four characters; short keys are hidden entirely.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}****{tail}")
}

/// Temperature to send with a request, or `None` for models that reject it.
pub fn request_temperature(spec: &ProviderSpec, settings: &ProviderSettings) -> Option<f64> {
    if spec
        .fixed_temperature_models
        .iter()
        .any(|model| model == &settings.model)
    {
        None
    } else {
        Some(settings.temperature)
    }
}

pub trait Provider: Send {
    fn spec(&self) -> &ProviderSpec;
    fn settings(&self) -> &ProviderSettings;
    fn settings_mut(&mut self) -> &mut ProviderSettings;

    /// Starts a streamed completion and returns its receiving end at once.
    ///
    /// Network failures arrive later as a terminal error on the handle.
    /// Cancelling `cancel` stops the producer.
    fn send_streaming_chat_request(
        &self,
        messages: Vec<ChatMessage>,
        cancel: CancellationToken,
    ) -> Result<StreamHandle, ProviderError>;

    fn name(&self) -> &str {
        &self.spec().name
    }

    fn models(&self) -> &[String] {
        &self.spec().models
    }

    fn temperature_presets(&self) -> &[TemperaturePreset] {
        &self.spec().presets
    }

    fn is_ready(&self) -> bool {
        self.settings()
            .api_key
            .as_deref()
            .is_some_and(|key| !key.is_empty())
    }

    fn set_model(&mut self, model: &str) -> Result<(), ProviderError> {
        validate_model(self.spec(), model)?;
        self.settings_mut().model = model.to_string();
        Ok(())
    }

    fn set_temperature(&mut self, value: f64) -> Result<(), ProviderError> {
        validate_temperature(self.spec(), value)?;
        self.settings_mut().temperature = value;
        Ok(())
    }

    fn set_api_key(&mut self, key: &str) -> Result<(), ProviderError> {
        let key = validate_api_key(key)?;
        self.settings_mut().api_key = Some(key);
        Ok(())
    }

    fn masked_api_key(&self) -> Option<String> {
        self.settings().api_key.as_deref().map(mask_api_key)
    }

    /// The API key, or `NotReady` when none is configured.
    fn require_api_key(&self) -> Result<String, ProviderError> {
        self.settings()
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProviderError::NotReady {
                provider: self.name().to_string(),
            })
    }
}
