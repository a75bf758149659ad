use std::collections::HashMap;

use super::ProviderError;

/// Durable home for provider choices. Every method must have persisted the
/// value by the time it returns `Ok`.
pub trait SettingsStore: Send {
    fn save_active_provider(&mut self, provider: &str) -> Result<(), ProviderError>;

    fn save_provider_settings(
        &mut self,
        provider: &str,
        model: &str,
        temperature: f64,
    ) -> Result<(), ProviderError>;

    fn save_api_key(&mut self, provider: &str, api_key: &str) -> Result<(), ProviderError>;
}

/// Keeps everything in process memory; used for one-shot runs and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub active_provider: Option<String>,
    pub provider_settings: HashMap<String, (String, f64)>,
    pub api_keys: HashMap<String, String>,
    /// Makes every save fail, to exercise error paths.
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_writable(&self) -> Result<(), ProviderError> {
        if self.fail_writes {
            Err(ProviderError::Persist("store is read-only".to_string()))
        } else {
            Ok(())
        }
    }
}

impl SettingsStore for MemoryStore {
    fn save_active_provider(&mut self, provider: &str) -> Result<(), ProviderError> {
        self.check_writable()?;
        self.active_provider = Some(provider.to_string());
        Ok(())
    }

    fn save_provider_settings(
        &mut self,
        provider: &str,
        model: &str,
        temperature: f64,
    ) -> Result<(), ProviderError> {
        self.check_writable()?;
        self.provider_settings
            .insert(provider.to_string(), (model.to_string(), temperature));
        Ok(())
    }

    fn save_api_key(&mut self, provider: &str, api_key: &str) -> Result<(), ProviderError> {
        self.check_writable()?;
        self.api_keys
            .insert(provider.to_string(), api_key.to_string());
        Ok(())
    }
}
