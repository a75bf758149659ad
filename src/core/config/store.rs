use std::path::PathBuf;

use tracing::{debug, warn};

use crate::core::config::data::Config;
use crate::core::keyring::{read_api_key, store_api_key};
use crate::core::providers::{ProviderError, ProviderSpec, SettingsStore};

/// Persists provider choices to the TOML config file, and API keys to the
/// OS keyring unless the config opts out of it.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    use_keyring: bool,
}

impl ConfigStore {
    pub fn new(path: PathBuf, use_keyring: bool) -> Self {
        Self { path, use_keyring }
    }

    /// Re-reads the file, applies `mutate`, and writes it back.
    fn update(&self, mutate: impl FnOnce(&mut Config)) -> Result<(), ProviderError> {
        let persist_error = |err: crate::core::config::ConfigError| ProviderError::Persist(err.to_string());
        let mut config = Config::load_from_path(&self.path).map_err(persist_error)?;
        mutate(&mut config);
        config.save_to_path(&self.path).map_err(persist_error)
    }

    /// Key stored outside the config file: the keyring first, then the
    /// provider's environment variable.
    pub fn lookup_api_key(&self, spec: &ProviderSpec) -> Option<String> {
        if self.use_keyring {
            match read_api_key(&spec.name) {
                Ok(Some(key)) => return Some(key),
                Ok(None) => {}
                Err(err) if err.is_recoverable() => {
                    warn!(provider = %spec.name, error = %err, "keyring unavailable");
                }
                Err(err) => {
                    debug!(provider = %spec.name, error = %err, "keyring lookup failed");
                }
            }
        }

        spec.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

impl SettingsStore for ConfigStore {
    fn save_active_provider(&mut self, provider: &str) -> Result<(), ProviderError> {
        self.update(|config| config.provider = Some(provider.to_string()))
    }

    fn save_provider_settings(
        &mut self,
        provider: &str,
        model: &str,
        temperature: f64,
    ) -> Result<(), ProviderError> {
        self.update(|config| {
            let entry = config.provider_entry(provider);
            entry.model = Some(model.to_string());
            entry.temperature = Some(temperature);
        })
    }

    fn save_api_key(&mut self, provider: &str, api_key: &str) -> Result<(), ProviderError> {
        if self.use_keyring {
            store_api_key(provider, api_key)
                .map_err(|err| ProviderError::Persist(format!("keyring: {}", err)))
        } else {
            self.update(|config| config.provider_entry(provider).api_key = Some(api_key.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn saves_provider_choices_to_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let mut store = ConfigStore::new(path.clone(), false);

        store.save_active_provider("grok").expect("provider");
        store
            .save_provider_settings("grok", "grok-2-1212", 0.5)
            .expect("settings");
        store.save_api_key("grok", "xai-secret").expect("key");

        let config = Config::load_from_path(&path).expect("load");
        assert_eq!(config.provider.as_deref(), Some("grok"));
        let grok = &config.providers["grok"];
        assert_eq!(grok.model.as_deref(), Some("grok-2-1212"));
        assert_eq!(grok.temperature, Some(0.5));
        assert_eq!(grok.api_key.as_deref(), Some("xai-secret"));
    }

    #[test]
    fn updates_keep_unrelated_settings() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        Config {
            system_prompt: Some("Be terse.".into()),
            ..Config::default()
        }
        .save_to_path(&path)
        .expect("seed");

        let mut store = ConfigStore::new(path.clone(), false);
        store.save_active_provider("openai").expect("provider");

        let config = Config::load_from_path(&path).expect("load");
        assert_eq!(config.system_prompt.as_deref(), Some("Be terse."));
        assert_eq!(config.provider.as_deref(), Some("openai"));
    }

    #[test]
    fn unreadable_config_is_a_persist_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "provider = [").expect("write");

        let mut store = ConfigStore::new(path, false);
        assert!(matches!(
            store.save_active_provider("openai"),
            Err(ProviderError::Persist(_))
        ));
    }
}
