//! `chait config`: show or change persisted settings.

use std::error::Error;
use std::fmt;
use std::path::Path;

use crate::core::config::data::path_display;
use crate::core::config::{Config, ConfigError};
use crate::core::keyring::store_api_key;
use crate::core::providers::builtin::load_builtin_providers;
use crate::core::providers::{
    mask_api_key, validate_api_key, validate_model, validate_temperature, ProviderError,
    ProviderSpec,
};

/// Errors that can occur when modifying configuration settings.
#[derive(Debug)]
pub enum SettingError {
    /// The provided setting key is not recognized.
    UnknownKey(String),
    /// The provided provider identifier was not found.
    UnknownProvider(String),
    /// A key was given without a value.
    MissingValue(String),
    /// The value could not be parsed for this key.
    InvalidValue { key: String, value: String },
    /// The value parsed but the provider rejects it.
    Rejected(ProviderError),
    Keyring(String),
    Config(ConfigError),
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "Unknown config key: {key}"),
            SettingError::UnknownProvider(name) => write!(
                f,
                "Unknown provider: {name}. Available providers: deepseek, openai, grok"
            ),
            SettingError::MissingValue(key) => write!(f, "Missing value for {key}"),
            SettingError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {key}: {value}")
            }
            SettingError::Rejected(err) => write!(f, "{err}"),
            SettingError::Keyring(message) => write!(f, "Failed to store API key: {message}"),
            SettingError::Config(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SettingError {}

impl From<ConfigError> for SettingError {
    fn from(err: ConfigError) -> Self {
        SettingError::Config(err)
    }
}

pub fn run_config_command(
    path: &Path,
    show: bool,
    key: Option<String>,
    value: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load_from_path(path)?;

    let key = match key {
        Some(key) if !show => key,
        _ => {
            println!("# {}", path_display(path));
            print!("{}", render_config(&config)?);
            return Ok(());
        }
    };
    let value = value.ok_or_else(|| SettingError::MissingValue(key.clone()))?;

    let specs = load_builtin_providers()?;
    let message = apply_setting(&mut config, &specs, &key, &value, |provider, api_key| {
        store_api_key(provider, api_key).map_err(|err| err.to_string())
    })?;
    config.save_to_path(path)?;
    println!("✅ {message}");
    Ok(())
}

/// The configuration as TOML, with API keys masked.
pub fn render_config(config: &Config) -> Result<String, SettingError> {
    let mut shown = config.clone();
    for entry in shown.providers.values_mut() {
        if let Some(key) = entry.api_key.as_mut() {
            *key = mask_api_key(key);
        }
    }
    toml::to_string_pretty(&shown).map_err(|err| SettingError::Config(ConfigError::Serialize(err)))
}

/// Validates `value` for `key` and records it in `config`. API keys go to
/// `store_key` instead when the keyring is enabled.
pub fn apply_setting(
    config: &mut Config,
    specs: &[ProviderSpec],
    key: &str,
    value: &str,
    store_key: impl FnOnce(&str, &str) -> Result<(), String>,
) -> Result<String, SettingError> {
    let invalid = || SettingError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };

    match key {
        "provider" => {
            let spec = find_spec(specs, value)?;
            config.provider = Some(spec.name.clone());
        }
        "system_prompt" => config.system_prompt = Some(value.to_string()),
        "history_limit" => {
            let limit = value
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(invalid)?;
            config.history_limit = Some(limit);
        }
        "use_keyring" => config.use_keyring = Some(parse_bool(value).ok_or_else(invalid)?),
        "debug" => config.debug = Some(parse_bool(value).ok_or_else(invalid)?),
        "log_file" => config.log_file = Some(value.to_string()),
        _ => return apply_provider_setting(config, specs, key, value, store_key),
    }
    Ok(format!("Set {key} to: {value}"))
}

fn apply_provider_setting(
    config: &mut Config,
    specs: &[ProviderSpec],
    key: &str,
    value: &str,
    store_key: impl FnOnce(&str, &str) -> Result<(), String>,
) -> Result<String, SettingError> {
    let mut parts = key.split('.');
    let (Some("providers"), Some(provider), Some(field), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(SettingError::UnknownKey(key.to_string()));
    };
    let spec = find_spec(specs, provider)?;
    let name = spec.name.clone();

    match field {
        "model" => {
            validate_model(spec, value).map_err(SettingError::Rejected)?;
            config.provider_entry(&name).model = Some(value.to_string());
        }
        "temperature" => {
            let temperature = value
                .parse::<f64>()
                .map_err(|_| SettingError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
            validate_temperature(spec, temperature).map_err(SettingError::Rejected)?;
            config.provider_entry(&name).temperature = Some(temperature);
        }
        "api_key" => {
            let api_key = validate_api_key(value).map_err(SettingError::Rejected)?;
            if config.use_keyring() {
                store_key(&name, &api_key).map_err(SettingError::Keyring)?;
            } else {
                config.provider_entry(&name).api_key = Some(api_key.clone());
            }
            return Ok(format!("Set API key for {name}: {}", mask_api_key(&api_key)));
        }
        _ => return Err(SettingError::UnknownKey(key.to_string())),
    }
    Ok(format!("Set {key} to: {value}"))
}

fn find_spec<'a>(specs: &'a [ProviderSpec], name: &str) -> Result<&'a ProviderSpec, SettingError> {
    specs
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| SettingError::UnknownProvider(name.to_string()))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<ProviderSpec> {
        load_builtin_providers().expect("builtin providers")
    }

    fn no_keyring(_: &str, _: &str) -> Result<(), String> {
        panic!("keyring must not be used")
    }

    #[test]
    fn sets_top_level_keys() {
        let mut config = Config::default();
        let specs = specs();
        apply_setting(&mut config, &specs, "provider", "OpenAI", no_keyring).expect("provider");
        apply_setting(&mut config, &specs, "history_limit", "8", no_keyring).expect("limit");
        apply_setting(&mut config, &specs, "debug", "on", no_keyring).expect("debug");

        assert_eq!(config.provider.as_deref(), Some("openai"));
        assert_eq!(config.history_limit, Some(8));
        assert_eq!(config.debug, Some(true));
    }

    #[test]
    fn rejects_bad_values_without_changes() {
        let mut config = Config::default();
        let specs = specs();
        assert!(matches!(
            apply_setting(&mut config, &specs, "history_limit", "0", no_keyring),
            Err(SettingError::InvalidValue { .. })
        ));
        assert!(matches!(
            apply_setting(&mut config, &specs, "provider", "nope", no_keyring),
            Err(SettingError::UnknownProvider(_))
        ));
        assert!(matches!(
            apply_setting(&mut config, &specs, "providers.openai.model", "gpt-2", no_keyring),
            Err(SettingError::Rejected(ProviderError::InvalidModel { .. }))
        ));
        assert!(matches!(
            apply_setting(&mut config, &specs, "providers.openai.temperature", "1.5", no_keyring),
            Err(SettingError::Rejected(ProviderError::InvalidTemperature { .. }))
        ));
        assert!(matches!(
            apply_setting(&mut config, &specs, "providers.openai.colour", "x", no_keyring),
            Err(SettingError::UnknownKey(_))
        ));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn provider_settings_are_keyed_by_name() {
        let mut config = Config::default();
        let specs = specs();
        apply_setting(&mut config, &specs, "providers.grok.temperature", "0.5", no_keyring)
            .expect("temperature");
        apply_setting(&mut config, &specs, "providers.openai.model", "o1", no_keyring)
            .expect("model");

        assert_eq!(config.providers["grok"].temperature, Some(0.5));
        assert_eq!(config.providers["openai"].model.as_deref(), Some("o1"));
    }

    #[test]
    fn api_key_goes_to_keyring_unless_disabled() {
        let specs = specs();
        let mut stored = None;
        let mut config = Config::default();
        let message = apply_setting(
            &mut config,
            &specs,
            "providers.deepseek.api_key",
            " sk-deepseek-123456 ",
            |provider, key| {
                stored = Some((provider.to_string(), key.to_string()));
                Ok(())
            },
        )
        .expect("keyring");
        assert_eq!(
            stored,
            Some(("deepseek".to_string(), "sk-deepseek-123456".to_string()))
        );
        assert_eq!(message, "Set API key for deepseek: sk-d****3456");
        assert!(config.providers.is_empty());

        let mut config = Config {
            use_keyring: Some(false),
            ..Config::default()
        };
        apply_setting(
            &mut config,
            &specs,
            "providers.deepseek.api_key",
            "sk-deepseek-123456",
            no_keyring,
        )
        .expect("plaintext");
        assert_eq!(
            config.providers["deepseek"].api_key.as_deref(),
            Some("sk-deepseek-123456")
        );
        assert!(render_config(&config)
            .expect("render")
            .contains("api_key = \"sk-d****3456\""));
    }

    #[test]
    fn config_command_writes_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        run_config_command(&path, false, Some("system_prompt".into()), Some("Be brief.".into()))
            .expect("set");
        let config = Config::load_from_path(&path).expect("load");
        assert_eq!(config.system_prompt(), "Be brief.");

        assert!(run_config_command(&path, false, Some("debug".into()), None).is_err());
    }
}
