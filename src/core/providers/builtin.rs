//! Providers compiled into the binary from `builtin_providers.toml`.

use serde::Deserialize;

use super::{ProviderSpec, TemperaturePreset};

const BUILTIN_PROVIDERS: &str = include_str!("../../builtin_providers.toml");

#[derive(Debug, Deserialize)]
struct BuiltinProvidersConfig {
    providers: Vec<ProviderSpec>,
}

/// Presets offered by providers that do not declare their own.
pub fn default_temperature_presets() -> Vec<TemperaturePreset> {
    [
        ("Precise", 0.0, "Highly deterministic responses for factual queries"),
        ("Balanced", 0.7, "Good balance between creativity and coherence"),
        ("Creative", 1.0, "More varied and creative responses"),
        (
            "Very Creative",
            1.5,
            "Highly varied and potentially more unexpected responses",
        ),
    ]
    .into_iter()
    .map(|(name, value, description)| TemperaturePreset {
        name: name.to_string(),
        value,
        description: description.to_string(),
    })
    .collect()
}

/// Parses the embedded provider table, in declaration order.
pub fn load_builtin_providers() -> Result<Vec<ProviderSpec>, toml::de::Error> {
    parse_providers(BUILTIN_PROVIDERS)
}

fn parse_providers(source: &str) -> Result<Vec<ProviderSpec>, toml::de::Error> {
    let config: BuiltinProvidersConfig = toml::from_str(source)?;
    Ok(config
        .providers
        .into_iter()
        .map(|mut spec| {
            if spec.presets.is_empty() {
                spec.presets = default_temperature_presets();
            }
            spec
        })
        .collect())
}
