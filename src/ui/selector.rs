//! Single-choice list used for the provider, model and temperature pickers.

use crate::core::providers::ProviderRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    Provider,
    Model,
    Temperature,
}

impl SelectorKind {
    pub fn title(self) -> &'static str {
        match self {
            SelectorKind::Provider => "Select Provider",
            SelectorKind::Model => "Select Model",
            SelectorKind::Temperature => "Select Temperature",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorValue {
    Provider(String),
    Model(String),
    Temperature(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorOption {
    pub label: String,
    pub value: SelectorValue,
}

impl SelectorOption {
    pub fn new(label: impl Into<String>, value: SelectorValue) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectorWidget {
    pub title: String,
    options: Vec<SelectorOption>,
    current: usize,
    active: bool,
}

impl SelectorWidget {
    pub fn new<T: Into<String>>(title: T, options: Vec<SelectorOption>, current: usize) -> Self {
        let current = if options.is_empty() {
            0
        } else {
            current.min(options.len() - 1)
        };
        Self {
            title: title.into(),
            options,
            current,
            active: false,
        }
    }

    pub fn options(&self) -> &[SelectorOption] {
        &self.options
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_option(&self) -> Option<&SelectorOption> {
        self.options.get(self.current)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn next(&mut self) {
        if !self.options.is_empty() {
            self.current = (self.current + 1) % self.options.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.options.is_empty() {
            if self.current == 0 {
                self.current = self.options.len() - 1;
            } else {
                self.current -= 1;
            }
        }
    }

    /// Moves the highlight to `index`; false when out of range.
    pub fn select_by_index(&mut self, index: usize) -> bool {
        if index < self.options.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Deactivates and returns the highlighted value.
    pub fn confirm(&mut self) -> Option<SelectorValue> {
        self.active = false;
        self.current_option().map(|option| option.value.clone())
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }
}

/// The three pickers. At most one is active at a time.
#[derive(Debug, Clone)]
pub struct SelectorSet {
    provider: SelectorWidget,
    model: SelectorWidget,
    temperature: SelectorWidget,
}

impl SelectorSet {
    /// Builds inactive pickers from the registry's current state.
    pub fn from_registry(registry: &ProviderRegistry) -> Self {
        let status = registry.active();

        let providers = registry.provider_names();
        let provider_index = providers
            .iter()
            .position(|(name, _)| *name == status.name)
            .unwrap_or(0);
        let provider_options = providers
            .into_iter()
            .map(|(name, ready)| {
                let state = if ready { "Ready" } else { "Not Ready" };
                SelectorOption::new(
                    format!("{} [{}]", name, state),
                    SelectorValue::Provider(name),
                )
            })
            .collect();

        let model_index = status
            .available_models
            .iter()
            .position(|model| *model == status.current_model)
            .unwrap_or(0);
        let model_options = status
            .available_models
            .iter()
            .map(|model| SelectorOption::new(model.clone(), SelectorValue::Model(model.clone())))
            .collect();

        let temperature_index = status
            .temperature_presets
            .iter()
            .position(|preset| (preset.value - status.current_temperature).abs() < 1e-9)
            .unwrap_or(0);
        let temperature_options = status
            .temperature_presets
            .iter()
            .map(|preset| {
                SelectorOption::new(
                    format!("{} ({:.1}) - {}", preset.name, preset.value, preset.description),
                    SelectorValue::Temperature(preset.value),
                )
            })
            .collect();

        Self {
            provider: SelectorWidget::new(
                SelectorKind::Provider.title(),
                provider_options,
                provider_index,
            ),
            model: SelectorWidget::new(SelectorKind::Model.title(), model_options, model_index),
            temperature: SelectorWidget::new(
                SelectorKind::Temperature.title(),
                temperature_options,
                temperature_index,
            ),
        }
    }

    pub fn get(&self, kind: SelectorKind) -> &SelectorWidget {
        match kind {
            SelectorKind::Provider => &self.provider,
            SelectorKind::Model => &self.model,
            SelectorKind::Temperature => &self.temperature,
        }
    }

    fn get_mut(&mut self, kind: SelectorKind) -> &mut SelectorWidget {
        match kind {
            SelectorKind::Provider => &mut self.provider,
            SelectorKind::Model => &mut self.model,
            SelectorKind::Temperature => &mut self.temperature,
        }
    }

    /// Activates `kind` after deactivating every other picker.
    pub fn activate(&mut self, kind: SelectorKind) {
        for other in [
            SelectorKind::Provider,
            SelectorKind::Model,
            SelectorKind::Temperature,
        ] {
            self.get_mut(other).cancel();
        }
        self.get_mut(kind).activate();
    }

    pub fn active_kind(&self) -> Option<SelectorKind> {
        [
            SelectorKind::Provider,
            SelectorKind::Model,
            SelectorKind::Temperature,
        ]
        .into_iter()
        .find(|kind| self.get(*kind).is_active())
    }

    pub fn active(&self) -> Option<&SelectorWidget> {
        self.active_kind().map(|kind| self.get(kind))
    }

    pub fn active_mut(&mut self) -> Option<&mut SelectorWidget> {
        self.active_kind().map(|kind| self.get_mut(kind))
    }
}
