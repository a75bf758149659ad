use crate::core::message::MessageStore;
use crate::core::providers::ProviderRegistry;
use crate::core::selection::Selection;
use crate::ui::selector::SelectorSet;
use crate::utils::input::InputBuffer;
use crate::utils::scroll::ScrollState;

/// Prompt state while the user is typing an API key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeyEntry {
    /// Text that was in the prompt when entry began; restored afterwards.
    pub stashed_input: String,
}

pub struct UiState {
    pub messages: MessageStore,
    pub input: InputBuffer,
    pub input_enabled: bool,
    pub scroll: ScrollState,
    pub selection: Option<Selection>,
    /// Left button held since the selection started.
    pub selecting: bool,
    pub selectors: SelectorSet,
    pub api_key_entry: Option<ApiKeyEntry>,
    pub cursor_visible: bool,
    pub width: u16,
    pub height: u16,
    pub exit_requested: bool,
}

impl UiState {
    pub fn new(system_prompt: &str, providers: &ProviderRegistry) -> Self {
        Self {
            messages: MessageStore::new(system_prompt),
            input: InputBuffer::default(),
            input_enabled: true,
            scroll: ScrollState::default(),
            selection: None,
            selecting: false,
            selectors: SelectorSet::from_registry(providers),
            api_key_entry: None,
            cursor_visible: true,
            width: 80,
            height: 24,
            exit_requested: false,
        }
    }
}
