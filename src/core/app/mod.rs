use crate::core::layout::{self, VisualLine};
use crate::core::message::Message;
use crate::core::providers::{ProviderRegistry, ProviderStatus};
use crate::ui::selector::SelectorKind;

pub mod actions;
pub mod bridge;
pub mod session;
pub mod ui_state;


pub use actions::{apply_action, apply_actions, AppAction, AppCommand};
pub use session::{ActiveStream, SessionContext};
pub use ui_state::UiState;

/// Rows below the conversation kept for the prompt.
pub const INPUT_RESERVED_ROWS: u16 = 3;

/// Which interaction currently owns the keyboard, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    SelectorActive(SelectorKind),
    ApiKeyEntry,
    Streaming,
    Idle,
}

pub struct App {
    pub session: SessionContext,
    pub ui: UiState,
}

impl App {
    pub fn new(providers: ProviderRegistry, system_prompt: &str, history_limit: usize) -> Self {
        let welcome = welcome_text(&providers.active());
        let mut app = Self {
            ui: UiState::new(system_prompt, &providers),
            session: SessionContext::new(providers, history_limit),
        };
        app.ui.messages.push(Message::notice(welcome));
        app
    }

    pub fn mode(&self) -> SessionMode {
        if let Some(kind) = self.ui.selectors.active_kind() {
            SessionMode::SelectorActive(kind)
        } else if self.ui.api_key_entry.is_some() {
            SessionMode::ApiKeyEntry
        } else if self.session.stream.is_some() {
            SessionMode::Streaming
        } else {
            SessionMode::Idle
        }
    }

    pub fn transcript_width(&self) -> usize {
        usize::from(self.ui.width)
    }

    /// Rows available to the conversation, never zero.
    pub fn viewport_height(&self) -> usize {
        usize::from(self.ui.height.saturating_sub(INPUT_RESERVED_ROWS).max(1))
    }

    pub fn visual_lines(&self) -> Vec<VisualLine> {
        layout::wrap(self.ui.messages.messages(), self.transcript_width())
    }

    pub fn total_lines(&self) -> usize {
        layout::line_count(self.ui.messages.messages(), self.transcript_width())
    }

    /// Re-applies scroll bounds after the transcript or the terminal changed.
    pub fn follow_transcript(&mut self) {
        let total = self.total_lines();
        let height = self.viewport_height();
        self.ui.scroll.follow(total, height);
    }

    pub fn push_message(&mut self, message: Message) -> usize {
        let index = self.ui.messages.push(message);
        self.follow_transcript();
        index
    }

    /// The prompt is only drawn while the viewport sits at the bottom.
    pub fn shows_prompt(&self) -> bool {
        self.ui.input_enabled
            && self
                .ui
                .scroll
                .is_at_bottom(self.total_lines(), self.viewport_height())
    }
}

fn status_line(status: &ProviderStatus) -> String {
    format!(
        "Provider: {} (Model: {}, Temperature: {:.1})",
        status.name, status.current_model, status.current_temperature
    )
}

const RULE: &str = "-----------------------------------";

pub fn welcome_text(status: &ProviderStatus) -> String {
    [
        "Welcome to chait interactive mode!".to_string(),
        status_line(status),
        "Type ':h' to see all available commands.".to_string(),
        RULE.to_string(),
    ]
    .join("\n")
}

pub fn help_text(status: &ProviderStatus) -> String {
    let mut lines = vec![RULE.to_string(), status_line(status)];
    if let Some(masked) = &status.masked_api_key {
        lines.push(format!("API key: {}", masked));
    }
    lines.extend(
        [
            "Available commands:",
            "- ':h' - Show this message",
            "- ':p' - Select provider (Ctrl+P)",
            "- ':m' - Select model (Ctrl+M)",
            "- ':t' - Set the temperature (Ctrl+T)",
            "- ':k' - Set the API key",
            "- ':c' - Start a new conversation",
            "- 'Alt+Enter' - Insert a newline",
            "- 'PgUp/PgDn/Home/End' or mouse wheel - Scroll",
            "- Drag with the mouse - Copy text to the clipboard",
            "- 'Esc' or 'Ctrl+C' - Cancel / stop streaming / exit",
            RULE,
        ]
        .map(str::to_string),
    );
    lines.join("\n")
}
