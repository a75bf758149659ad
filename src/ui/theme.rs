use ratatui::style::{Color, Modifier, Style};

use crate::core::message::MessageKind;

#[derive(Debug, Clone)]
pub struct Theme {
    // Transcript
    pub system_style: Style,
    pub user_style: Style,
    pub assistant_style: Style,
    pub notice_style: Style,
    pub error_style: Style,
    pub selection_modifier: Modifier,

    // Selector view
    pub selector_title_style: Style,
    pub selector_option_style: Style,
    pub selector_highlight_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_cursor_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            system_style: Style::default().fg(Color::Magenta),
            user_style: Style::default().fg(Color::Cyan),
            assistant_style: Style::default().fg(Color::White),
            notice_style: Style::default().fg(Color::Gray),
            error_style: Style::default().fg(Color::Red),
            selection_modifier: Modifier::REVERSED,
            selector_title_style: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            selector_option_style: Style::default().fg(Color::Gray),
            selector_highlight_style: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            input_text_style: Style::default().fg(Color::Cyan),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    pub fn style_for(&self, kind: MessageKind) -> Style {
        match kind {
            MessageKind::System => self.system_style,
            MessageKind::User => self.user_style,
            MessageKind::Assistant => self.assistant_style,
            MessageKind::Notice => self.notice_style,
            MessageKind::Error => self.error_style,
        }
    }

    /// Style of selected cells on a line of `kind`.
    pub fn selected_style_for(&self, kind: MessageKind) -> Style {
        self.style_for(kind).add_modifier(self.selection_modifier)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}
