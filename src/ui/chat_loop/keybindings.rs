//! Maps terminal events onto session actions.

use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::core::app::AppAction;
use crate::ui::selector::SelectorKind;

/// Lines moved per mouse wheel notch.
pub const WHEEL_SCROLL_LINES: isize = 3;

pub fn event_to_action(event: Event) -> Option<AppAction> {
    match event {
        Event::Key(key) => key_to_action(&key),
        Event::Mouse(mouse) => mouse_to_action(&mouse),
        Event::Paste(text) => Some(AppAction::Paste(text)),
        Event::Resize(width, height) => Some(AppAction::Resize { width, height }),
        _ => None,
    }
}

pub fn key_to_action(key: &KeyEvent) -> Option<AppAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    let action = match key.code {
        KeyCode::Esc => AppAction::Interrupt,
        KeyCode::Char('c') if ctrl => AppAction::Interrupt,
        KeyCode::Char('p') if ctrl => AppAction::OpenSelector(SelectorKind::Provider),
        // Most terminals report Ctrl-M as a plain Enter.
        KeyCode::Char('m') if ctrl => AppAction::OpenSelector(SelectorKind::Model),
        KeyCode::Char('t') if ctrl => AppAction::OpenSelector(SelectorKind::Temperature),
        KeyCode::Enter if alt => AppAction::InsertNewline,
        KeyCode::Enter => AppAction::Submit,
        KeyCode::Backspace => AppAction::Backspace,
        KeyCode::Delete => AppAction::Delete,
        KeyCode::Left => AppAction::CursorLeft,
        KeyCode::Right => AppAction::CursorRight,
        KeyCode::Up => AppAction::MoveUp,
        KeyCode::Down => AppAction::MoveDown,
        KeyCode::PageUp => AppAction::PageUp,
        KeyCode::PageDown => AppAction::PageDown,
        KeyCode::Home => AppAction::ScrollToTop,
        KeyCode::End => AppAction::ScrollToBottom,
        KeyCode::Char(ch) if !ctrl && !alt => AppAction::InsertChar(ch),
        _ => return None,
    };
    Some(action)
}

pub fn mouse_to_action(mouse: &MouseEvent) -> Option<AppAction> {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::ScrollUp => Some(AppAction::ScrollBy(-WHEEL_SCROLL_LINES)),
        MouseEventKind::ScrollDown => Some(AppAction::ScrollBy(WHEEL_SCROLL_LINES)),
        MouseEventKind::Down(MouseButton::Left) => Some(AppAction::SelectionStart { column, row }),
        MouseEventKind::Drag(MouseButton::Left) => Some(AppAction::SelectionDrag { column, row }),
        MouseEventKind::Up(MouseButton::Left) => Some(AppAction::SelectionEnd { column, row }),
        _ => None,
    }
}
