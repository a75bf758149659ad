//! Event polling, dispatching, and UI rendering loop.
//!
//! Terminal input, the cursor blink timer and the in-flight stream are
//! multiplexed with `tokio::select!`. Every event becomes an [`AppAction`]
//! applied to the single owned [`App`]; the resulting [`AppCommand`]s decide
//! whether the stream is polled next and what goes to the clipboard.

use std::{error::Error, time::Duration};

use ratatui::crossterm::event::{self, Event};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::core::app::bridge::receive_chunk;
use crate::core::app::{apply_actions, App, AppAction, AppCommand};
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;
use crate::utils::clipboard::copy_to_clipboard;

use super::keybindings::event_to_action;
use super::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};

pub const CURSOR_BLINK: Duration = Duration::from_millis(530);

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

enum LoopInput {
    Ui(UiEvent),
    Stream(AppAction),
    Tick,
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Runs the interactive session until the user quits. `initial_actions` are
/// applied as soon as the screen is up.
pub async fn run_chat(mut app: App, initial_actions: Vec<AppAction>) -> Result<(), Box<dyn Error>> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut app, &mut terminal, initial_actions).await;
    let restored = restore_terminal(&mut terminal);
    result.and(restored)
}

async fn event_loop(
    app: &mut App,
    terminal: &mut ChatTerminal,
    initial_actions: Vec<AppAction>,
) -> Result<(), Box<dyn Error>> {
    let theme = Theme::dark_default();
    let size = terminal.size()?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let mut blink = tokio::time::interval(CURSOR_BLINK);
    blink.tick().await;

    // Stream id the loop is waiting on; at most one receive is outstanding.
    let mut awaiting: Option<u64> = None;

    let mut startup = vec![AppAction::Resize {
        width: size.width,
        height: size.height,
    }];
    startup.extend(initial_actions);
    execute_commands(apply_actions(app, startup), &mut awaiting);

    let result = loop {
        if app.ui.exit_requested {
            break Ok(());
        }
        if let Err(err) = terminal.draw(|f| ui(f, app, &theme)) {
            break Err(err.into());
        }

        let input = tokio::select! {
            ev = event_rx.recv() => match ev {
                Some(ev) => LoopInput::Ui(ev),
                None => break Ok(()),
            },
            action = receive_chunk(
                app.session
                    .stream
                    .as_mut()
                    .filter(|stream| Some(stream.id) == awaiting),
            ) => LoopInput::Stream(action),
            _ = blink.tick() => LoopInput::Tick,
        };

        let mut actions = Vec::new();
        match input {
            LoopInput::Ui(first) => {
                push_ui_event(&mut actions, first);
                // Apply queued input in one go so bursts cost a single frame.
                while let Ok(ev) = event_rx.try_recv() {
                    push_ui_event(&mut actions, ev);
                }
            }
            LoopInput::Stream(action) => {
                awaiting = None;
                actions.push(action);
            }
            LoopInput::Tick => actions.push(AppAction::Tick),
        }

        execute_commands(apply_actions(app, actions), &mut awaiting);
    };

    event_reader_handle.abort();
    result
}

fn push_ui_event(actions: &mut Vec<AppAction>, event: UiEvent) {
    let UiEvent::Crossterm(ev) = event;
    if let Some(action) = event_to_action(ev) {
        actions.push(action);
    }
}

fn execute_commands(commands: Vec<AppCommand>, awaiting: &mut Option<u64>) {
    for command in commands {
        match command {
            AppCommand::ReceiveChunk { stream_id } => *awaiting = Some(stream_id),
            AppCommand::CopyToClipboard(text) => match copy_to_clipboard(&text) {
                Ok(()) => debug!(chars = text.chars().count(), "selection copied"),
                Err(err) => warn!(error = %err, "clipboard copy failed"),
            },
        }
    }
}
