//! Keyboard Input Source
//!
//! Maps terminal key events to gameplay commands and shell controls, and
//! runs the async reader task that feeds the merged queue. The terminal is
//! in raw mode, so space carries no scroll side effect to suppress.

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::debug;

use crate::game::command::Command;

/// A shell-level control, outside the gameplay command vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Toggle pause.
    Pause,
    /// Restart the session in place.
    Restart,
    /// Toggle Manual/Adaptive round-end mode.
    ToggleMode,
    /// Connect the serial joystick.
    ConnectDevice,
    /// Dismiss the pending notice.
    Dismiss,
    /// Quit the app.
    Quit,
}

/// What a key press turned into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// A gameplay command for the session.
    Game(Command),
    /// A control for the shell.
    Shell(Control),
}

/// Map one key event, if it is bound.
pub fn map_key(key: KeyEvent) -> Option<KeyAction> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(KeyAction::Shell(Control::Quit));
    }

    match key.code {
        KeyCode::Left => Some(KeyAction::Game(Command::MoveLeft)),
        KeyCode::Right => Some(KeyAction::Game(Command::MoveRight)),
        KeyCode::Char(' ') => Some(KeyAction::Game(Command::Confirm)),

        KeyCode::Char('p') | KeyCode::Char('P') => Some(KeyAction::Shell(Control::Pause)),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(KeyAction::Shell(Control::Restart)),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(KeyAction::Shell(Control::ToggleMode)),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(KeyAction::Shell(Control::ConnectDevice)),
        KeyCode::Enter | KeyCode::Esc => Some(KeyAction::Shell(Control::Dismiss)),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(KeyAction::Shell(Control::Quit)),

        _ => None,
    }
}

/// Read terminal events until the stream or the receiver closes.
///
/// The task is owned by the app loop; dropping the receivers ends it, so
/// no handler outlives the session it feeds.
pub async fn run(
    commands: mpsc::Sender<Command>,
    controls: mpsc::Sender<Control>,
) {
    let mut events = EventStream::new();

    while let Some(event) = events.next().await {
        let key = match event {
            Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => key,
            Ok(_) => continue,
            Err(err) => {
                debug!(%err, "terminal event stream error");
                break;
            }
        };

        match map_key(key) {
            Some(KeyAction::Game(command)) => {
                if commands.send(command).await.is_err() {
                    break;
                }
            }
            Some(KeyAction::Shell(control)) => {
                if controls.send(control).await.is_err() {
                    break;
                }
            }
            None => {}
        }
    }
}
