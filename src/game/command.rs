//! Normalized Game Commands
//!
//! Both input sources (keyboard and serial joystick) are reduced to this
//! one command vocabulary before they reach the session. The state machine
//! never learns where a command came from.

use serde::{Serialize, Deserialize};

/// A gameplay command, source-agnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Move the selector one slot to the left.
    MoveLeft,
    /// Move the selector one slot to the right.
    MoveRight,
    /// Confirm the currently selected color against the target.
    Confirm,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&Command::MoveLeft).unwrap();
        assert_eq!(json, "\"move_left\"");
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Command::MoveLeft);
    }
}
