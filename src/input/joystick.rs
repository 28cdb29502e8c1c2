//! Joystick Frame Decoding
//!
//! Translates raw frames from the serial device into normalized commands:
//! an axis threshold on `x` and an edge-style debounce on the button so a
//! held button confirms once, not sixty times a second.

use std::time::Instant;

use serde::{Serialize, Deserialize};

use crate::{CONFIRM_DEBOUNCE, JOYSTICK_AXIS_THRESHOLD};
use crate::game::command::Command;

/// One decoded unit of the serial stream.
///
/// Wire format: a newline-delimited JSON object
/// `{"x": <int>, "y": <int>, "button": 0|1}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoystickFrame {
    /// Horizontal axis reading.
    pub x: i32,
    /// Vertical axis reading (unused by the palette selector).
    pub y: i32,
    /// Button state, 0 or 1.
    pub button: i32,
}

impl JoystickFrame {
    /// Parse one line of the serial stream.
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }

    /// Whether the button reads as pressed.
    #[inline]
    pub fn button_pressed(&self) -> bool {
        self.button == 1
    }
}

/// Stateful frame-to-command translator.
///
/// Holds the confirm cooldown timestamp; axis moves are stateless.
#[derive(Debug, Default)]
pub struct JoystickDecoder {
    last_confirm: Option<Instant>,
}

impl JoystickDecoder {
    /// Create a fresh decoder with no confirm on cooldown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate a frame into zero, one or two commands.
    ///
    /// `now` is passed in rather than read here so tests can step time.
    pub fn decode(&mut self, frame: &JoystickFrame, now: Instant) -> Vec<Command> {
        let mut commands = Vec::with_capacity(2);

        if frame.x < -JOYSTICK_AXIS_THRESHOLD {
            commands.push(Command::MoveLeft);
        } else if frame.x > JOYSTICK_AXIS_THRESHOLD {
            commands.push(Command::MoveRight);
        }

        if frame.button_pressed() && self.confirm_ready(now) {
            self.last_confirm = Some(now);
            commands.push(Command::Confirm);
        }

        commands
    }

    /// Whether enough time has passed since the last emitted confirm.
    fn confirm_ready(&self, now: Instant) -> bool {
        match self.last_confirm {
            None => true,
            Some(last) => now.duration_since(last) >= CONFIRM_DEBOUNCE,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
