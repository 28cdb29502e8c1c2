//! # Colorfall
//!
//! Single-session color-matching game: slide a selector over a palette,
//! confirm on the falling target color, keep your three lives. Input
//! comes from the keyboard or a serial joystick; when a session ends its
//! metrics go to an HTTP backend that either persists them or predicts
//! the next difficulty level.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        COLORFALL                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  └── rng.rs      - Seedable Xorshift128+ PRNG                │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── command.rs  - Normalized command vocabulary             │
//! │  ├── palette.rs  - Ordered color sets, base and expanded     │
//! │  ├── session.rs  - Authoritative state machine               │
//! │  └── events.rs   - Transition events for the shell           │
//! │                                                              │
//! │  input/          - Input sources (non-deterministic)         │
//! │  ├── keyboard.rs - Terminal key events -> commands/controls  │
//! │  ├── joystick.rs - Frame decoding with confirm debounce      │
//! │  └── serial.rs   - Serial link lifecycle and read loop       │
//! │                                                              │
//! │  service/        - Round-end HTTP collaborators              │
//! │  ├── protocol.rs - Wire payloads                             │
//! │  ├── predictor.rs- Adaptive-mode level predictor             │
//! │  └── reporter.rs - Manual-mode session persistence           │
//! │                                                              │
//! │  app.rs          - The select! loop tying it all together    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Split
//!
//! Everything in `core/` and `game/` is deterministic: given the same
//! RNG seed and command sequence, a session evolves identically. All
//! clocks, devices and sockets live in `input/`, `service/` and the app
//! loop, which serializes onto the single session writer.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod app;
pub mod core;
pub mod game;
pub mod input;
pub mod service;

// Re-export commonly used types
pub use crate::app::{App, AppConfig, Notice};
pub use crate::core::rng::SessionRng;
pub use crate::game::command::Command;
pub use crate::game::palette::{Color, Palette};
pub use crate::game::session::{GameMode, Phase, Session};

use std::time::Duration;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lives at the start of every session.
pub const STARTING_LIVES: u32 = 3;

/// Serial baud rate the joystick firmware talks at.
pub const BAUD_RATE: u32 = 115_200;

/// Axis magnitude a joystick deflection must exceed to count as a move.
pub const JOYSTICK_AXIS_THRESHOLD: i32 = 300;

/// Minimum gap between two joystick confirms.
pub const CONFIRM_DEBOUNCE: Duration = Duration::from_millis(300);
