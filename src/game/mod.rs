//! Game Logic Module
//!
//! The deterministic half of the crate: given the same commands and RNG
//! seed, a session always evolves identically. No I/O happens here.
//!
//! ## Module Structure
//!
//! - `command`: the normalized command vocabulary
//! - `palette`: ordered color set, base and expanded variants
//! - `session`: authoritative state machine and transition rules
//! - `events`: derived events for the shell, audio cue and round-end pipeline

pub mod command;
pub mod palette;
pub mod session;
pub mod events;

// Re-export key types
pub use command::Command;
pub use palette::{Color, Palette};
pub use session::{Session, Phase, GameMode, TransitionResult};
pub use events::GameEvent;
