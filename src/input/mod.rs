//! Input Layer
//!
//! Two physically distinct producers - the keyboard and a serial joystick
//! device - normalized into one command stream. This layer is
//! **non-deterministic**; all game rules live in `game/`.
//!
//! Unification works by construction: both sources hold a clone of the
//! same `mpsc::Sender<Command>`, so the session sees a single serialized
//! queue in arrival order.

pub mod keyboard;
pub mod joystick;
pub mod serial;

pub use keyboard::{Control, KeyAction, map_key};
pub use joystick::{JoystickFrame, JoystickDecoder};
pub use serial::{SerialConfig, SerialLinkManager, LinkError};
