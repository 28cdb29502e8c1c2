//! Core primitives.
//!
//! The RNG is seedable so game logic stays reproducible under test while
//! the binary seeds it from the clock.

pub mod rng;

// Re-export core types
pub use rng::SessionRng;
