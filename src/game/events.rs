//! Game Events
//!
//! Derived events emitted by session transitions. Consumers (audio cue,
//! round-end pipeline, UI shell) react to these; the session itself never
//! calls out.

use serde::{Serialize, Deserialize};
use crate::game::palette::Color;
use crate::game::session::Phase;

/// An event derived from one applied transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Confirmed color matched the target.
    TargetMatched {
        /// The color that was matched.
        color: Color,
        /// Score after the increment.
        score: u32,
        /// Freshly rolled next target.
        next_target: Color,
    },

    /// Confirmed color did not match the target.
    ///
    /// The external audio collaborator plays its mismatch cue off this.
    TargetMissed {
        /// What the player had selected.
        selected: Color,
        /// What the target was.
        target: Color,
        /// Lives remaining after the decrement.
        lives: u32,
    },

    /// Lives hit zero; the session is over.
    GameOver {
        /// Final score.
        score: u32,
        /// Level at the time the session ended.
        level: u32,
        /// Seconds since the session started (or last restart).
        elapsed_seconds: u64,
    },

    /// Phase flipped (pause/resume, game over, restart).
    PhaseChanged {
        /// Phase before the transition.
        from: Phase,
        /// Phase after the transition.
        to: Phase,
    },

    /// The difficulty adapter replaced the palette.
    PaletteChanged {
        /// New palette size.
        len: usize,
        /// Level that drove the change.
        level: u32,
    },

    /// Session was re-initialized in place.
    SessionReset,
}

impl GameEvent {
    /// Create a target-matched event.
    pub fn target_matched(color: Color, score: u32, next_target: Color) -> Self {
        GameEvent::TargetMatched {
            color,
            score,
            next_target,
        }
    }

    /// Create a target-missed event.
    pub fn target_missed(selected: Color, target: Color, lives: u32) -> Self {
        GameEvent::TargetMissed {
            selected,
            target,
            lives,
        }
    }

    /// Create a game-over event.
    pub fn game_over(score: u32, level: u32, elapsed_seconds: u64) -> Self {
        GameEvent::GameOver {
            score,
            level,
            elapsed_seconds,
        }
    }

    /// Create a phase-changed event.
    pub fn phase_changed(from: Phase, to: Phase) -> Self {
        GameEvent::PhaseChanged { from, to }
    }

    /// Whether this event closes the round.
    pub fn is_game_over(&self) -> bool {
        matches!(self, GameEvent::GameOver { .. })
    }
}
