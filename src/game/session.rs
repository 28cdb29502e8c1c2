//! Session State Machine
//!
//! The authoritative game state and its single transition function.
//! All mutation funnels through [`Session::apply`] and the explicit
//! pause/restart/adapt operations; there is no other writer.

use std::time::Instant;

use tracing::debug;

use crate::STARTING_LIVES;
use crate::core::rng::SessionRng;
use crate::game::command::Command;
use crate::game::events::GameEvent;
use crate::game::palette::{Color, Palette};

/// Current phase of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Gameplay commands are processed.
    Playing,
    /// Gameplay commands are ignored; resume returns to `Playing`.
    Paused,
    /// Lives exhausted; terminal until an explicit restart.
    Over,
}

/// What happens at round end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Round-end metrics go to the persistence endpoint.
    Manual,
    /// Round-end metrics go to the level predictor and the suggested
    /// level is applied to the palette.
    Adaptive,
}

/// Result of one applied transition.
#[derive(Debug, Default)]
pub struct TransitionResult {
    /// Events generated by this transition.
    pub events: Vec<GameEvent>,
    /// Whether this transition ended the session.
    pub game_over: bool,
}

/// One continuous play-through from start/restart to game over.
///
/// Invariants:
/// - `0 <= selector < palette.len()`
/// - `lives == 0` exactly when `phase == Over`
/// - `target` is always a member of the palette
/// - score only ever increases
pub struct Session {
    palette: Palette,
    selector: usize,
    target: Color,
    lives: u32,
    score: u32,
    level: u32,
    mode: GameMode,
    phase: Phase,
    started_at: Instant,
    rng: SessionRng,
    pending_events: Vec<GameEvent>,
}

impl Session {
    /// Create a new session in `Playing` with initial values and a
    /// random target from the base palette.
    pub fn new(mode: GameMode, mut rng: SessionRng) -> Self {
        let palette = Palette::base();
        let target = roll_target(&palette, &mut rng);

        Self {
            palette,
            selector: 0,
            target,
            lives: STARTING_LIVES,
            score: 0,
            level: 1,
            mode,
            phase: Phase::Playing,
            started_at: Instant::now(),
            rng,
            pending_events: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current selector index.
    pub fn selector(&self) -> usize {
        self.selector
    }

    /// The color the player must currently match.
    pub fn target(&self) -> Color {
        self.target
    }

    /// Lives remaining.
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Accumulated score.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current difficulty level.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Round-end mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The palette the selector runs over.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Color currently under the selector.
    pub fn selected_color(&self) -> Color {
        // Selector is always in bounds, see invariants
        self.palette
            .get(self.selector)
            .unwrap_or(Color::Red)
    }

    /// Whole seconds since the session started (or last restart).
    pub fn elapsed_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Switch round-end mode. Takes effect at the next game over.
    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Apply one gameplay command.
    ///
    /// Commands are silent no-ops outside `Playing` - never an error.
    pub fn apply(&mut self, command: Command) -> TransitionResult {
        if self.phase != Phase::Playing {
            debug!(?command, phase = ?self.phase, "command ignored outside Playing");
            return TransitionResult::default();
        }

        match command {
            Command::MoveLeft => {
                // Clamp at the left edge, never wrap
                self.selector = self.selector.saturating_sub(1);
            }
            Command::MoveRight => {
                self.selector = (self.selector + 1).min(self.palette.max_index());
            }
            Command::Confirm => self.confirm(),
        }

        self.drain()
    }

    /// Resolve a confirm attempt.
    ///
    /// The lives decrement and the game-over check happen together inside
    /// this one transition, so rapid repeated confirms cannot observe a
    /// stale lives count.
    fn confirm(&mut self) {
        let selected = self.selected_color();

        if selected == self.target {
            self.score += 1;
            // Independent uniform re-roll; repeating the consumed target is fine
            self.target = roll_target(&self.palette, &mut self.rng);
            self.pending_events.push(GameEvent::target_matched(
                selected,
                self.score,
                self.target,
            ));
        } else {
            self.lives -= 1;
            self.pending_events
                .push(GameEvent::target_missed(selected, self.target, self.lives));

            if self.lives == 0 {
                self.phase = Phase::Over;
                self.pending_events
                    .push(GameEvent::phase_changed(Phase::Playing, Phase::Over));
                self.pending_events.push(GameEvent::game_over(
                    self.score,
                    self.level,
                    self.elapsed_seconds(),
                ));
            }
        }
    }

    /// Flip `Playing <-> Paused`. Disabled once `Over`.
    pub fn toggle_pause(&mut self) -> TransitionResult {
        let next = match self.phase {
            Phase::Playing => Phase::Paused,
            Phase::Paused => Phase::Playing,
            Phase::Over => return TransitionResult::default(),
        };

        self.pending_events
            .push(GameEvent::phase_changed(self.phase, next));
        self.phase = next;
        self.drain()
    }

    /// Re-initialize in place: lives, score, level, palette, selector and
    /// target all reset; the session identity is unchanged.
    pub fn restart(&mut self) -> TransitionResult {
        let old_phase = self.phase;

        self.palette = Palette::base();
        self.selector = 0;
        self.lives = STARTING_LIVES;
        self.score = 0;
        self.level = 1;
        self.target = roll_target(&self.palette, &mut self.rng);
        self.started_at = Instant::now();

        self.pending_events.push(GameEvent::SessionReset);
        if old_phase != Phase::Playing {
            self.pending_events
                .push(GameEvent::phase_changed(old_phase, Phase::Playing));
        }
        self.phase = Phase::Playing;

        self.drain()
    }

    /// Apply a suggested level from the predictor.
    ///
    /// Grows the palette to the 6-color set when the suggestion is above
    /// the current level, resets to the base 4-color set when below, and
    /// leaves it unchanged when equal. Any palette change clamps the
    /// selector and re-rolls the target.
    pub fn apply_suggested_level(&mut self, suggested: u32) -> TransitionResult {
        let current = self.level;

        let new_palette = if suggested > current {
            Some(Palette::expanded())
        } else if suggested < current {
            Some(Palette::base())
        } else {
            None
        };

        self.level = suggested.max(1);

        if let Some(palette) = new_palette {
            self.palette = palette;
            // A shrink must keep the selector in bounds
            self.selector = self.selector.min(self.palette.max_index());
            self.target = roll_target(&self.palette, &mut self.rng);
            self.pending_events.push(GameEvent::PaletteChanged {
                len: self.palette.len(),
                level: self.level,
            });
        }

        self.drain()
    }

    /// Drain pending events into a transition result.
    fn drain(&mut self) -> TransitionResult {
        let events = std::mem::take(&mut self.pending_events);
        let game_over = events.iter().any(|e| e.is_game_over());
        TransitionResult { events, game_over }
    }
}

/// Roll a uniform target from the palette.
fn roll_target(palette: &Palette, rng: &mut SessionRng) -> Color {
    rng.choose(palette.colors()).copied().unwrap_or(Color::Red)
}

// =============================================================================
// TESTS
// =============================================================================
