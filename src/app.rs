//! App Event Loop
//!
//! The thin shell around the session: one `select!` loop that serializes
//! both input sources, shell controls and round-end results onto the
//! single writer of game state. Rendering and audio stay external; this
//! loop only logs the cues they would consume.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::game::command::Command;
use crate::game::events::GameEvent;
use crate::game::session::{GameMode, Session};
use crate::core::rng::SessionRng;
use crate::input::joystick::JoystickDecoder;
use crate::input::keyboard::{self, Control};
use crate::input::serial::{SerialConfig, SerialLinkManager};
use crate::service::{PredictorClient, ReporterClient, SessionMetrics};

/// App configuration, resolved from the environment in `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Serial port the joystick lives on, if any.
    pub serial_port: Option<String>,
    /// Base URL for the predictor/persistence backend.
    pub service_base_url: String,
    /// Initial round-end mode.
    pub mode: GameMode,
    /// RNG seed override; `None` seeds from the clock.
    pub rng_seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            serial_port: None,
            // Test fixture default, not production lock-in
            service_base_url: "http://127.0.0.1:5000".to_string(),
            mode: GameMode::Manual,
            rng_seed: None,
        }
    }
}

/// A transient message for the player, shown modally once `Over`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Metrics reached the persistence store.
    Saved,
    /// The predictor suggested a level (already applied).
    Suggestion(u32),
    /// Something non-fatal went wrong.
    Error(String),
}

/// Outcome of the spawned round-end call.
#[derive(Debug)]
enum RoundEnd {
    /// Predictor answered with a suggested level.
    Suggestion(u32),
    /// Reporter confirmed the save.
    Saved,
    /// Either call failed; game state stays untouched.
    Failed(String),
}

/// A round-end outcome tagged with the round it belongs to.
///
/// Restart bumps the app's round counter, so a reply that arrives after
/// the player restarted carries a stale tag and is dropped instead of
/// mutating the fresh session.
#[derive(Debug)]
struct RoundOutcome {
    round: u64,
    result: RoundEnd,
}

/// The running app: session plus its collaborators.
pub struct App {
    config: AppConfig,
    session: Session,
    link: SerialLinkManager,
    decoder: JoystickDecoder,
    notice: Option<Notice>,
    round: u64,
    predictor: Arc<PredictorClient>,
    reporter: Arc<ReporterClient>,
}

impl App {
    /// Build the app from config.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let rng = match config.rng_seed {
            Some(seed) => SessionRng::new(seed),
            None => SessionRng::from_entropy(),
        };

        let predictor = Arc::new(PredictorClient::new(config.service_base_url.clone())?);
        let reporter = Arc::new(ReporterClient::new(config.service_base_url.clone())?);
        let session = Session::new(config.mode, rng);

        Ok(Self {
            config,
            session,
            link: SerialLinkManager::new(),
            decoder: JoystickDecoder::new(),
            notice: None,
            round: 0,
            predictor,
            reporter,
        })
    }

    /// The authoritative session (read-only; for the render shell).
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The pending notice, if a round just closed.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Run until quit. Tearing down drops every channel, which stops the
    /// keyboard task, closes the serial port once, and discards any
    /// in-flight round-end result.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let (command_tx, mut command_rx) = mpsc::channel::<Command>(64);
        let (control_tx, mut control_rx) = mpsc::channel::<Control>(16);
        let (frame_tx, mut frame_rx) = mpsc::channel(64);
        let (round_tx, mut round_rx) = mpsc::channel::<RoundOutcome>(4);

        let keyboard_task = tokio::spawn(keyboard::run(command_tx.clone(), control_tx));

        loop {
            tokio::select! {
                Some(command) = command_rx.recv() => {
                    self.handle_command(command, &round_tx);
                }
                Some(frame) = frame_rx.recv() => {
                    for command in self.decoder.decode(&frame, Instant::now()) {
                        self.handle_command(command, &round_tx);
                    }
                }
                Some(control) = control_rx.recv() => {
                    if !self.handle_control(control, &frame_tx) {
                        break;
                    }
                }
                Some(outcome) = round_rx.recv() => {
                    self.handle_round_end(outcome);
                }
                else => break,
            }
        }

        keyboard_task.abort();
        self.link.disconnect();
        Ok(())
    }

    /// Apply one gameplay command and react to what it produced.
    fn handle_command(&mut self, command: Command, round_tx: &mpsc::Sender<RoundOutcome>) {
        let result = self.session.apply(command);

        for event in &result.events {
            match event {
                GameEvent::TargetMissed { lives, .. } => {
                    // Cue for the external audio collaborator
                    info!(lives, "mismatch cue");
                }
                GameEvent::TargetMatched { score, .. } => {
                    info!(score, "target matched");
                }
                GameEvent::GameOver { score, level, elapsed_seconds } => {
                    info!(score, level, "game over");
                    self.dispatch_round_end(SessionMetrics {
                        score: *score,
                        elapsed_seconds: *elapsed_seconds,
                        lives: 0,
                        level: *level,
                    }, round_tx);
                }
                _ => {}
            }
        }
    }

    /// Kick off the round-end call for the session's mode.
    ///
    /// The call runs on its own task; `Over` was already entered
    /// synchronously and nothing here blocks the loop.
    fn dispatch_round_end(&self, metrics: SessionMetrics, round_tx: &mpsc::Sender<RoundOutcome>) {
        let tx = round_tx.clone();
        let round = self.round;

        match self.session.mode() {
            GameMode::Adaptive => {
                let predictor = self.predictor.clone();
                tokio::spawn(async move {
                    let result = match predictor.predict(metrics).await {
                        Ok(level) => RoundEnd::Suggestion(level),
                        Err(err) => RoundEnd::Failed(err.to_string()),
                    };
                    let _ = tx.send(RoundOutcome { round, result }).await;
                });
            }
            GameMode::Manual => {
                let reporter = self.reporter.clone();
                tokio::spawn(async move {
                    let result = match reporter.save(metrics).await {
                        Ok(()) => RoundEnd::Saved,
                        Err(err) => RoundEnd::Failed(err.to_string()),
                    };
                    let _ = tx.send(RoundOutcome { round, result }).await;
                });
            }
        }
    }

    /// Apply a round-end outcome. Only a successful prediction mutates
    /// game state; everything else is a notice.
    ///
    /// An outcome from a round the player has since restarted away from
    /// is dropped whole: no state change, no notice.
    fn handle_round_end(&mut self, outcome: RoundOutcome) {
        if outcome.round != self.round {
            debug!(
                outcome_round = outcome.round,
                current_round = self.round,
                "dropping round-end reply from a restarted round"
            );
            return;
        }

        match outcome.result {
            RoundEnd::Suggestion(level) => {
                self.session.apply_suggested_level(level);
                self.notice = Some(Notice::Suggestion(level));
            }
            RoundEnd::Saved => {
                self.notice = Some(Notice::Saved);
            }
            RoundEnd::Failed(message) => {
                warn!(%message, "round-end call failed");
                self.notice = Some(Notice::Error(message));
            }
        }
    }

    /// Handle a shell control. Returns false to quit.
    fn handle_control(
        &mut self,
        control: Control,
        frame_tx: &mpsc::Sender<crate::input::joystick::JoystickFrame>,
    ) -> bool {
        match control {
            Control::Pause => {
                self.session.toggle_pause();
            }
            Control::Restart => {
                // Restart dismisses the modal notice along with the round
                // and invalidates any reply still in flight for it
                self.notice = None;
                self.round += 1;
                self.session.restart();
            }
            Control::ToggleMode => {
                let next = match self.session.mode() {
                    GameMode::Manual => GameMode::Adaptive,
                    GameMode::Adaptive => GameMode::Manual,
                };
                self.session.set_mode(next);
                info!(mode = ?next, "round-end mode switched");
            }
            Control::ConnectDevice => {
                let Some(port) = self.config.serial_port.clone() else {
                    self.notice = Some(Notice::Error("no serial port configured".into()));
                    return true;
                };
                let config = SerialConfig::new(port);
                if let Err(err) = self.link.connect(&config, frame_tx.clone()) {
                    warn!(%err, "joystick connect failed");
                    self.notice = Some(Notice::Error(err.to_string()));
                }
            }
            Control::Dismiss => {
                self.notice = None;
            }
            Control::Quit => return false,
        }
        true
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::session::Phase;
    use crate::service::tests::one_shot_http;

    fn test_app(mode: GameMode, base_url: &str) -> App {
        App::new(AppConfig {
            serial_port: None,
            service_base_url: base_url.to_string(),
            mode,
            rng_seed: Some(12345),
        })
        .unwrap()
    }

    /// Burn all three lives through the app's command path.
    fn play_to_game_over(app: &mut App, round_tx: &mpsc::Sender<RoundOutcome>) {
        while app.session.phase() == Phase::Playing {
            // Walk onto a mismatching color, then confirm
            while app.session.selected_color() == app.session.target() {
                let cmd = if app.session.selector() == 0 {
                    Command::MoveRight
                } else {
                    Command::MoveLeft
                };
                app.handle_command(cmd, round_tx);
            }
            app.handle_command(Command::Confirm, round_tx);
        }
    }

    #[tokio::test]
    async fn test_manual_mode_reports_and_notices() {
        let (addr, server) = one_shot_http("{}", 200).await;
        let mut app = test_app(GameMode::Manual, &format!("http://{}", addr));
        let (round_tx, mut round_rx) = mpsc::channel(4);

        play_to_game_over(&mut app, &round_tx);
        assert_eq!(app.session.phase(), Phase::Over);

        let outcome = round_rx.recv().await.unwrap();
        app.handle_round_end(outcome);

        assert_eq!(app.notice(), Some(&Notice::Saved));
        // Reporter never touches game state
        assert_eq!(app.session.level(), 1);
        assert_eq!(app.session.palette().len(), 4);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_adaptive_mode_applies_suggestion() {
        let (addr, server) = one_shot_http("{\"nivel_predicho\": 2}", 200).await;
        let mut app = test_app(GameMode::Adaptive, &format!("http://{}", addr));
        let (round_tx, mut round_rx) = mpsc::channel(4);

        play_to_game_over(&mut app, &round_tx);

        let outcome = round_rx.recv().await.unwrap();
        app.handle_round_end(outcome);

        assert_eq!(app.notice(), Some(&Notice::Suggestion(2)));
        assert_eq!(app.session.level(), 2);
        assert_eq!(app.session.palette().len(), 6);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_service_failure_leaves_state_untouched() {
        let mut app = test_app(GameMode::Adaptive, "http://127.0.0.1:1");
        let (round_tx, mut round_rx) = mpsc::channel(4);

        play_to_game_over(&mut app, &round_tx);

        let outcome = round_rx.recv().await.unwrap();
        app.handle_round_end(outcome);

        assert!(matches!(app.notice(), Some(Notice::Error(_))));
        assert_eq!(app.session.level(), 1);
        assert_eq!(app.session.palette().len(), 4);
        // The round is still closed
        assert_eq!(app.session.phase(), Phase::Over);
    }

    #[tokio::test]
    async fn test_reply_after_restart_is_dropped() {
        let mut app = test_app(GameMode::Adaptive, "http://127.0.0.1:1");
        let (round_tx, _round_rx) = mpsc::channel(4);
        let (frame_tx, _frame_rx) = mpsc::channel(4);

        play_to_game_over(&mut app, &round_tx);
        let closed_round = app.round;

        // Player restarts before the predictor answers
        app.handle_control(Control::Restart, &frame_tx);
        assert_eq!(app.session.phase(), Phase::Playing);

        // The late reply from the closed round must not touch the new one
        app.handle_round_end(RoundOutcome {
            round: closed_round,
            result: RoundEnd::Suggestion(2),
        });

        assert_eq!(app.session.level(), 1);
        assert_eq!(app.session.palette().len(), 4);
        assert_eq!(app.session.phase(), Phase::Playing);
        assert!(app.notice().is_none());

        // A reply tagged with the live round still applies
        app.handle_round_end(RoundOutcome {
            round: app.round,
            result: RoundEnd::Suggestion(2),
        });
        assert_eq!(app.session.level(), 2);
        assert_eq!(app.session.palette().len(), 6);
    }

    #[tokio::test]
    async fn test_restart_control_dismisses_notice() {
        let mut app = test_app(GameMode::Manual, "http://127.0.0.1:1");
        let (frame_tx, _frame_rx) = mpsc::channel(4);

        app.notice = Some(Notice::Saved);
        assert!(app.handle_control(Control::Restart, &frame_tx));

        assert!(app.notice().is_none());
        assert_eq!(app.session.phase(), Phase::Playing);
        assert_eq!(app.session.lives(), 3);
    }

    #[tokio::test]
    async fn test_mode_toggle_control() {
        let mut app = test_app(GameMode::Manual, "http://127.0.0.1:1");
        let (frame_tx, _frame_rx) = mpsc::channel(4);

        app.handle_control(Control::ToggleMode, &frame_tx);
        assert_eq!(app.session.mode(), GameMode::Adaptive);
        app.handle_control(Control::ToggleMode, &frame_tx);
        assert_eq!(app.session.mode(), GameMode::Manual);
    }

    #[tokio::test]
    async fn test_connect_without_port_is_notice() {
        let mut app = test_app(GameMode::Manual, "http://127.0.0.1:1");
        let (frame_tx, _frame_rx) = mpsc::channel(4);

        app.handle_control(Control::ConnectDevice, &frame_tx);
        assert!(matches!(app.notice(), Some(Notice::Error(_))));
    }

    #[tokio::test]
    async fn test_quit_control() {
        let mut app = test_app(GameMode::Manual, "http://127.0.0.1:1");
        let (frame_tx, _frame_rx) = mpsc::channel(4);
        assert!(!app.handle_control(Control::Quit, &frame_tx));
    }
}
