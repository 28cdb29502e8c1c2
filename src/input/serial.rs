//! Serial Link Manager
//!
//! Owns the lifecycle of the joystick device connection: open the port,
//! run a line-oriented read loop on a blocking task, publish decoded
//! frames to the async side, close the port exactly once on teardown.
//!
//! The loop is cooperative with respect to the rest of the app: it lives
//! on the blocking pool, so keyboard commands are never starved by a
//! pending read.

use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn, debug};

use crate::BAUD_RATE;
use crate::input::joystick::JoystickFrame;

/// Serial link configuration.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Port name, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,
    /// Baud rate. The joystick firmware talks at 115200.
    pub baud: u32,
    /// Per-read timeout; bounds how long teardown can lag.
    pub read_timeout: Duration,
}

impl SerialConfig {
    /// Config for a named port at the standard baud rate.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud: BAUD_RATE,
            read_timeout: Duration::from_millis(100),
        }
    }
}

/// Serial link errors.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// A link is already active; disconnect it first.
    #[error("Joystick already connected")]
    AlreadyConnected,

    /// The port could not be opened (missing device, permissions, busy).
    #[error("Failed to open serial port: {0}")]
    Open(#[from] serialport::Error),
}

/// Handle to one active link.
struct ActiveLink {
    shutdown: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

/// Manages at most one serial device connection.
#[derive(Default)]
pub struct SerialLinkManager {
    active: Option<ActiveLink>,
}

impl SerialLinkManager {
    /// Create a manager with no active link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a link is currently running.
    pub fn is_connected(&self) -> bool {
        self.active
            .as_ref()
            .map(|link| !link.task.is_finished())
            .unwrap_or(false)
    }

    /// Open the configured port and start the read loop.
    ///
    /// Decoded frames are published on `frames`. A second connect while a
    /// link is live is rejected with [`LinkError::AlreadyConnected`].
    pub fn connect(
        &mut self,
        config: &SerialConfig,
        frames: mpsc::Sender<JoystickFrame>,
    ) -> Result<(), LinkError> {
        if self.is_connected() {
            return Err(LinkError::AlreadyConnected);
        }

        let port = serialport::new(&config.port, config.baud)
            .timeout(config.read_timeout)
            .open()?;

        info!(port = %config.port, baud = config.baud, "serial link open");

        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = shutdown.clone();
        let name = config.port.clone();

        let task = tokio::task::spawn_blocking(move || {
            read_loop(port, frames, flag);
            // Port handle dropped here - the single close
            info!(port = %name, "serial link closed");
        });

        self.active = Some(ActiveLink { shutdown, task });
        Ok(())
    }

    /// Tear down the active link, if any.
    ///
    /// The read loop notices the flag within one read timeout and exits,
    /// closing the port. Idempotent.
    pub fn disconnect(&mut self) {
        if let Some(link) = self.active.take() {
            link.shutdown.store(true, Ordering::Relaxed);
            // The blocking task finishes on its own; dropping the handle
            // detaches it rather than leaving a dangling abort.
            drop(link.task);
        }
    }
}

impl Drop for SerialLinkManager {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Blocking read loop: chunk -> UTF-8 lines -> frames.
///
/// Runs until the stream ends, the receiver goes away, or `shutdown` is
/// set. A malformed line is logged and skipped, never fatal.
fn read_loop(
    mut port: Box<dyn serialport::SerialPort>,
    frames: mpsc::Sender<JoystickFrame>,
    shutdown: Arc<AtomicBool>,
) {
    let mut chunk = [0u8; 256];
    let mut carry: Vec<u8> = Vec::with_capacity(256);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match port.read(&mut chunk) {
            // Stream signalled completion
            Ok(0) => break,
            Ok(n) => {
                carry.extend_from_slice(&chunk[..n]);

                while let Some(pos) = carry.iter().position(|&b| b == b'\n') {
                    let line_bytes: Vec<u8> = carry.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&line_bytes);
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match JoystickFrame::from_line(trimmed) {
                        Ok(frame) => {
                            debug!(?frame, "joystick frame");
                            if frames.blocking_send(frame).is_err() {
                                // Consumer is gone; tear down
                                return;
                            }
                        }
                        Err(err) => {
                            warn!(line = %trimmed, %err, "dropping malformed joystick line");
                        }
                    }
                }
            }
            // Timeout is just the cooperative yield point
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(%e, "serial read failed, closing link");
                break;
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
