//! Tracking poller
//!
//! Drives a [`Device`] connection: polls for messages with a timeout, appends
//! tracking frames to the frame log, acknowledges connection events and tries
//! to reopen the connection whenever the service reports it is not connected.

use std::io::{self, Write};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::device::{Device, SdkError};
use crate::frame_log::FrameLog;
use crate::model::{frame::TrackingFrame, message::Message};
use crate::util::CancelToken;

/// Connection lifecycle as seen by the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Polling reported the service as unreachable
    Disconnected,
    /// Opened, waiting for the service to confirm the connection
    Connecting,
    /// The service confirmed the connection
    Connected,
}

/// Counters reported when the poller shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollerStats {
    pub frames_logged: u64,
    pub connection_events: u64,
    pub unexpected_messages: u64,
    pub reconnect_attempts: u64,
}

/// Exponential delay between consecutive failed reconnects.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl ReconnectBackoff {
    pub fn new(initial: Duration, max: Duration) -> ReconnectBackoff {
        ReconnectBackoff {
            initial,
            max,
            current: initial.min(max),
        }
    }

    /// Delay to wait now, doubling the next one up to the ceiling.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial.min(self.max);
    }
}

pub struct TrackingPoller<D: Device, L: Write, O: Write> {
    device: D,
    log: FrameLog<L>,
    console: O,
    state: ConnectionState,
    poll_timeout: Duration,
    backoff: ReconnectBackoff,
    stats: PollerStats,
}

impl<D: Device, L: Write, O: Write> TrackingPoller<D, L, O> {
    /// Open `device` and build a poller around it.
    ///
    /// ## Returns
    ///
    /// * `TrackingPoller`: In the `Connecting` state.
    /// * `SdkError`: If the connection could not be opened; the poll loop must
    ///   not be entered.
    pub fn connect(
        mut device: D,
        log: FrameLog<L>,
        console: O,
        config: &Config,
    ) -> Result<Self, SdkError> {
        device.open()?;
        info!("Connection opened, waiting for the tracking service");

        Ok(TrackingPoller {
            device,
            log,
            console,
            state: ConnectionState::Connecting,
            poll_timeout: config.poll_timeout,
            backoff: ReconnectBackoff::new(config.reconnect_initial, config.reconnect_max),
            stats: PollerStats::default(),
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn stats(&self) -> PollerStats {
        self.stats
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Poll and dispatch until `cancel` fires or the device stream ends.
    ///
    /// Only I/O errors on the frame log or console end the loop with an error;
    /// device failures are logged and polling carries on.
    pub fn run(&mut self, cancel: &CancelToken) -> io::Result<()> {
        while !cancel.is_cancelled() {
            match self.device.poll(self.poll_timeout) {
                Ok(message) => self.dispatch(message)?,
                Err(SdkError::EndOfStream) => {
                    info!("Device reported end of stream");
                    break;
                }
                Err(err) => self.handle_poll_error(err, cancel),
            }
        }

        Ok(())
    }

    /// Handle a single message from the device.
    ///
    /// Unexpected message types are reported at `error` level so that no
    /// `RUST_LOG` filter hides them.
    pub fn dispatch(&mut self, message: Message) -> io::Result<()> {
        match message {
            Message::Tracking(frame) => self.log_frame(&frame),
            Message::Connection => {
                self.state = ConnectionState::Connected;
                self.stats.connection_events += 1;
                writeln!(
                    self.console,
                    "Tracking service connection successfully initialized."
                )
            }
            Message::Other(kind) => {
                self.stats.unexpected_messages += 1;
                error!("Unexpected message type: {:#x}", kind);
                Ok(())
            }
        }
    }

    fn log_frame(&mut self, frame: &TrackingFrame) -> io::Result<()> {
        self.log.append(frame)?;
        self.stats.frames_logged += 1;
        writeln!(self.console, "{}", frame.summary())
    }

    fn handle_poll_error(&mut self, err: SdkError, cancel: &CancelToken) {
        match err {
            SdkError::Timeout => debug!("Poll timed out: {}", err),
            SdkError::NotConnected => {
                warn!("Failed to poll connection: {}", err);
                self.reconnect(cancel);
            }
            _ => warn!("Failed to poll connection: {}", err),
        }
    }

    /// Mark the connection as lost and issue one reopen attempt.
    fn reconnect(&mut self, cancel: &CancelToken) {
        if self.state == ConnectionState::Connected {
            warn!("Connection lost, attempting to reconnect...");
        }
        self.state = ConnectionState::Disconnected;
        self.stats.reconnect_attempts += 1;

        match self.device.open() {
            Ok(()) => {
                info!("Reconnected successfully.");
                self.state = ConnectionState::Connected;
                self.backoff.reset();
            }
            Err(err) => {
                let delay = self.backoff.next_delay();
                warn!("Failed to reconnect: {}, retrying in {:?}", err, delay);
                if !delay.is_zero() {
                    cancel.wait_timeout(delay);
                }
            }
        }
    }

    /// Close the connection and flush the frame log.
    ///
    /// ## Returns
    ///
    /// * `(D, L, O)`: The device, the flushed log writer and the console.
    pub fn shutdown(mut self) -> io::Result<(D, L, O)> {
        self.device.close();
        self.console.flush()?;

        let stats = self.stats;
        info!(
            frames = stats.frames_logged,
            connection_events = stats.connection_events,
            unexpected = stats.unexpected_messages,
            reconnects = stats.reconnect_attempts,
            "Tracking session closed"
        );

        let writer = self.log.into_inner()?;
        Ok((self.device, writer, self.console))
    }
}
