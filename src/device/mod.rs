//! Tracking device collaborators
//!
//! The poller talks to the tracking service through the [`Device`] trait. The
//! live LeapC backend is only built with the `leapc` feature; the replay backend
//! plays back a recorded message script and needs no hardware.

#[cfg(feature = "leapc")]
pub mod leapc;
#[cfg(test)]
pub mod mock;
pub mod replay;

use std::time::Duration;

use thiserror::Error;

use crate::model::message::Message;

/// Raw status code for a poll that saw no message before its timeout.
pub const STATUS_TIMEOUT: u32 = 0xE201_0004;
/// Raw status code for a connection that is not attached to the service.
pub const STATUS_NOT_CONNECTED: u32 = 0xE201_0005;

/// Non-success status reported by a device call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SdkError {
    #[error("timed out waiting for a message (0xe2010004)")]
    Timeout,

    #[error("not connected to the tracking service (0xe2010005)")]
    NotConnected,

    /// The device will never produce another message.
    #[error("message stream ended")]
    EndOfStream,

    #[error("device call failed ({0:#x})")]
    Status(u32),
}

impl SdkError {
    /// Map a raw SDK status code onto a typed error.
    pub fn from_code(code: u32) -> SdkError {
        match code {
            STATUS_TIMEOUT => SdkError::Timeout,
            STATUS_NOT_CONNECTED => SdkError::NotConnected,
            other => SdkError::Status(other),
        }
    }
}

/// A session with a tracking service.
///
/// Creating the value corresponds to creating the SDK connection object; it is
/// destroyed when dropped.
pub trait Device {
    /// Opens (or re-opens) the connection.
    fn open(&mut self) -> Result<(), SdkError>;

    /// Blocks up to `timeout` for the next message.
    fn poll(&mut self, timeout: Duration) -> Result<Message, SdkError>;

    /// Closes the connection. Safe to call on a connection that is not open.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_variants() {
        assert_eq!(SdkError::from_code(STATUS_TIMEOUT), SdkError::Timeout);
        assert_eq!(
            SdkError::from_code(STATUS_NOT_CONNECTED),
            SdkError::NotConnected
        );
        assert_eq!(
            SdkError::from_code(0xE201_0000),
            SdkError::Status(0xE201_0000)
        );
    }

    #[test]
    fn errors_print_their_code() {
        assert_eq!(
            SdkError::NotConnected.to_string(),
            "not connected to the tracking service (0xe2010005)"
        );
        assert_eq!(
            SdkError::Status(0xE201_0000).to_string(),
            "device call failed (0xe2010000)"
        );
    }
}
