use crate::model::frame::TrackingFrame;

/// A message received from one poll of the device connection.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A new tracking frame is available.
    Tracking(TrackingFrame),

    /// The connection to the tracking service has been established.
    Connection,

    /// Any other event type, carried as the raw SDK type code.
    Other(u32),
}
