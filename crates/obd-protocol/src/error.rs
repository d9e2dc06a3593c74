//! OBD-II Error Types

use thiserror::Error;

/// Errors that can occur during OBD-II communication
///
/// Channel errors are fatal to the session that raised them: the session
/// transitions to `Faulted` and must be discarded. Re-establishing the
/// channel is the caller's responsibility.
#[derive(Debug, Error)]
pub enum ObdError {
    /// Failed to open the serial device
    #[error("failed to open serial device {device}: {reason}")]
    SerialOpen { device: String, reason: String },

    /// Write side of the byte channel failed
    #[error("channel write failed: {0}")]
    ChannelWrite(String),

    /// Read side of the byte channel failed
    #[error("channel read failed: {0}")]
    ChannelRead(String),

    /// The peer closed the channel mid-session
    #[error("channel closed by peer")]
    ChannelClosed,

    /// Session already faulted by an earlier channel error
    #[error("session is faulted and must be re-established")]
    SessionFaulted,
}
