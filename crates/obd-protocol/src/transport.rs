//! Serial Transport
//!
//! Thin edge over `tokio-serial` for callers that talk to the adapter
//! through a serial device (USB ELM327 clones, Bluetooth RFCOMM bindings).
//! Which device to open, and when to tear it down, stays with the caller;
//! the session only consumes the opened stream.

use crate::error::ObdError;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::info;

/// Open the adapter's serial device for a session handoff
pub fn open_serial(device: &str, baud_rate: u32) -> Result<SerialStream, ObdError> {
    info!("opening serial device {} at {} baud", device, baud_rate);
    tokio_serial::new(device, baud_rate)
        .open_native_async()
        .map_err(|e| ObdError::SerialOpen {
            device: device.to_string(),
            reason: e.to_string(),
        })
}
