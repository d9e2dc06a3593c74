//! OBD-II Protocol Implementation
//!
//! This crate provides async communication with ELM327-compatible OBD-II
//! adapters over a half-duplex byte channel: command framing, lenient
//! response parsing, and PID value decoding. The channel itself (serial
//! port, Bluetooth RFCOMM binding) is opened by the caller and handed off
//! to an [`ObdSession`].

mod error;
mod parse;
mod pid;
mod session;
mod transport;

pub use error::ObdError;
pub use parse::{extract_payload, filter_hex_tokens};
pub use pid::{Pid, Reading};
pub use session::{ConnectionState, ObdSession};
pub use transport::open_serial;

/// OBD-II mode constants
pub mod mode {
    /// Current data
    pub const CURRENT_DATA: u8 = 0x01;
    /// Offset added to the request mode in a positive response
    pub const REPLY_OFFSET: u8 = 0x40;
}
