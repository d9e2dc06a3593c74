//! OBD-II PID Definitions and Decode Formulas
//!
//! Defines the Parameter IDs polled by this system and their decoding
//! formulas. Adding a PID means adding a variant and its catalog entries
//! here; the polling loop picks it up from [`Pid::POLL_ORDER`] untouched.

use serde::{Deserialize, Serialize};

/// Mode 01 PIDs polled by this system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Pid {
    /// Engine RPM (0x0C)
    Rpm = 0x0C,
    /// Throttle position (0x11)
    Throttle = 0x11,
}

impl Pid {
    /// Fixed polling order. RPM is always requested and resolved before
    /// Throttle within a cycle; the half-duplex channel permits only one
    /// outstanding exchange, so the order is never parallelized.
    pub const POLL_ORDER: [Pid; 2] = [Pid::Rpm, Pid::Throttle];

    /// Get the PID hex value
    pub fn as_hex(&self) -> u8 {
        *self as u8
    }

    /// Mode 01 request code, without the trailing carriage return
    pub fn request(&self) -> &'static str {
        match self {
            Pid::Rpm => "010C",
            Pid::Throttle => "0111",
        }
    }

    /// Number of data bytes a positive response carries for this PID
    pub fn response_bytes(&self) -> usize {
        match self {
            Pid::Rpm => 2,
            Pid::Throttle => 1,
        }
    }

    /// Decode response data bytes to a physical value.
    ///
    /// All arithmetic is integer (floor) division, matching the unit
    /// convention for these PIDs. A response with fewer bytes than
    /// [`Pid::response_bytes`] decodes to 0: a missed reading degrades
    /// to the sentinel instead of stalling the polling loop.
    pub fn decode(&self, bytes: &[u8]) -> u32 {
        match self {
            // RPM: ((A*256)+B)/4
            Pid::Rpm if bytes.len() >= 2 => {
                (u32::from(bytes[0]) * 256 + u32::from(bytes[1])) / 4
            }
            // Throttle position: A*100/255 (%)
            Pid::Throttle if !bytes.is_empty() => u32::from(bytes[0]) * 100 / 255,
            _ => 0,
        }
    }
}

/// One complete telemetry sample, assembled once per polling cycle.
/// Immutable once the cycle that built it completes; consumed by the
/// trigger rule and the presentation side, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Timestamp when the cycle started (Unix ms)
    pub timestamp_ms: u64,
    /// Engine RPM
    pub rpm: u16,
    /// Throttle position (0-100%)
    pub throttle_percent: u8,
}

impl Reading {
    /// Create an empty reading with the given timestamp
    pub fn new(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            ..Default::default()
        }
    }

    /// Store a decoded PID value into the matching field
    pub fn apply(&mut self, pid: Pid, value: u32) {
        match pid {
            Pid::Rpm => self.rpm = value as u16,
            Pid::Throttle => self.throttle_percent = value as u8,
        }
    }
}
