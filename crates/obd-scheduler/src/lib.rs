//! OBD-II Polling Scheduler
//!
//! Drives a protocol session in a fixed-order, fixed-cadence loop: one
//! Reading per cycle, threshold evaluation on each Reading, and a
//! non-blocking event stream to the presentation side.

mod scheduler;

pub use scheduler::{PollConfig, PollEvent, PollScheduler, StopHandle};
