//! Threshold Trigger
//!
//! Evaluates a driver-defined performance threshold against each telemetry
//! reading and emits a discrete event when the condition holds.

mod rule;

pub use rule::{ThresholdRule, TriggerConfig, TriggerEvent};
