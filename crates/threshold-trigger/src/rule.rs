//! Threshold Rule Implementation

use obd_protocol::Reading;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Trigger thresholds. Both must be exceeded strictly for the rule to fire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// RPM floor (exclusive)
    pub rpm_above: u16,
    /// Throttle position floor (exclusive, percent)
    pub throttle_above: u8,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            rpm_above: 2500,
            throttle_above: 80,
        }
    }
}

/// Zero-payload signal: the threshold condition held this cycle.
/// Consumed immediately by the audio side; never queued or deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent;

/// Stateless threshold rule over a [`Reading`].
///
/// No hysteresis and no debounce: the rule is re-evaluated independently
/// every cycle and fires on every qualifying cycle in a row. Rate-limiting
/// the resulting effect is the consumer's concern.
#[derive(Debug, Clone, Default)]
pub struct ThresholdRule {
    config: TriggerConfig,
}

impl ThresholdRule {
    /// Create a rule with the given thresholds
    pub fn new(config: TriggerConfig) -> Self {
        Self { config }
    }

    /// Evaluate one reading. Fires iff both thresholds are strictly exceeded.
    pub fn evaluate(&self, reading: &Reading) -> Option<TriggerEvent> {
        if reading.rpm > self.config.rpm_above
            && reading.throttle_percent > self.config.throttle_above
        {
            debug!(
                "threshold crossed: rpm={} throttle={}%",
                reading.rpm, reading.throttle_percent
            );
            Some(TriggerEvent)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(rpm: u16, throttle_percent: u8) -> Reading {
        Reading {
            timestamp_ms: 0,
            rpm,
            throttle_percent,
        }
    }

    #[test]
    fn test_fires_when_both_thresholds_exceeded() {
        let rule = ThresholdRule::default();
        assert_eq!(rule.evaluate(&reading(3000, 90)), Some(TriggerEvent));
        assert_eq!(rule.evaluate(&reading(2501, 81)), Some(TriggerEvent));
    }

    #[test]
    fn test_boundary_values_do_not_fire() {
        let rule = ThresholdRule::default();
        assert_eq!(rule.evaluate(&reading(2500, 100)), None);
        assert_eq!(rule.evaluate(&reading(8000, 80)), None);
        assert_eq!(rule.evaluate(&reading(2500, 80)), None);
    }

    #[test]
    fn test_one_condition_alone_does_not_fire() {
        let rule = ThresholdRule::default();
        assert_eq!(rule.evaluate(&reading(996, 100)), None);
        assert_eq!(rule.evaluate(&reading(3000, 10)), None);
    }

    #[test]
    fn test_refires_every_qualifying_evaluation() {
        let rule = ThresholdRule::default();
        let sample = reading(3000, 90);
        assert!(rule.evaluate(&sample).is_some());
        assert!(rule.evaluate(&sample).is_some());
    }

    #[test]
    fn test_custom_thresholds() {
        let rule = ThresholdRule::new(TriggerConfig {
            rpm_above: 1000,
            throttle_above: 50,
        });
        assert!(rule.evaluate(&reading(1001, 51)).is_some());
        assert!(rule.evaluate(&reading(1000, 51)).is_none());
    }
}
