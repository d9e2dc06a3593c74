//! Runtime Settings

use config::{Config, ConfigError, Environment, File};
use obd_scheduler::PollConfig;
use serde::{Deserialize, Serialize};
use threshold_trigger::TriggerConfig;

/// Settings for one run.
///
/// Layered: built-in defaults, then an optional `revcue.toml` next to the
/// working directory, then `REVCUE_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Serial device the adapter is bound to
    pub device: String,
    /// Serial baud rate
    pub baud_rate: u32,
    /// Minimum pause between polling cycles (ms)
    pub poll_interval_ms: u64,
    /// Upper bound for one channel read (bytes)
    pub read_limit: usize,
    /// RPM floor for the cue trigger (exclusive)
    pub rpm_above: u16,
    /// Throttle floor for the cue trigger (exclusive, percent)
    pub throttle_above: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Classic Linux binding for a paired "OBDII" Bluetooth adapter
            device: "/dev/rfcomm0".to_string(),
            baud_rate: 38400,
            poll_interval_ms: 300,
            read_limit: 64,
            rpm_above: 2500,
            throttle_above: 80,
        }
    }
}

impl Settings {
    /// Load settings, layering file and environment over the defaults
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("revcue").required(false))
            .add_source(Environment::with_prefix("REVCUE"))
            .build()?
            .try_deserialize()
    }

    /// Polling loop configuration derived from these settings
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            poll_interval_ms: self.poll_interval_ms,
            read_limit: self.read_limit,
            trigger: TriggerConfig {
                rpm_above: self.rpm_above,
                throttle_above: self.throttle_above,
            },
        }
    }
}
