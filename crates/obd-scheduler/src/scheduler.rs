//! Polling Loop Implementation

use obd_protocol::{ObdError, ObdSession, Pid, Reading};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use threshold_trigger::{ThresholdRule, TriggerConfig, TriggerEvent};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Configuration for the polling loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Minimum pause between cycles (ms). This is a floor, not a target:
    /// the adapter cannot sustain back-to-back query bursts without
    /// settling time, so a cycle may run longer but the pause is never
    /// shortened.
    pub poll_interval_ms: u64,
    /// Upper bound for one channel read (bytes)
    pub read_limit: usize,
    /// Threshold rule parameters
    pub trigger: TriggerConfig,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 300,
            read_limit: 64,
            trigger: TriggerConfig::default(),
        }
    }
}

/// Events crossing from the polling task to the presentation side
#[derive(Debug, Clone, Copy)]
pub enum PollEvent {
    /// One assembled telemetry sample
    Reading(Reading),
    /// The threshold condition held for the sample just posted
    Trigger(TriggerEvent),
    /// The loop has ended; no further events follow
    Stopped,
}

/// Handle for ending the polling loop cooperatively.
///
/// The flag is checked once per cycle boundary, so teardown is
/// deterministic rather than error-driven.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Request that the loop end at the next cycle boundary
    pub fn stop(&self) {
        info!("polling stop requested");
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether a stop has been requested
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Fixed-order, fixed-cadence polling driver.
///
/// The scheduler is the sole caller of the session it is handed; each cycle
/// issues one exchange per PID, strictly in catalog order, so the
/// half-duplex channel never sees interleaved commands.
pub struct PollScheduler {
    config: PollConfig,
    rule: ThresholdRule,
    stop: StopHandle,
}

impl PollScheduler {
    /// Create a scheduler with the given configuration
    pub fn new(config: PollConfig) -> Self {
        let rule = ThresholdRule::new(config.trigger.clone());
        Self {
            config,
            rule,
            stop: StopHandle::default(),
        }
    }

    /// Handle the owner keeps to end the loop from another task
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Drive the session until stopped or the channel faults.
    ///
    /// Every cycle queries each PID in [`Pid::POLL_ORDER`], assembles one
    /// [`Reading`], evaluates the trigger rule, and posts the results
    /// without blocking (a slow consumer loses samples, never stalls the
    /// loop). A short response degrades that one value to zero and the
    /// cycle continues; a channel error faults the session and ends the
    /// loop with no internal retry. `PollEvent::Stopped` is posted in
    /// either case as the terminal signal.
    pub async fn run<C>(
        &mut self,
        session: &mut ObdSession<C>,
        events: mpsc::Sender<PollEvent>,
    ) -> Result<(), ObdError>
    where
        C: AsyncRead + AsyncWrite + Unpin,
    {
        info!(
            "polling loop started (interval {} ms)",
            self.config.poll_interval_ms
        );
        let pause = Duration::from_millis(self.config.poll_interval_ms);

        let result = loop {
            if self.stop.is_stopped() {
                info!("polling loop ended by stop request");
                break Ok(());
            }

            let mut reading = Reading::new(now_ms());
            let mut fault = None;
            for pid in Pid::POLL_ORDER {
                match session.query(pid, self.config.read_limit).await {
                    Ok(value) => reading.apply(pid, value),
                    Err(e) => {
                        fault = Some(e);
                        break;
                    }
                }
            }
            if let Some(e) = fault {
                warn!("polling aborted, session faulted: {}", e);
                break Err(e);
            }

            debug!(
                "cycle complete: rpm={} throttle={}%",
                reading.rpm, reading.throttle_percent
            );
            let _ = events.try_send(PollEvent::Reading(reading));
            if let Some(event) = self.rule.evaluate(&reading) {
                let _ = events.try_send(PollEvent::Trigger(event));
            }

            tokio::time::sleep(pause).await;
        };

        // Terminal signal for the consumer. When the queue is full the
        // sender dropping at return closes the stream, which reads the same.
        let _ = events.try_send(PollEvent::Stopped);
        result
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
