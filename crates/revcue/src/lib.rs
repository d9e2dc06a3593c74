//! revcue — console front-end for live engine telemetry
//!
//! Owns everything the protocol core treats as external: settings, logging,
//! the serial port lifecycle, text rendering of each Reading, and the audio
//! cue request when the threshold trigger fires. Cue selection and playback
//! belong to the audio side; this front-end only surfaces the request.

mod settings;

pub use settings::Settings;

use anyhow::Context;
use obd_protocol::ObdSession;
use obd_scheduler::{PollEvent, PollScheduler};
use tokio::sync::mpsc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Capacity of the polling-to-presentation event queue
const EVENT_QUEUE_DEPTH: usize = 32;

/// Install the global tracing subscriber
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Open the adapter, run the polling loop, and render its output until the
/// loop ends or Ctrl-C is pressed.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let port = obd_protocol::open_serial(&settings.device, settings.baud_rate)
        .with_context(|| format!("opening {}", settings.device))?;
    let mut session = ObdSession::attach(port);
    session
        .initialize(settings.read_limit)
        .await
        .context("adapter handshake")?;

    let mut scheduler = PollScheduler::new(settings.poll_config());
    let stop = scheduler.stop_handle();
    let (events_tx, mut events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);

    let poller = tokio::spawn(async move { scheduler.run(&mut session, events_tx).await });

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });

    while let Some(event) = events_rx.recv().await {
        match event {
            PollEvent::Reading(reading) => {
                println!("RPM: {}  Throttle: {}%", reading.rpm, reading.throttle_percent);
            }
            PollEvent::Trigger(_) => {
                info!("threshold crossed, requesting audio cue");
            }
            PollEvent::Stopped => break,
        }
    }
    info!("polling stopped");

    match poller.await? {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("session faulted: {}", e);
            Err(e.into())
        }
    }
}
