//! revcue entry point

use revcue::{init_logging, run, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let settings = Settings::load()?;
    info!("=== revcue v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "polling {} at {} baud every {} ms",
        settings.device, settings.baud_rate, settings.poll_interval_ms
    );

    run(settings).await
}
