use super::ui;
use crate::client::ExchangeRates;
use anyhow::{Result, bail};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// Keeps the latest-rates updater running until Ctrl-C, printing failures.
pub async fn run(rates: &ExchangeRates) -> Result<()> {
    if !rates.is_updating() {
        bail!("update_interval_ms must be set to a positive value to watch latest rates");
    }
    let mut diagnostics = rates.subscribe_diagnostics();
    info!("Watching latest rates, press Ctrl-C to stop");

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            received = diagnostics.recv() => match received {
                Ok(diagnostic) => eprintln!(
                    "{}",
                    ui::style_text(&diagnostic.error().to_string(), ui::StyleType::Error)
                ),
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {} diagnostics", skipped),
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}
