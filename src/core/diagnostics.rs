//! Side channel for failures that must not fail the caller

use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::error::RatesError;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum Diagnostic {
    /// A fetched table could not be written to a backend.
    Persistence(RatesError),
    /// A periodic refresh of the latest table failed.
    UpdaterTick(RatesError),
}

impl Diagnostic {
    pub fn error(&self) -> &RatesError {
        match self {
            Diagnostic::Persistence(e) | Diagnostic::UpdaterTick(e) => e,
        }
    }
}

#[derive(Clone)]
pub struct Diagnostics {
    tx: broadcast::Sender<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::Persistence(e) => warn!(error = %e, "Persisting fetched rates failed"),
            Diagnostic::UpdaterTick(e) => warn!(error = %e, "Latest rates refresh failed"),
        }
        if self.tx.send(diagnostic).is_err() {
            debug!("No diagnostic subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Diagnostic> {
        self.tx.subscribe()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}
