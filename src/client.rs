//! Lifecycle of a configured rates client

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::converter;
use crate::core::config::RatesConfig;
use crate::core::{Diagnostic, Diagnostics, RateKey, RateSource, RateTable, RatesError, RequestType};
use crate::providers::OpenExchangeRates;
use crate::resolver::RateResolver;
use crate::store::{DatabaseBackend, FileBackend};
use crate::updater::LatestUpdater;

/// A configured client: resolver, optional database, and the latest-rates
/// updater. Independent instances do not share state.
pub struct ExchangeRates {
    resolver: Arc<RateResolver>,
    database: Option<Arc<DatabaseBackend>>,
    updater: Option<LatestUpdater>,
    diagnostics: Diagnostics,
}

impl ExchangeRates {
    /// Validates the credential, opens the backends and starts the updater
    /// when an interval is configured.
    pub async fn initialize(config: &RatesConfig) -> Result<Self, RatesError> {
        let api_key = config.api_key()?;
        let source = OpenExchangeRates::new(&config.provider.base_url, api_key, &config.base)
            .map_err(|e| RatesError::connection("provider", format!("{e:#}")))?;
        Self::with_source(config, Arc::new(source)).await
    }

    /// Like [`ExchangeRates::initialize`] with a caller-supplied source. The
    /// credential is not checked since the source owns it.
    pub async fn with_source(
        config: &RatesConfig,
        source: Arc<dyn RateSource>,
    ) -> Result<Self, RatesError> {
        let files = Arc::new(FileBackend::create(&config.history_folder).await?);
        let database = match &config.database_path {
            Some(path) => Some(Arc::new(
                DatabaseBackend::open(path, &config.history_collection).await?,
            )),
            None => None,
        };

        let diagnostics = Diagnostics::new();
        let mut resolver = RateResolver::new(source, files, diagnostics.clone());
        if let Some(db) = &database {
            resolver = resolver.with_database(db.clone());
        }
        let resolver = Arc::new(resolver);
        let updater = LatestUpdater::start(Arc::downgrade(&resolver), config.update_interval());

        info!(
            database = database.is_some(),
            updating = updater.is_some(),
            "Exchange rates initialized"
        );
        Ok(Self {
            resolver,
            database,
            updater,
            diagnostics,
        })
    }

    pub async fn get_rate_table(
        &self,
        request: RequestType,
        date: &str,
    ) -> Result<RateTable, RatesError> {
        let key = RateKey::parse(date)?;
        self.resolver.resolve(request, &key).await
    }

    pub async fn convert(
        &self,
        request: RequestType,
        date: &str,
        from: &str,
        amount: f64,
        to: &str,
    ) -> Result<f64, RatesError> {
        let key = RateKey::parse(date)?;
        converter::convert(&self.resolver, request, &key, from, amount, to).await
    }

    pub fn subscribe_diagnostics(&self) -> broadcast::Receiver<Diagnostic> {
        self.diagnostics.subscribe()
    }

    pub fn is_updating(&self) -> bool {
        self.updater.is_some()
    }

    pub fn has_database(&self) -> bool {
        self.database.is_some()
    }

    /// Stops the updater and closes the database. Later lookups are served
    /// from the history folder. Calling it again is a no-op.
    pub async fn teardown(&mut self) {
        if let Some(updater) = self.updater.take() {
            updater.shutdown().await;
        }
        if let Some(database) = self.database.take() {
            self.resolver = Arc::new(self.resolver.without_database());
            if let Err(e) = database.close().await {
                warn!(error = %e, "Closing rates database failed");
            }
        }
        info!("Exchange rates torn down");
    }
}
