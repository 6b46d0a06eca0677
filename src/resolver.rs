//! Cache-or-fetch resolution of rate tables

use std::iter;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::{
    Diagnostic, Diagnostics, Lookup, RateBackend, RateKey, RateSource, RateTable, RatesError,
    RequestType,
};

/// Mediates between the authoritative backend and the remote source.
///
/// When a database is configured it is the only backend consulted for reads;
/// the filesystem always receives a copy of freshly fetched tables.
#[derive(Clone)]
pub struct RateResolver {
    source: Arc<dyn RateSource>,
    files: Arc<dyn RateBackend>,
    database: Option<Arc<dyn RateBackend>>,
    diagnostics: Diagnostics,
}

impl RateResolver {
    pub fn new(
        source: Arc<dyn RateSource>,
        files: Arc<dyn RateBackend>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            source,
            files,
            database: None,
            diagnostics,
        }
    }

    pub fn with_database(mut self, database: Arc<dyn RateBackend>) -> Self {
        self.database = Some(database);
        self
    }

    /// Same source and filesystem copy, without the database.
    pub fn without_database(&self) -> Self {
        Self {
            database: None,
            ..self.clone()
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn authoritative(&self) -> &Arc<dyn RateBackend> {
        self.database.as_ref().unwrap_or(&self.files)
    }

    pub async fn resolve(
        &self,
        request: RequestType,
        key: &RateKey,
    ) -> Result<RateTable, RatesError> {
        key.check_request(request)?;
        let backend = self.authoritative();
        match backend.get(key).await {
            Lookup::Hit(table) => return Ok(table),
            Lookup::Miss => debug!("No {} copy of {}, fetching", backend.name(), key),
            Lookup::Failed(reason) => warn!(
                backend = backend.name(),
                %reason,
                "Lookup of {} failed, fetching", key
            ),
        }
        self.fetch_and_persist(request, key).await
    }

    /// Fetches `key` from the source and writes it to every active backend,
    /// overwriting any existing record.
    ///
    /// The request type must match the key. Write failures are reported on
    /// the diagnostics channel; the fetched table is returned regardless.
    pub async fn fetch_and_persist(
        &self,
        request: RequestType,
        key: &RateKey,
    ) -> Result<RateTable, RatesError> {
        key.check_request(request)?;
        let mut table =
            self.source
                .fetch(request, key)
                .await
                .map_err(|e| RatesError::UpstreamFetch {
                    request,
                    key: key.to_string(),
                    message: format!("{e:#}"),
                })?;
        table.key = key.to_string();
        info!("Fetched {} rates for {}", request, key);

        for backend in self.database.iter().chain(iter::once(&self.files)) {
            if let Err(e) = backend.put(key, &table).await {
                self.diagnostics.report(Diagnostic::Persistence(e));
            }
        }
        Ok(table)
    }
}
