use crate::core::{Lookup, RateBackend, RateKey, RateTable, RatesError};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::{debug, info};

const BACKEND: &str = "database";

fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 512
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '#' | '$'))
}

/// Rate tables stored as JSON documents in an embedded fjall keyspace, one
/// partition per collection, keyed by the rate key.
pub struct DatabaseBackend {
    keyspace: Keyspace,
    collection: PartitionHandle,
}

impl DatabaseBackend {
    pub async fn open(path: &Path, collection: &str) -> Result<Self, RatesError> {
        if !is_valid_collection_name(collection) {
            return Err(RatesError::connection(
                BACKEND,
                format!("invalid collection name '{collection}'"),
            ));
        }

        let path = path.to_path_buf();
        let name = collection.to_string();
        let (keyspace, collection) = tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&path)?;
            let keyspace = fjall::Config::new(&path).open()?;
            let partition = keyspace.open_partition(&name, PartitionCreateOptions::default())?;
            Ok::<_, anyhow::Error>((keyspace, partition))
        })
        .await
        .map_err(|e| RatesError::connection(BACKEND, e))?
        .map_err(|e| RatesError::connection(BACKEND, format!("{e:#}")))?;

        info!("Opened rates database");
        Ok(Self {
            keyspace,
            collection,
        })
    }

    /// Flushes the journal to disk. The handle stays usable afterwards.
    pub async fn close(&self) -> Result<(), RatesError> {
        let keyspace = self.keyspace.clone();
        tokio::task::spawn_blocking(move || keyspace.persist(PersistMode::SyncAll))
            .await
            .map_err(|e| RatesError::connection(BACKEND, e))?
            .map_err(|e| RatesError::connection(BACKEND, e))?;
        debug!("Flushed rates database");
        Ok(())
    }
}

#[async_trait]
impl RateBackend for DatabaseBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn get(&self, key: &RateKey) -> Lookup {
        let collection = self.collection.clone();
        let raw_key = key.to_string();
        let res = tokio::task::spawn_blocking(move || -> anyhow::Result<Option<RateTable>> {
            match collection.get(raw_key.as_bytes())? {
                Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
                None => Ok(None),
            }
        })
        .await;

        match res {
            Ok(Ok(Some(table))) => {
                debug!("Cache HIT for key: {}", key);
                Lookup::Hit(table)
            }
            Ok(Ok(None)) => {
                debug!("Cache MISS for key: {}", key);
                Lookup::Miss
            }
            Ok(Err(e)) => Lookup::Failed(format!("{e:#}")),
            Err(e) => Lookup::Failed(e.to_string()),
        }
    }

    async fn put(&self, key: &RateKey, table: &RateTable) -> Result<(), RatesError> {
        let bytes =
            serde_json::to_vec(table).map_err(|e| RatesError::persistence(BACKEND, key.as_str(), e))?;
        let collection = self.collection.clone();
        let raw_key = key.to_string();
        tokio::task::spawn_blocking(move || collection.insert(raw_key.as_bytes(), bytes.as_slice()))
            .await
            .map_err(|e| RatesError::persistence(BACKEND, key.as_str(), e))?
            .map_err(|e| RatesError::persistence(BACKEND, key.as_str(), e))?;
        debug!("Cache PUT for key: {}", key);
        Ok(())
    }
}
