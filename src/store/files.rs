use crate::core::{Lookup, RateBackend, RateKey, RateTable, RatesError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const BACKEND: &str = "filesystem";

/// One `<key>.json` file per rate table inside a history folder.
pub struct FileBackend {
    folder: PathBuf,
}

impl FileBackend {
    /// Opens the history folder, creating it when absent.
    pub async fn create(folder: &Path) -> Result<Self, RatesError> {
        tokio::fs::create_dir_all(folder)
            .await
            .map_err(|e| RatesError::connection(BACKEND, format!("{}: {e}", folder.display())))?;
        debug!("Using history folder {}", folder.display());
        Ok(Self {
            folder: folder.to_path_buf(),
        })
    }

    pub fn path_for(&self, key: &RateKey) -> PathBuf {
        self.folder.join(format!("{key}.json"))
    }
}

#[async_trait]
impl RateBackend for FileBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn get(&self, key: &RateKey) -> Lookup {
        let path = self.path_for(key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Cache MISS for key: {}", key);
                return Lookup::Miss;
            }
            Err(e) => return Lookup::Failed(format!("{}: {e}", path.display())),
        };

        match serde_json::from_str::<RateTable>(&content) {
            Ok(mut table) => {
                if table.key.is_empty() {
                    table.key = key.to_string();
                }
                debug!("Cache HIT for key: {}", key);
                Lookup::Hit(table)
            }
            Err(e) => Lookup::Failed(format!("Malformed {}: {e}", path.display())),
        }
    }

    async fn put(&self, key: &RateKey, table: &RateTable) -> Result<(), RatesError> {
        let bytes =
            serde_json::to_vec(table).map_err(|e| RatesError::persistence(BACKEND, key.as_str(), e))?;
        tokio::fs::write(self.path_for(key), bytes)
            .await
            .map_err(|e| RatesError::persistence(BACKEND, key.as_str(), e))?;
        debug!("Cache PUT for key: {}", key);
        Ok(())
    }
}
