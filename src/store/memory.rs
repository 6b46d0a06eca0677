use crate::core::{Lookup, RateBackend, RateKey, RateTable, RatesError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory backend with switchable failures, used to exercise the resolver
/// policy without touching disk.
pub(crate) struct MemoryBackend {
    name: &'static str,
    inner: Mutex<HashMap<String, RateTable>>,
    fail_gets: AtomicBool,
    fail_puts: AtomicBool,
    gets: AtomicUsize,
}

impl MemoryBackend {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(HashMap::new()),
            fail_gets: AtomicBool::new(false),
            fail_puts: AtomicBool::new(false),
            gets: AtomicUsize::new(0),
        }
    }

    pub(crate) fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub(crate) async fn stored(&self, key: &str) -> Option<RateTable> {
        self.inner.lock().await.get(key).cloned()
    }

    pub(crate) async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[async_trait]
impl RateBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn get(&self, key: &RateKey) -> Lookup {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Lookup::Failed("simulated transient error".to_string());
        }
        let cache = self.inner.lock().await;
        match cache.get(key.as_str()) {
            Some(table) => {
                debug!("Cache HIT for key: {}", key);
                Lookup::Hit(table.clone())
            }
            None => {
                debug!("Cache MISS for key: {}", key);
                Lookup::Miss
            }
        }
    }

    async fn put(&self, key: &RateKey, table: &RateTable) -> Result<(), RatesError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(RatesError::persistence(
                self.name,
                key.as_str(),
                "simulated write failure",
            ));
        }
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {}", key);
        cache.insert(key.to_string(), table.clone());
        Ok(())
    }
}
