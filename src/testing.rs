//! Test doubles shared by unit tests

use crate::core::{RateKey, RateSource, RateTable, RequestType};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) fn sample_table(key: &str, eur: f64) -> RateTable {
    RateTable {
        key: key.to_string(),
        base: "USD".to_string(),
        timestamp: Some(1452988800),
        rates: BTreeMap::from([
            ("USD".to_string(), 1.0),
            ("MXN".to_string(), 18.21945),
            ("EUR".to_string(), eur),
        ]),
    }
}

/// Source whose n-th successful fetch carries `EUR = n`, so every payload is
/// distinguishable.
#[derive(Default)]
pub(crate) struct MockSource {
    calls: AtomicUsize,
    failing: AtomicBool,
    requests: Mutex<Vec<(RequestType, String)>>,
}

impl MockSource {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn requests(&self) -> Vec<(RequestType, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RateSource for MockSource {
    async fn fetch(&self, request: RequestType, key: &RateKey) -> Result<RateTable> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests
            .lock()
            .unwrap()
            .push((request, key.to_string()));
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("provider unavailable"));
        }
        // the provider payload has no key
        Ok(sample_table("", n as f64))
    }
}

/// Polls `check` until it holds, panicking after two seconds.
pub(crate) async fn wait_until(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(std::time::Duration::from_secs(2), async {
        while !check() {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
