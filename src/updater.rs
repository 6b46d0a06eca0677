//! Periodic refresh of the `latest` rate table

use std::sync::Weak;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::core::{Diagnostic, RateKey, RequestType};
use crate::resolver::RateResolver;

/// Handle to the background refresh task.
///
/// The task only holds a weak reference to the resolver and exits once the
/// resolver is gone or a stop was requested. Dropping the handle requests a
/// stop as well.
pub struct LatestUpdater {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl LatestUpdater {
    /// Starts refreshing every `interval`. Returns `None` when no interval is
    /// configured.
    pub fn start(resolver: Weak<RateResolver>, interval: Option<Duration>) -> Option<Self> {
        let period = interval.filter(|d| !d.is_zero())?;
        let (stop, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run(resolver, period, stop_rx));
        info!("Refreshing latest rates every {:?}", period);
        Some(Self {
            stop,
            task: Some(task),
        })
    }

    /// Requests a stop. No tick starts after this returns; a tick already in
    /// progress is allowed to finish.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    /// Stops and waits for an in-flight tick to complete.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                debug!("Updater task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for LatestUpdater {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(resolver: Weak<RateResolver>, period: Duration, mut stop_rx: watch::Receiver<bool>) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {}
        }
        if *stop_rx.borrow() {
            break;
        }
        let Some(resolver) = resolver.upgrade() else {
            break;
        };
        tick(&resolver).await;
    }
    debug!("Latest rates updater stopped");
}

async fn tick(resolver: &RateResolver) {
    match resolver
        .fetch_and_persist(RequestType::Latest, &RateKey::latest())
        .await
    {
        Ok(table) => debug!("Refreshed latest rates ({} currencies)", table.rates.len()),
        Err(e) => resolver.diagnostics().report(Diagnostic::UpdaterTick(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Diagnostics, Lookup, RateBackend, RatesError};
    use crate::store::memory::MemoryBackend;
    use crate::testing::{MockSource, wait_until};
    use std::sync::Arc;

    const PERIOD: Option<Duration> = Some(Duration::from_millis(20));

    #[tokio::test]
    async fn test_latest_reflects_most_recent_payload() {
        let source = MockSource::new();
        let files = Arc::new(MemoryBackend::new("filesystem"));
        let resolver = Arc::new(RateResolver::new(
            source.clone(),
            files.clone(),
            Diagnostics::new(),
        ));

        let updater = LatestUpdater::start(Arc::downgrade(&resolver), PERIOD).unwrap();
        wait_until(|| source.calls() >= 3).await;
        updater.shutdown().await;

        let calls = source.calls();
        let latest = files.stored("latest").await.unwrap();
        assert_eq!(latest.key, "latest");
        assert_eq!(latest.rate("EUR"), Some(calls as f64));
        assert!(
            source
                .requests()
                .iter()
                .all(|(request, key)| *request == RequestType::Latest && key == "latest")
        );
    }

    #[tokio::test]
    async fn test_refresh_ignores_cached_copy() {
        let source = MockSource::new();
        let files = Arc::new(MemoryBackend::new("filesystem"));
        files
            .put(&RateKey::latest(), &crate::testing::sample_table("latest", 0.5))
            .await
            .unwrap();
        let resolver = Arc::new(RateResolver::new(
            source.clone(),
            files.clone(),
            Diagnostics::new(),
        ));

        let updater = LatestUpdater::start(Arc::downgrade(&resolver), PERIOD).unwrap();
        wait_until(|| source.calls() >= 1).await;
        updater.shutdown().await;

        match files.get(&RateKey::latest()).await {
            Lookup::Hit(table) => assert_ne!(table.rate("EUR"), Some(0.5)),
            other => panic!("Expected a hit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_disabled_without_positive_interval() {
        let source = MockSource::new();
        let files = Arc::new(MemoryBackend::new("filesystem"));
        let resolver = Arc::new(RateResolver::new(source, files, Diagnostics::new()));

        assert!(LatestUpdater::start(Arc::downgrade(&resolver), None).is_none());
        assert!(LatestUpdater::start(Arc::downgrade(&resolver), Some(Duration::ZERO)).is_none());
    }

    #[tokio::test]
    async fn test_tick_failures_do_not_stop_timer() {
        let source = MockSource::new();
        source.set_failing(true);
        let files = Arc::new(MemoryBackend::new("filesystem"));
        let diagnostics = Diagnostics::new();
        let mut rx = diagnostics.subscribe();
        let resolver = Arc::new(RateResolver::new(source.clone(), files.clone(), diagnostics));

        let updater = LatestUpdater::start(Arc::downgrade(&resolver), PERIOD).unwrap();
        wait_until(|| source.calls() >= 2).await;

        match rx.recv().await.unwrap() {
            Diagnostic::UpdaterTick(RatesError::UpstreamFetch { request, .. }) => {
                assert_eq!(request, RequestType::Latest)
            }
            other => panic!("Expected updater diagnostic, got {other:?}"),
        }
        assert!(files.stored("latest").await.is_none());

        // provider recovers on a later tick
        source.set_failing(false);
        let failed = source.calls();
        wait_until(|| source.calls() > failed + 1).await;
        updater.shutdown().await;
        assert!(files.stored("latest").await.is_some());
    }

    #[tokio::test]
    async fn test_no_ticks_after_stop() {
        let source = MockSource::new();
        let files = Arc::new(MemoryBackend::new("filesystem"));
        let resolver = Arc::new(RateResolver::new(
            source.clone(),
            files,
            Diagnostics::new(),
        ));

        let updater = LatestUpdater::start(Arc::downgrade(&resolver), PERIOD).unwrap();
        wait_until(|| source.calls() >= 1).await;
        updater.stop();
        assert!(*updater.stop.borrow());
        updater.shutdown().await;

        let calls = source.calls();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(source.calls(), calls);
    }

    #[tokio::test]
    async fn test_exits_when_resolver_dropped() {
        let source = MockSource::new();
        let files = Arc::new(MemoryBackend::new("filesystem"));
        let resolver = Arc::new(RateResolver::new(
            source.clone(),
            files,
            Diagnostics::new(),
        ));

        let mut updater = LatestUpdater::start(Arc::downgrade(&resolver), PERIOD).unwrap();
        drop(resolver);

        let task = updater.task.take().unwrap();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("updater should exit")
            .unwrap();
        assert_eq!(source.calls(), 0);
    }
}
