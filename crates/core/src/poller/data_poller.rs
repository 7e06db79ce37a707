//! Polling loop implementation.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, info};

use crate::storage::{BlobStore, ObjectHandle};

use super::error::PollError;
use super::types::PollSpec;

/// Repeatedly lists a bucket prefix until matching objects appear.
///
/// The wait is cancellable: when constructed with a shutdown receiver,
/// a `true` on the channel aborts the poll with [`PollError::Cancelled`]
/// instead of waiting out the interval. Timeout is a hard floor; it is
/// never reported before the full deadline has elapsed.
pub struct DataPoller {
    blobs: Arc<dyn BlobStore>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl DataPoller {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            blobs,
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Waits up to `interval`, aborting early on a shutdown signal.
    async fn wait(&mut self, interval: Duration) -> Result<(), PollError> {
        match &mut self.shutdown {
            None => {
                sleep(interval).await;
                Ok(())
            }
            Some(rx) => {
                tokio::select! {
                    _ = sleep(interval) => Ok(()),
                    changed = rx.changed() => {
                        // A closed channel counts as shutdown too.
                        if changed.is_err() || *rx.borrow() {
                            Err(PollError::Cancelled)
                        } else {
                            Ok(())
                        }
                    }
                }
            }
        }
    }

    async fn list_matches(&self, spec: &PollSpec) -> Result<Vec<ObjectHandle>, PollError> {
        let objects = self.blobs.list(&spec.bucket, &spec.prefix).await?;
        Ok(objects
            .into_iter()
            .filter(|o| spec.rule.matches(o))
            .collect())
    }

    /// Polls until the rule matches, the deadline passes, or a shutdown
    /// is signalled.
    pub async fn poll(&mut self, spec: &PollSpec) -> Result<Vec<ObjectHandle>, PollError> {
        let deadline = Instant::now() + spec.timeout;
        info!(
            bucket = %spec.bucket,
            prefix = %spec.prefix,
            timeout_secs = spec.timeout.as_secs(),
            "waiting for data to arrive"
        );

        loop {
            let matches = self.list_matches(spec).await?;
            if !matches.is_empty() {
                if let Some(settle) = spec.settle {
                    debug!(settle_secs = settle.as_secs(), "data found, settling");
                    self.wait(settle).await?;
                    let settled = self.list_matches(spec).await?;
                    info!(count = settled.len(), "data arrived");
                    return Ok(settled);
                }
                info!(count = matches.len(), "data arrived");
                return Ok(matches);
            }

            if Instant::now() >= deadline {
                return Err(PollError::Timeout {
                    bucket: spec.bucket.clone(),
                    prefix: spec.prefix.clone(),
                    timeout: spec.timeout,
                });
            }

            debug!(prefix = %spec.prefix, "no data yet");
            self.wait(spec.interval).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::types::MatchRule;
    use crate::testing::MemoryBlobStore;

    fn spec() -> PollSpec {
        PollSpec::new("landing", "orders/ORD-1/", MatchRule::Suffix(".tar.gz".into()))
            .with_interval(Duration::from_secs(60))
            .with_timeout(Duration::from_secs(300))
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_matches_once_data_lands() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let mut poller = DataPoller::new(blobs.clone());

        let writer = blobs.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(130)).await;
            writer
                .put_object("landing", "orders/ORD-1/scene.tar.gz", vec![1, 2, 3], None)
                .await
                .unwrap();
        });

        let found = poller.poll(&spec()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "orders/ORD-1/scene.tar.gz");
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_matching_objects_are_ignored() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs
            .put_object("landing", "orders/ORD-1/notes.txt", vec![0], None)
            .await
            .unwrap();

        let mut poller = DataPoller::new(blobs);
        let err = poller.poll(&spec()).await.unwrap_err();
        assert!(matches!(err, PollError::Timeout { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_never_early() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let mut poller = DataPoller::new(blobs);

        let started = Instant::now();
        let err = poller.poll(&spec()).await.unwrap_err();
        assert!(matches!(err, PollError::Timeout { .. }));
        assert!(started.elapsed() >= Duration::from_secs(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_picks_up_sibling_files() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs
            .put_object("landing", "orders/ORD-1/a.tar.gz", vec![0], None)
            .await
            .unwrap();

        let writer = blobs.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(5)).await;
            writer
                .put_object("landing", "orders/ORD-1/b.tar.gz", vec![0], None)
                .await
                .unwrap();
        });

        let mut poller = DataPoller::new(blobs);
        let found = poller
            .poll(&spec().with_settle(Duration::from_secs(30)))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_the_poll() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let (tx, rx) = watch::channel(false);
        let mut poller = DataPoller::new(blobs).with_shutdown(rx);

        tokio::spawn(async move {
            sleep(Duration::from_secs(90)).await;
            let _ = tx.send(true);
        });

        let started = Instant::now();
        let err = poller.poll(&spec()).await.unwrap_err();
        assert!(matches!(err, PollError::Cancelled));
        // Cancelled well before the 300s deadline.
        assert!(started.elapsed() < Duration::from_secs(300));
    }
}
