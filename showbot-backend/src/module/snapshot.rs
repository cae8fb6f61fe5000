///! Swappable, reference-counted cache snapshots
///!
///! A snapshot is built off to the side and installed with a single pointer
///! swap. Readers clone the `Arc` under a short read lock and iterate it
///! without holding the lock, so they see either the old snapshot or the new
///! one, never a mix.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use super::fetcher::PagedRecords;

/// Data that can live in a [`SnapshotCell`].
pub trait Snapshot: Send + Sync {
    fn record_count(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}

pub struct SnapshotCell<T> {
    inner: RwLock<Arc<T>>,
}

impl<T: Snapshot> SnapshotCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: RwLock::new(Arc::new(initial)),
        }
    }

    /// The installed snapshot.
    pub async fn current(&self) -> Arc<T> {
        self.inner.read().await.clone()
    }

    /// Install `next`, unless it is empty, the installed one is not, and
    /// `keep_previous_on_empty` is set. Returns whether `next` was installed.
    pub async fn replace(&self, next: T, keep_previous_on_empty: bool) -> bool {
        let mut guard = self.inner.write().await;
        if keep_previous_on_empty && next.is_empty() && !guard.is_empty() {
            return false;
        }
        *guard = Arc::new(next);
        true
    }
}

impl<T: Snapshot + Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Summary of one refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub records: usize,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub skipped_records: usize,
    pub installed: bool,
    pub duration_seconds: f64,
}

impl RefreshReport {
    pub fn new<R>(fetched: &PagedRecords<R>, installed: bool, started: Instant) -> Self {
        Self {
            records: fetched.len(),
            pages_fetched: fetched.pages_fetched,
            pages_failed: fetched.pages_failed,
            skipped_records: fetched.skipped_records,
            installed,
            duration_seconds: started.elapsed().as_secs_f64(),
        }
    }
}

/// A cache that can rebuild itself from its upstream.
#[async_trait]
pub trait Refreshable: Send + Sync {
    fn name(&self) -> &'static str;

    async fn refresh(&self) -> RefreshReport;
}
