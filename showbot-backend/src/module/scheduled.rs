///! Scheduled task manager - owns the periodic cache refreshes
///!
///! - Listings: short interval (default every 60 seconds)
///! - Item catalog: long interval (default every 30 minutes)
///!
///! Each loop does its initial load inside its own task, then fires on a
///! fixed interval. Every tick spawns its refresh, so a slow fetch never
///! delays the next tick; overlapping refreshes of one cache only contend on
///! the final swap.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

use super::catalog::ItemCache;
use super::market::ListingCache;
use super::snapshot::Refreshable;

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for scheduled tasks
#[derive(Debug, Clone)]
pub struct ScheduledTaskConfig {
    pub listing_refresh_interval: Duration,
    pub item_refresh_interval: Duration,
    /// Load both caches immediately instead of waiting one interval
    pub perform_initial_update: bool,
}

impl Default for ScheduledTaskConfig {
    fn default() -> Self {
        Self {
            listing_refresh_interval: Duration::from_secs(60),
            item_refresh_interval: Duration::from_secs(30 * 60),
            perform_initial_update: true,
        }
    }
}

pub struct ScheduledTaskManager {
    config: ScheduledTaskConfig,
    listings: Arc<ListingCache>,
    items: Arc<ItemCache>,
    task_handles: Vec<JoinHandle<()>>,
}

impl ScheduledTaskManager {
    pub fn new(config: ScheduledTaskConfig, listings: Arc<ListingCache>, items: Arc<ItemCache>) -> Self {
        Self {
            config,
            listings,
            items,
            task_handles: Vec::new(),
        }
    }

    /// Start both refresh loops.
    pub fn start_all(&mut self) {
        tracing::info!("Starting scheduled task manager...");

        let listings: Arc<dyn Refreshable> = self.listings.clone();
        let items: Arc<dyn Refreshable> = self.items.clone();

        self.task_handles.push(Self::spawn_refresh_loop(
            listings,
            self.config.listing_refresh_interval,
            self.config.perform_initial_update,
        ));
        self.task_handles.push(Self::spawn_refresh_loop(
            items,
            self.config.item_refresh_interval,
            self.config.perform_initial_update,
        ));

        tracing::info!(
            "Started {} scheduled tasks (listings every {:?}, items every {:?})",
            self.task_handles.len(),
            self.config.listing_refresh_interval,
            self.config.item_refresh_interval
        );
    }

    fn spawn_refresh_loop(cache: Arc<dyn Refreshable>, period: Duration, perform_initial: bool) -> JoinHandle<()> {
        let period = period.max(MIN_INTERVAL);
        tracing::info!(
            "Scheduling {} refresh (interval: {:?}, initial: {})",
            cache.name(),
            period,
            perform_initial
        );

        tokio::spawn(async move {
            if perform_initial {
                tracing::info!("Performing initial {} load...", cache.name());
                Self::run_refresh(cache.as_ref()).await;
            }

            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let cache = cache.clone();
                tokio::spawn(async move {
                    Self::run_refresh(cache.as_ref()).await;
                });
            }
        })
    }

    async fn run_refresh(cache: &dyn Refreshable) {
        let report = cache.refresh().await;
        if report.installed {
            tracing::info!(
                "{} refresh: {} records, {} pages ({} failed), {:.2}s",
                cache.name(),
                report.records,
                report.pages_fetched,
                report.pages_failed,
                report.duration_seconds
            );
        } else {
            tracing::warn!(
                "{} refresh produced no data after {:.2}s, previous snapshot kept",
                cache.name(),
                report.duration_seconds
            );
        }
    }

    /// Stop the refresh loops. Refreshes already in flight run to completion.
    pub async fn shutdown(self) {
        tracing::info!("Shutting down scheduled task manager...");

        for handle in self.task_handles {
            handle.abort();
        }

        tracing::info!("All scheduled tasks stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::fetcher::tests::FakeSource;
    use std::sync::atomic::Ordering;

    fn listings_body() -> String {
        serde_json::json!({
            "page": 1,
            "total_pages": 1,
            "listings": [{"listing_name": "Mike Trout", "item": {"uuid": "t", "name": "Mike Trout"}}]
        })
        .to_string()
    }

    fn items_body() -> String {
        serde_json::json!({
            "page": 1,
            "total_pages": 1,
            "items": [{"uuid": "t", "name": "Mike Trout", "ovr": 91}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_initial_load_populates_both_caches() {
        let listings = Arc::new(ListingCache::new(Arc::new(FakeSource::new().with_page(1, listings_body()))));
        let items = Arc::new(ItemCache::new(Arc::new(FakeSource::new().with_page(1, items_body()))));

        let config = ScheduledTaskConfig {
            listing_refresh_interval: Duration::from_secs(3600),
            item_refresh_interval: Duration::from_secs(3600),
            perform_initial_update: true,
        };
        let mut manager = ScheduledTaskManager::new(config, listings.clone(), items.clone());
        manager.start_all();

        for _ in 0..100 {
            if listings.snapshot().await.len() == 1 && items.snapshot().await.len() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(listings.lookup("mike trout").await.len(), 1);
        assert_eq!(items.lookup_by_name("MIKE TROUT").await.len(), 1);
        manager.shutdown().await;
    }

    #[tokio::test]
    async fn test_refresh_repeats_on_interval() {
        let source = Arc::new(FakeSource::new().with_page(1, listings_body()));
        let listings = Arc::new(ListingCache::new(source.clone()));
        let items = Arc::new(ItemCache::new(Arc::new(FakeSource::new().with_page(1, items_body()))));

        let config = ScheduledTaskConfig {
            listing_refresh_interval: Duration::from_millis(10),
            item_refresh_interval: Duration::from_secs(3600),
            perform_initial_update: false,
        };
        let mut manager = ScheduledTaskManager::new(config, listings, items);
        manager.start_all();

        // Intervals are clamped to one second
        tokio::time::sleep(Duration::from_millis(2500)).await;
        manager.shutdown().await;

        assert!(source.calls.load(Ordering::SeqCst) >= 2);
    }
}
