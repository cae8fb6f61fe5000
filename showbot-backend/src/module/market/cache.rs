use async_trait::async_trait;
use chrono::{DateTime, Utc};
use showbot_common::Listing;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::module::fetcher::{PageSource, PagedEndpoint, PagedRecords, fetch_all_pages};
use crate::module::snapshot::{RefreshReport, Refreshable, Snapshot, SnapshotCell};
use crate::module::text::normalize_name;

/// `listings.json`: `{"page", "total_pages", "listings": [...]}`
pub struct ListingsEndpoint;

impl PagedEndpoint for ListingsEndpoint {
    type Record = Listing;

    const NAME: &'static str = "listings";
    const RECORDS_FIELD: &'static str = "listings";

    fn record_key(record: &Listing) -> String {
        record.item.uuid.clone()
    }
}

/// Immutable set of listings from one refresh.
#[derive(Debug, Default)]
pub struct ListingSnapshot {
    listings: HashMap<String, Listing>,
    order: Vec<String>,
    fetched_at: Option<DateTime<Utc>>,
}

impl ListingSnapshot {
    pub fn from_records(fetched: PagedRecords<Listing>) -> Self {
        Self {
            listings: fetched.records,
            order: fetched.order,
            fetched_at: Some(Utc::now()),
        }
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn get(&self, item_uuid: &str) -> Option<&Listing> {
        self.listings.get(item_uuid)
    }

    /// When this snapshot was built; `None` for the startup placeholder.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Listings in fetch order.
    pub fn iter(&self) -> impl Iterator<Item = &Listing> {
        self.order.iter().filter_map(|uuid| self.listings.get(uuid))
    }

    /// Every listing whose card name equals `name` once both are normalized.
    pub fn find_by_name(&self, name: &str) -> Vec<Listing> {
        let wanted = normalize_name(name);
        self.iter()
            .filter(|listing| normalize_name(&listing.item.name) == wanted)
            .cloned()
            .collect()
    }
}

impl Snapshot for ListingSnapshot {
    fn record_count(&self) -> usize {
        self.len()
    }
}

pub struct ListingCache {
    source: Arc<dyn PageSource>,
    snapshot: SnapshotCell<ListingSnapshot>,
    keep_previous_on_empty: bool,
}

impl ListingCache {
    /// Empty cache; nothing is fetched until [`ListingCache::refresh`].
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self {
            source,
            snapshot: SnapshotCell::default(),
            keep_previous_on_empty: true,
        }
    }

    pub fn keep_previous_on_empty(mut self, keep: bool) -> Self {
        self.keep_previous_on_empty = keep;
        self
    }

    /// Fetch every listings page and swap the result in.
    ///
    /// Only the swap takes the lock; the fetch runs unlocked, so overlapping
    /// refreshes are possible and the last one to finish wins.
    pub async fn refresh(&self) -> RefreshReport {
        let started = Instant::now();
        let fetched = fetch_all_pages::<ListingsEndpoint>(self.source.as_ref()).await;

        let mut report = RefreshReport::new(&fetched, false, started);

        report.installed = self
            .snapshot
            .replace(ListingSnapshot::from_records(fetched), self.keep_previous_on_empty)
            .await;
        if !report.installed {
            tracing::warn!(
                "Listings refresh returned nothing ({} pages failed), keeping previous snapshot",
                report.pages_failed
            );
        }

        report
    }

    pub async fn snapshot(&self) -> Arc<ListingSnapshot> {
        self.snapshot.current().await
    }

    /// Listings for a player, case- and accent-insensitive exact name match.
    pub async fn lookup(&self, name: &str) -> Vec<Listing> {
        self.snapshot().await.find_by_name(name)
    }
}

#[async_trait]
impl Refreshable for ListingCache {
    fn name(&self) -> &'static str {
        ListingsEndpoint::NAME
    }

    async fn refresh(&self) -> RefreshReport {
        ListingCache::refresh(self).await
    }
}
