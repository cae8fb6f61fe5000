use async_trait::async_trait;
use chrono::{DateTime, Utc};
use showbot_common::Item;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use super::name_index::NameIndex;
use crate::module::fetcher::{PageSource, PagedEndpoint, PagedRecords, fetch_all_pages};
use crate::module::snapshot::{RefreshReport, Refreshable, Snapshot, SnapshotCell};

/// `items.json`: `{"page", "total_pages", "items": [...]}`
pub struct ItemsEndpoint;

impl PagedEndpoint for ItemsEndpoint {
    type Record = Item;

    const NAME: &'static str = "items";
    const RECORDS_FIELD: &'static str = "items";

    fn record_key(record: &Item) -> String {
        record.uuid.clone()
    }
}

/// Items and their name index from one refresh; never mutated once built.
#[derive(Debug, Default)]
pub struct ItemSnapshot {
    items: HashMap<String, Item>,
    names: NameIndex,
    fetched_at: Option<DateTime<Utc>>,
}

impl ItemSnapshot {
    /// Build the item map and the name index in one pass over the fetch.
    pub fn from_records(fetched: PagedRecords<Item>) -> Self {
        let mut names = NameIndex::new();
        for (uuid, item) in fetched.iter_ordered() {
            names.insert(&item.name, uuid);
        }

        Self {
            items: fetched.records,
            names,
            fetched_at: Some(Utc::now()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, uuid: &str) -> Option<&Item> {
        self.items.get(uuid)
    }

    pub fn names(&self) -> &NameIndex {
        &self.names
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Cards filed under `name`, in index order. Uuids missing from the
    /// item map are skipped.
    pub fn find_by_name(&self, name: &str) -> Vec<&Item> {
        self.names
            .get(name)
            .iter()
            .filter_map(|uuid| self.items.get(uuid))
            .collect()
    }
}

impl Snapshot for ItemSnapshot {
    fn record_count(&self) -> usize {
        self.len()
    }
}

pub struct ItemCache {
    source: Arc<dyn PageSource>,
    snapshot: SnapshotCell<ItemSnapshot>,
    keep_previous_on_empty: bool,
}

impl ItemCache {
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

    /// Fetch the whole catalog and install items and name index together.
    pub async fn refresh(&self) -> RefreshReport {
        let started = Instant::now();
        let fetched = fetch_all_pages::<ItemsEndpoint>(self.source.as_ref()).await;
        let mut report = RefreshReport::new(&fetched, false, started);

        let snapshot = ItemSnapshot::from_records(fetched);
        tracing::debug!(
            "Built item snapshot: {} items under {} names",
            snapshot.len(),
            snapshot.names().len()
        );

        report.installed = self.snapshot.replace(snapshot, self.keep_previous_on_empty).await;
        if report.installed {
            tracing::info!("Item data loaded successfully");
        } else {
            tracing::warn!(
                "Item refresh returned nothing ({} pages failed), keeping previous snapshot",
                report.pages_failed
            );
        }

        report
    }

    pub async fn snapshot(&self) -> Arc<ItemSnapshot> {
        self.snapshot.current().await
    }

    /// Every card for a player name (case- and accent-insensitive).
    pub async fn lookup_by_name(&self, name: &str) -> Vec<Item> {
        self.snapshot()
            .await
            .find_by_name(name)
            .into_iter()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Refreshable for ItemCache {
    fn name(&self) -> &'static str {
        ItemsEndpoint::NAME
    }

    async fn refresh(&self) -> RefreshReport {
        ItemCache::refresh(self).await
    }
}
