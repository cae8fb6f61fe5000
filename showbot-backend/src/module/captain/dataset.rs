use anyhow::{Context, Result};
use serde::Deserialize;
use showbot_common::Captain;
use std::collections::HashMap;
use std::path::Path;

use crate::config::BackendConfig;
use crate::module::fetcher::{HttpPageSource, PageSource, PagedEndpoint, fetch_all_pages};

/// `captains.json`: `{"page", "per_page", "total_pages", "captains": [...]}`
pub struct CaptainsEndpoint;

impl PagedEndpoint for CaptainsEndpoint {
    type Record = Captain;

    const NAME: &'static str = "captains";
    const RECORDS_FIELD: &'static str = "captains";

    fn record_key(record: &Captain) -> String {
        record.uuid.clone()
    }
}

/// Accepted shapes of a captains dump on disk.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CaptainDump {
    Page { captains: Vec<Captain> },
    List(Vec<Captain>),
}

/// Static captain dataset, identity → captain, in load order.
#[derive(Debug, Clone, Default)]
pub struct CaptainSet {
    captains: Vec<Captain>,
    by_uuid: HashMap<String, usize>,
}

impl CaptainSet {
    /// A repeated uuid replaces the earlier captain in place.
    pub fn new(captains: impl IntoIterator<Item = Captain>) -> Self {
        let mut set = Self::default();
        for captain in captains {
            match set.by_uuid.get(&captain.uuid) {
                Some(&index) => set.captains[index] = captain,
                None => {
                    set.by_uuid.insert(captain.uuid.clone(), set.captains.len());
                    set.captains.push(captain);
                }
            }
        }
        set
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let dump: CaptainDump = serde_json::from_str(json).context("Failed to parse captains JSON")?;
        let captains = match dump {
            CaptainDump::Page { captains } | CaptainDump::List(captains) => captains,
        };
        Ok(Self::new(captains))
    }

    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read captains file {:?}", path))?;
        Self::from_json(&content)
    }

    /// Walk the paged captains endpoint once.
    pub async fn fetch(source: &dyn PageSource) -> Self {
        let fetched = fetch_all_pages::<CaptainsEndpoint>(source).await;
        Self::new(fetched.iter_ordered().map(|(_, captain)| captain.clone()))
    }

    pub fn get(&self, uuid: &str) -> Option<&Captain> {
        self.by_uuid.get(uuid).map(|&index| &self.captains[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Captain> {
        self.captains.iter()
    }

    pub fn len(&self) -> usize {
        self.captains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captains.is_empty()
    }
}

/// Load the configured captain dataset: the file first, then the endpoint.
/// Failures are logged and leave an empty set.
pub async fn load_captains(config: &BackendConfig, client: &reqwest::Client) -> CaptainSet {
    if let Some(path) = &config.captains_file {
        match CaptainSet::load_from_file(path).await {
            Ok(set) => {
                tracing::info!("Loaded {} captains from {}", set.len(), path);
                return set;
            }
            Err(e) => tracing::error!("Failed to load captains from {}: {:#}", path, e),
        }
    }

    if let Some(url) = &config.captains_url {
        let source = HttpPageSource::new(client.clone(), url.clone());
        let set = CaptainSet::fetch(&source).await;
        tracing::info!("Loaded {} captains from {}", set.len(), url);
        return set;
    }

    tracing::warn!("No captain dataset available, theme lookups will find nothing");
    CaptainSet::default()
}
