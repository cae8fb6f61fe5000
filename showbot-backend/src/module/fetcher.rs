///! Paged fetcher for the game's paginated JSON APIs
///!
///! Every endpoint answers `?page=N` with an envelope like
///! `{"page": 1, "per_page": 25, "total_pages": 40, "<records>": [...]}`.
///! [`fetch_all_pages`] walks the pages and merges the records into one map
///! keyed by record identity. A failed page is logged and contributes
///! nothing; the walk stops when the last page is reached or when it can no
///! longer tell where the last page is.

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 Showbot/1.0";

/// Why a single page contributed nothing.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error {0}")]
    Status(u16),

    #[error("invalid URL {url}: {reason}")]
    Url { url: String, reason: String },

    #[error("failed to decode page: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response has no `{0}` array")]
    MissingRecords(&'static str),
}

/// Anything that can hand out the raw body of page N (1-based).
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<String, FetchError>;

    /// Human-readable origin, for logs.
    fn describe(&self) -> String;
}

/// Describes one paged endpoint: where its records live in the envelope and
/// how a record is identified.
pub trait PagedEndpoint {
    type Record: DeserializeOwned + Send + Sync + 'static;

    const NAME: &'static str;
    const RECORDS_FIELD: &'static str;

    fn record_key(record: &Self::Record) -> String;
}

/// reqwest-backed [`PageSource`].
pub struct HttpPageSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPageSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Shared client with the per-request timeout applied.
    pub fn build_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")
    }

    /// Base URL with `page` set, replacing any `page` already present.
    pub fn page_url(&self, page: u32) -> Result<reqwest::Url, FetchError> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| FetchError::Url {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "page")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair("page", &page.to_string());

        Ok(url)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, page: u32) -> Result<String, FetchError> {
        let url = self.page_url(page)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Pagination fields of one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct PageEnvelope {
    page: Option<u32>,
    total_pages: Option<u32>,
    #[serde(flatten)]
    body: Map<String, Value>,
}

impl PageEnvelope {
    fn meta(&self) -> Option<PageMeta> {
        match (self.page, self.total_pages) {
            (Some(page), Some(total_pages)) => Some(PageMeta { page, total_pages }),
            _ => None,
        }
    }
}

/// Result of decoding one page.
#[derive(Debug)]
pub enum PageOutcome<R> {
    Fetched {
        meta: Option<PageMeta>,
        records: Vec<R>,
        /// Records present in the page that did not decode
        skipped: usize,
    },
    Failed {
        reason: FetchError,
        /// Pagination fields, when they could still be read
        meta: Option<PageMeta>,
    },
}

impl<R> PageOutcome<R> {
    pub fn meta(&self) -> Option<PageMeta> {
        match self {
            PageOutcome::Fetched { meta, .. } | PageOutcome::Failed { meta, .. } => *meta,
        }
    }
}

/// Decode a page body for endpoint `E`.
///
/// Pagination is read separately from the records so a page with a broken
/// records array can still move the walk forward. Records are decoded one
/// by one; the ones that fail are counted and dropped.
pub fn decode_page<E: PagedEndpoint>(body: &str) -> PageOutcome<E::Record> {
    let mut envelope: PageEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            return PageOutcome::Failed {
                reason: e.into(),
                meta: None,
            };
        }
    };
    let meta = envelope.meta();

    let raw = match envelope.body.remove(E::RECORDS_FIELD) {
        Some(Value::Array(raw)) => raw,
        _ => {
            return PageOutcome::Failed {
                reason: FetchError::MissingRecords(E::RECORDS_FIELD),
                meta,
            };
        }
    };

    let mut records = Vec::with_capacity(raw.len());
    let mut skipped = 0;
    for value in raw {
        match serde_json::from_value::<E::Record>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::debug!("Skipping malformed {} record: {}", E::NAME, e);
                skipped += 1;
            }
        }
    }

    PageOutcome::Fetched {
        meta,
        records,
        skipped,
    }
}

/// Everything collected from one walk over a paged endpoint.
#[derive(Debug)]
pub struct PagedRecords<R> {
    /// Identity → record; a later page overwrites an earlier duplicate
    pub records: HashMap<String, R>,
    /// Identities in the order they were first seen
    pub order: Vec<String>,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub skipped_records: usize,
}

impl<R> PagedRecords<R> {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
            pages_fetched: 0,
            pages_failed: 0,
            skipped_records: 0,
        }
    }

    pub fn insert(&mut self, key: String, record: R) {
        if self.records.insert(key.clone(), record).is_none() {
            self.order.push(key);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in first-seen order, each holding its last-written value.
    pub fn iter_ordered(&self) -> impl Iterator<Item = (&str, &R)> {
        self.order
            .iter()
            .filter_map(|key| self.records.get(key).map(|record| (key.as_str(), record)))
    }
}

impl<R> Default for PagedRecords<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk every page of `source` and merge the records of endpoint `E`.
///
/// The next page is one past the larger of the requested and the reported
/// page number, so the walk always moves forward. A page that fails without
/// pagination fields only lets the walk continue when a total page count is
/// already known from an earlier page.
pub async fn fetch_all_pages<E: PagedEndpoint>(source: &dyn PageSource) -> PagedRecords<E::Record> {
    let mut collected = PagedRecords::new();
    let mut page: u32 = 1;
    let mut known_total: Option<u32> = None;

    tracing::info!("Starting to load {} from {}", E::NAME, source.describe());

    loop {
        let outcome = match source.fetch_page(page).await {
            Ok(body) => decode_page::<E>(&body),
            Err(reason) => PageOutcome::Failed { reason, meta: None },
        };
        let meta = outcome.meta();

        match outcome {
            PageOutcome::Fetched { records, skipped, .. } => {
                tracing::debug!(
                    "Got {} page {}: {} records, {} skipped",
                    E::NAME,
                    page,
                    records.len(),
                    skipped
                );
                collected.pages_fetched += 1;
                collected.skipped_records += skipped;
                for record in records {
                    let key = E::record_key(&record);
                    collected.insert(key, record);
                }
            }
            PageOutcome::Failed { reason, .. } => {
                tracing::warn!("Error loading {} page {}: {}", E::NAME, page, reason);
                collected.pages_failed += 1;
            }
        }

        if let Some(meta) = meta {
            known_total = Some(meta.total_pages);
        }
        let Some(total_pages) = known_total else {
            tracing::warn!(
                "{} page {} carried no pagination, stopping",
                E::NAME,
                page
            );
            break;
        };

        let reported = meta.map_or(page, |m| m.page);
        let next = reported.max(page).saturating_add(1);
        if next > total_pages || next == page {
            break;
        }
        page = next;
    }

    tracing::info!(
        "Loaded {} {} from {} pages ({} failed, {} records skipped)",
        collected.len(),
        E::NAME,
        collected.pages_fetched,
        collected.pages_failed,
        collected.skipped_records
    );

    collected
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// In-memory page source: page number → body, anything else fails.
    pub(crate) struct FakeSource {
        pages: Mutex<HashMap<u32, Result<String, u16>>>,
        pub(crate) calls: AtomicU32,
    }

    impl FakeSource {
        pub(crate) fn new() -> Self {
            Self {
                pages: Mutex::new(HashMap::new()),
                calls: AtomicU32::new(0),
            }
        }

        pub(crate) fn with_page(self, page: u32, body: impl Into<String>) -> Self {
            self.pages.lock().unwrap().insert(page, Ok(body.into()));
            self
        }

        pub(crate) fn with_failure(self, page: u32, status: u16) -> Self {
            self.pages.lock().unwrap().insert(page, Err(status));
            self
        }

        pub(crate) fn set_page(&self, page: u32, body: impl Into<String>) {
            self.pages.lock().unwrap().insert(page, Ok(body.into()));
        }

        pub(crate) fn clear(&self) {
            self.pages.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl PageSource for FakeSource {
        async fn fetch_page(&self, page: u32) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.pages.lock().unwrap().get(&page) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(FetchError::Status(*status)),
                None => Err(FetchError::Status(404)),
            }
        }

        fn describe(&self) -> String {
            "fake".to_string()
        }
    }

    #[derive(Debug, Deserialize)]
    struct Row {
        id: String,
        value: i32,
    }

    struct Rows;

    impl PagedEndpoint for Rows {
        type Record = Row;
        const NAME: &'static str = "rows";
        const RECORDS_FIELD: &'static str = "rows";

        fn record_key(record: &Row) -> String {
            record.id.clone()
        }
    }

    fn page(page: u32, total: u32, rows: &[(&str, i32)]) -> String {
        let rows: Vec<Value> = rows
            .iter()
            .map(|(id, value)| serde_json::json!({"id": id, "value": value}))
            .collect();
        serde_json::json!({"page": page, "per_page": 25, "total_pages": total, "rows": rows}).to_string()
    }

    #[tokio::test]
    async fn test_merges_all_pages_last_write_wins() {
        let source = FakeSource::new()
            .with_page(1, page(1, 3, &[("a", 1), ("b", 1)]))
            .with_page(2, page(2, 3, &[("c", 2), ("a", 2)]))
            .with_page(3, page(3, 3, &[("d", 3), ("b", 3)]));

        let fetched = fetch_all_pages::<Rows>(&source).await;

        assert_eq!(fetched.len(), 4);
        assert_eq!(fetched.records["a"].value, 2);
        assert_eq!(fetched.records["b"].value, 3);
        assert_eq!(fetched.records["c"].value, 2);
        assert_eq!(fetched.records["d"].value, 3);
        assert_eq!(fetched.order, vec!["a", "b", "c", "d"]);
        assert_eq!(fetched.pages_fetched, 3);
        assert_eq!(fetched.pages_failed, 0);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_first_page_failure_terminates() {
        let source = FakeSource::new()
            .with_failure(1, 503)
            .with_page(2, page(2, 3, &[("c", 2)]));

        let fetched = fetch_all_pages::<Rows>(&source).await;

        assert!(fetched.is_empty());
        assert_eq!(fetched.pages_failed, 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_middle_page_failure_keeps_walking() {
        let source = FakeSource::new()
            .with_page(1, page(1, 3, &[("a", 1)]))
            .with_failure(2, 500)
            .with_page(3, page(3, 3, &[("c", 3)]));

        let fetched = fetch_all_pages::<Rows>(&source).await;

        assert_eq!(fetched.order, vec!["a", "c"]);
        assert_eq!(fetched.pages_fetched, 2);
        assert_eq!(fetched.pages_failed, 1);
    }

    #[tokio::test]
    async fn test_undecodable_page_without_pagination_stops() {
        let source = FakeSource::new()
            .with_page(1, "<html>maintenance</html>")
            .with_page(2, page(2, 2, &[("b", 2)]));

        let fetched = fetch_all_pages::<Rows>(&source).await;

        assert!(fetched.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_broken_records_still_advance() {
        let source = FakeSource::new()
            .with_page(1, r#"{"page": 1, "total_pages": 2, "rows": "oops"}"#)
            .with_page(2, page(2, 2, &[("b", 2)]));

        let fetched = fetch_all_pages::<Rows>(&source).await;

        assert_eq!(fetched.order, vec!["b"]);
        assert_eq!(fetched.pages_failed, 1);
    }

    #[tokio::test]
    async fn test_malformed_records_are_skipped() {
        let source = FakeSource::new().with_page(
            1,
            r#"{"page": 1, "total_pages": 1, "rows": [{"id": "a", "value": 1}, {"value": 2}, {"id": "c", "value": 3}]}"#,
        );

        let fetched = fetch_all_pages::<Rows>(&source).await;

        assert_eq!(fetched.order, vec!["a", "c"]);
        assert_eq!(fetched.skipped_records, 1);
    }

    #[tokio::test]
    async fn test_stale_page_number_cannot_loop() {
        // Server keeps answering "page 1 of 3" whatever is asked
        let body = page(1, 3, &[("a", 1)]);
        let source = FakeSource::new()
            .with_page(1, body.clone())
            .with_page(2, body.clone())
            .with_page(3, body);

        let fetched = fetch_all_pages::<Rows>(&source).await;

        assert_eq!(fetched.len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_page_url() {
        let client = reqwest::Client::new();
        let source = HttpPageSource::new(client.clone(), "https://example.com/apis/items.json?type=mlb_card&page=9");
        assert_eq!(
            source.page_url(2).unwrap().as_str(),
            "https://example.com/apis/items.json?type=mlb_card&page=2"
        );

        let bare = HttpPageSource::new(client.clone(), "https://example.com/apis/listings.json");
        assert_eq!(
            bare.page_url(1).unwrap().as_str(),
            "https://example.com/apis/listings.json?page=1"
        );

        let broken = HttpPageSource::new(client, "not a url");
        assert!(matches!(broken.page_url(1), Err(FetchError::Url { .. })));
    }
}
