///! Player lookups against whatever snapshots are currently installed.

use showbot_common::{Captain, Item, Listing};
use std::collections::HashSet;
use std::sync::Arc;

use super::captain::{CaptainSet, EligibilityRules};
use super::catalog::ItemCache;
use super::market::ListingCache;

pub struct LookupService {
    listings: Arc<ListingCache>,
    items: Arc<ItemCache>,
    captains: Arc<CaptainSet>,
    rules: EligibilityRules,
}

impl LookupService {
    pub fn new(listings: Arc<ListingCache>, items: Arc<ItemCache>, captains: Arc<CaptainSet>) -> Self {
        Self {
            listings,
            items,
            captains,
            rules: EligibilityRules::standard(),
        }
    }

    pub fn with_rules(mut self, rules: EligibilityRules) -> Self {
        self.rules = rules;
        self
    }

    pub async fn find_listings(&self, name: &str) -> Vec<Listing> {
        self.listings.lookup(name).await
    }

    pub async fn find_items(&self, name: &str) -> Vec<Item> {
        self.items.lookup_by_name(name).await
    }

    /// Captains any card of the named player qualifies for.
    ///
    /// Each captain appears once, in the order first qualified.
    pub async fn find_eligible_captains(&self, name: &str) -> Vec<Captain> {
        let snapshot = self.items.snapshot().await;
        let mut seen = HashSet::new();
        let mut eligible = Vec::new();

        for item in snapshot.find_by_name(name) {
            for captain in self.captains.iter() {
                if seen.contains(captain.uuid.as_str()) {
                    continue;
                }
                if let Some(rule) = self.rules.matching_rule(item, captain) {
                    tracing::debug!("{} ({}) fits captain {} via {}", item.name, item.uuid, captain.name, rule);
                    seen.insert(captain.uuid.as_str());
                    eligible.push(captain.clone());
                }
            }
        }

        eligible
    }
}
