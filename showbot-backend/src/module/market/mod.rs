///! Marketplace listings
///!
///! Short-interval snapshot of the community market, keyed by the uuid of
///! the card each listing sells.

mod cache;

pub use cache::{ListingCache, ListingSnapshot, ListingsEndpoint};
