///! Item catalog
///!
///! Long-interval snapshot of every card in the game plus a name index,
///! built from the same fetch and installed together.

mod cache;
mod name_index;

pub use cache::{ItemCache, ItemSnapshot, ItemsEndpoint};
pub use name_index::NameIndex;
