pub mod captain;
pub mod catalog;
pub mod fetcher;
pub mod handler;
pub mod lookup;
pub mod market;
pub mod scheduled;
pub mod snapshot;
pub mod text;
