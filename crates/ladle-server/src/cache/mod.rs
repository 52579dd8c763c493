//! Caching layer for the recipe listing.
//!
//! [`backend`] is the raw key→blob store (local DashMap or Redis) and
//! [`listing`] the typed aggregate-key cache built on top of it. The cache
//! is an optimization, never a source of truth: every failure inside this
//! module degrades to a miss or a dropped write, and nothing here returns
//! an error to the caller.

pub mod backend;
pub mod listing;

pub use backend::{CacheBackend, CacheStats, CachedEntry};
pub use listing::{LISTING_KEY, ListingCache};
