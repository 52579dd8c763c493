//! In-memory recipe storage backend.
//!
//! Intended for development and tests. The table is an explicitly
//! synchronized map behind an async `RwLock`; handlers never touch a bare
//! shared collection. UUIDv7 identities make the map's key order match
//! creation order, so `list_all` needs no secondary index.

pub mod storage;

pub use storage::InMemoryStorage;
