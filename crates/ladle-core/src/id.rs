//! Recipe identity generation.
//!
//! Identities are UUIDv7 strings: time-ordered, so lexicographic order over
//! assigned ids matches creation order. The store layer assigns an id exactly
//! once at insert time; it is never reassigned.

/// Generate a fresh recipe identity.
pub fn generate_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
