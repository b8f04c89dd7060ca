//! Repository layer for the reference profile store.
//!
//! # Responsibility
//! - Define profile persistence contracts keyed by `UserId`.
//! - Keep SQLite query details out of the service/controller layers.
//!
//! # Invariants
//! - Writes run `ProfileRecord::validate()` before touching storage.
//! - Partial updates merge server-side and return the full record.

pub mod profile_repo;
