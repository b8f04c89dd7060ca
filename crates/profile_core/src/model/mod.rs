//! Profile domain model.
//!
//! # Responsibility
//! - Define the canonical profile record held by the controller.
//! - Define partial-update payloads and the derived completion metric.
//!
//! # Invariants
//! - Every profile is keyed by a stable, non-nil `UserId`.
//! - `completion_percentage` is derived from required fields, never edited
//!   directly by form code.

pub mod completion;
pub mod profile;
