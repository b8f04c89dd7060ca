//! Derived completion metric.
//!
//! # Responsibility
//! - Compute `completion_percentage` from the required profile fields.
//! - Decide whether a stored percentage needs a correcting write.
//!
//! # Invariants
//! - Only the five `REQUIRED_FIELDS` contribute; each is worth 20 points.
//! - Computation is pure and deterministic.

use crate::model::profile::{ProfileField, ProfilePatch, ProfileRecord};

/// Fields that contribute to the completion metric, in display order.
pub const REQUIRED_FIELDS: [ProfileField; 5] = [
    ProfileField::Name,
    ProfileField::Region,
    ProfileField::BusinessType,
    ProfileField::TimeCommitment,
    ProfileField::CapitalLevel,
];

/// Computes the completion percentage of `record`.
///
/// A field counts when it is present and non-empty. Whitespace-only text
/// counts as filled.
pub fn calculate_completion(record: &ProfileRecord) -> u8 {
    let total = REQUIRED_FIELDS.len() as u32;
    let filled = REQUIRED_FIELDS
        .iter()
        .filter(|field| record.is_filled(**field))
        .count() as u32;

    // Round half up on integers; exact for five fields.
    ((filled * 100 + total / 2) / total) as u8
}

/// Returns the correcting patch when the stored percentage is stale.
///
/// `None` means the record is already consistent and no write is needed.
pub fn completion_correction(record: &ProfileRecord) -> Option<ProfilePatch> {
    let computed = calculate_completion(record);
    (computed != record.completion_percentage).then(|| ProfilePatch::completion(computed))
}

/// Snapshot of the required field values.
///
/// Two snapshots compare equal when none of the tracked fields changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFields {
    values: [Option<String>; 5],
}

impl TrackedFields {
    pub fn of(record: &ProfileRecord) -> Self {
        Self {
            values: REQUIRED_FIELDS.map(|field| record.text(field).map(str::to_string)),
        }
    }
}
