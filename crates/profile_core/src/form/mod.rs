//! Render-free form contract for the business profile tab.
//!
//! # Responsibility
//! - Hold an editable draft seeded from the controller's cached record.
//! - Submit drafts as partial updates and report the outcome to a notifier.
//! - Coordinate field values across tabs through `FormRegistry`.
//!
//! # Invariants
//! - Form code never talks to the profile service directly.
//! - A failed save never resets the draft.

pub mod business_form;
pub mod notify;
pub mod options;
pub mod registry;
