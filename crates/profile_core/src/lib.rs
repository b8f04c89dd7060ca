//! Core profile state for the business profile screen.
//! Owns the cached profile record, its derived completion metric and the
//! contract the profile tabs use to edit and save it.

pub mod config;
pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, LoggingConfig, ProfileConfig};
pub use form::business_form::{
    BusinessProfileDraft, BusinessProfileForm, FormEditError, FormSaveError,
    BUSINESS_PROFILE_FORM_ID,
};
pub use form::notify::{LogNotifier, Notifier};
pub use form::options::options_for;
pub use form::registry::{
    FieldDescriptor, FieldKind, FieldValue, FormRegistry, FormRegistryError,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::completion::{
    calculate_completion, completion_correction, TrackedFields, REQUIRED_FIELDS,
};
pub use model::profile::{
    ProfileField, ProfilePatch, ProfileRecord, ProfileValidationError, UserId,
};
pub use repo::profile_repo::{
    ProfileRepository, RepoError, RepoResult, SqliteProfileRepository,
};
pub use service::profile_controller::{
    CompletionSync, LoadOutcome, ProfileController, ProfileError, ProfilePhase, ProfileSnapshot,
};
pub use service::sqlite_service::SqliteProfileService;
pub use service::{ProfileService, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
