//! Profile service contract and use-case orchestration.
//!
//! # Responsibility
//! - Define `ProfileService`, the remote record store the controller talks to.
//! - Host the controller that caches one user's profile over that service.
//! - Provide a SQLite-backed service for local use and tests.
//!
//! # Invariants
//! - Service updates return the entire resulting record, never a diff.
//! - Controller callers never see a panic or an untyped failure.

pub mod profile_controller;
pub mod sqlite_service;

use crate::db::DbError;
use crate::model::profile::{ProfilePatch, ProfileRecord, ProfileValidationError, UserId};
use crate::repo::profile_repo::RepoError;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure reported by a profile service.
#[derive(Debug)]
pub enum ServiceError {
    /// No record exists for the identity.
    NotFound(UserId),
    /// Service could not be reached or gave up.
    Unavailable(String),
    /// The merged record would violate record invariants.
    Validation(ProfileValidationError),
    /// Storage-level failure behind the service.
    Db(DbError),
    /// Stored or returned data could not be interpreted.
    InvalidData(String),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "profile not found: {id}"),
            Self::Unavailable(reason) => write!(f, "profile service unavailable: {reason}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid profile data: {message}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Unavailable(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::Db(err) => Self::Db(err),
            RepoError::AlreadyExists(id) => {
                Self::InvalidData(format!("profile already exists: {id}"))
            }
            RepoError::InvalidData(message) => Self::InvalidData(message),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Remote profile record store addressed by user id.
///
/// Implementations must be safe to share across tasks.
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Fetches the full record for `user_id`.
    async fn fetch_complete_profile(&self, user_id: UserId) -> ServiceResult<ProfileRecord>;

    /// Merges `patch` server-side and returns the full resulting record.
    ///
    /// `Ok(None)` means the write was acknowledged without a record body.
    async fn apply_profile_update(
        &self,
        user_id: UserId,
        patch: &ProfilePatch,
    ) -> ServiceResult<Option<ProfileRecord>>;
}
