//! SQLite-backed `ProfileService`.
//!
//! # Responsibility
//! - Serve fetch/update calls from a local `profiles` table.
//! - Keep blocking SQLite work off async executor threads.
//!
//! # Invariants
//! - One connection, serialized by a mutex; calls never interleave.
//! - Update responses are read back from storage after the write commits.

use crate::db::{open_db, open_db_in_memory};
use crate::model::completion::calculate_completion;
use crate::model::profile::{ProfilePatch, ProfileRecord, UserId};
use crate::repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
use crate::service::{ProfileService, ServiceError, ServiceResult};
use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Profile service over a single SQLite connection.
#[derive(Clone)]
pub struct SqliteProfileService {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteProfileService {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> ServiceResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> ServiceResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Returns the profile for `user_id`, creating an empty one when missing.
    ///
    /// A newly created record gets its completion computed from `name`.
    pub async fn ensure_profile(
        &self,
        user_id: UserId,
        name: Option<String>,
    ) -> ServiceResult<ProfileRecord> {
        self.run("ensure_profile", move |conn| {
            let repo = SqliteProfileRepository::new(conn);
            if let Some(existing) = repo.get_profile(user_id)? {
                return Ok(existing);
            }

            let mut record = ProfileRecord::empty(user_id);
            record.name = name;
            record.completion_percentage = calculate_completion(&record);
            repo.create_profile(&record)?;
            repo.get_profile(user_id)?.ok_or_else(|| {
                ServiceError::InvalidData(format!("profile {user_id} missing after create"))
            })
        })
        .await
    }

    /// Lists stored profile ids in creation order.
    pub async fn list_profile_ids(&self) -> ServiceResult<Vec<UserId>> {
        self.run("list_profiles", |conn| {
            Ok(SqliteProfileRepository::new(conn).list_profile_ids()?)
        })
        .await
    }

    async fn run<T, F>(&self, operation: &'static str, work: F) -> ServiceResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> ServiceResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let started_at = Instant::now();
        let joined = tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            work(&guard)
        })
        .await;

        let result = joined.map_err(|err| {
            ServiceError::Unavailable(format!("{operation} worker failed: {err}"))
        })?;
        match &result {
            Ok(_) => debug!(
                "event=store_call module=store status=ok op={operation} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=store_call module=store status=error op={operation} duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

#[async_trait]
impl ProfileService for SqliteProfileService {
    async fn fetch_complete_profile(&self, user_id: UserId) -> ServiceResult<ProfileRecord> {
        self.run("fetch_profile", move |conn| {
            SqliteProfileRepository::new(conn)
                .get_profile(user_id)?
                .ok_or(ServiceError::NotFound(user_id))
        })
        .await
    }

    async fn apply_profile_update(
        &self,
        user_id: UserId,
        patch: &ProfilePatch,
    ) -> ServiceResult<Option<ProfileRecord>> {
        let patch = patch.clone();
        self.run("apply_update", move |conn| {
            let stored = SqliteProfileRepository::new(conn).apply_patch(user_id, &patch)?;
            Ok(Some(stored))
        })
        .await
    }
}
