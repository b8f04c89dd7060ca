//! Profile repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/patch/list over the `profiles` table.
//! - Perform the server-side merge of `ProfilePatch` values.
//!
//! # Invariants
//! - `apply_patch` reads, merges, validates and writes in one transaction.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::profile::{ProfilePatch, ProfileRecord, ProfileValidationError, UserId};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PROFILE_SELECT_SQL: &str = "SELECT
    user_id,
    name,
    region,
    business_type,
    time_commitment,
    capital_level,
    stealth_mode,
    low_tech_access,
    business_stage,
    target_market,
    revenue_goal,
    business_model,
    completion_percentage,
    updated_at
FROM profiles";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for profile persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ProfileValidationError),
    Db(DbError),
    NotFound(UserId),
    AlreadyExists(UserId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "profile not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "profile already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted profile data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::AlreadyExists(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ProfileValidationError> for RepoError {
    fn from(value: ProfileValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for profile records.
pub trait ProfileRepository {
    fn create_profile(&self, record: &ProfileRecord) -> RepoResult<()>;
    fn get_profile(&self, id: UserId) -> RepoResult<Option<ProfileRecord>>;
    fn apply_patch(&self, id: UserId, patch: &ProfilePatch) -> RepoResult<ProfileRecord>;
    fn list_profile_ids(&self) -> RepoResult<Vec<UserId>>;
}

/// SQLite-backed profile repository.
pub struct SqliteProfileRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProfileRepository for SqliteProfileRepository<'_> {
    fn create_profile(&self, record: &ProfileRecord) -> RepoResult<()> {
        record.validate()?;

        let changed = self.conn.execute(
            "INSERT INTO profiles (
                user_id,
                name,
                region,
                business_type,
                time_commitment,
                capital_level,
                stealth_mode,
                low_tech_access,
                business_stage,
                target_market,
                revenue_goal,
                business_model,
                completion_percentage
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(user_id) DO NOTHING;",
            params![
                record.id.to_string(),
                record.name.as_deref(),
                record.region.as_deref(),
                record.business_type.as_deref(),
                record.time_commitment.as_deref(),
                record.capital_level.as_deref(),
                record.stealth_mode,
                record.low_tech_access,
                record.business_stage.as_deref(),
                record.target_market.as_deref(),
                record.revenue_goal.as_deref(),
                record.business_model.as_deref(),
                record.completion_percentage,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::AlreadyExists(record.id));
        }
        Ok(())
    }

    fn get_profile(&self, id: UserId) -> RepoResult<Option<ProfileRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROFILE_SELECT_SQL} WHERE user_id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_profile_row(row)?));
        }

        Ok(None)
    }

    fn apply_patch(&self, id: UserId, patch: &ProfilePatch) -> RepoResult<ProfileRecord> {
        let tx = self.conn.unchecked_transaction()?;
        let scoped = SqliteProfileRepository::new(&tx);

        let current = scoped.get_profile(id)?.ok_or(RepoError::NotFound(id))?;
        let merged = patch.apply_to(&current);
        merged.validate()?;

        tx.execute(
            "UPDATE profiles
             SET
                name = ?1,
                region = ?2,
                business_type = ?3,
                time_commitment = ?4,
                capital_level = ?5,
                stealth_mode = ?6,
                low_tech_access = ?7,
                business_stage = ?8,
                target_market = ?9,
                revenue_goal = ?10,
                business_model = ?11,
                completion_percentage = ?12,
                updated_at = MAX(updated_at + 1, strftime('%s', 'now') * 1000)
             WHERE user_id = ?13;",
            params![
                merged.name.as_deref(),
                merged.region.as_deref(),
                merged.business_type.as_deref(),
                merged.time_commitment.as_deref(),
                merged.capital_level.as_deref(),
                merged.stealth_mode,
                merged.low_tech_access,
                merged.business_stage.as_deref(),
                merged.target_market.as_deref(),
                merged.revenue_goal.as_deref(),
                merged.business_model.as_deref(),
                merged.completion_percentage,
                id.to_string(),
            ],
        )?;

        let stored = scoped.get_profile(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("profile {id} missing after update read-back"))
        })?;
        tx.commit()?;
        Ok(stored)
    }

    fn list_profile_ids(&self) -> RepoResult<Vec<UserId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id FROM profiles ORDER BY created_at ASC, user_id ASC;")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        ids.iter().map(|raw| parse_user_id(raw)).collect()
    }
}

fn parse_profile_row(row: &Row<'_>) -> RepoResult<ProfileRecord> {
    let raw_id: String = row.get("user_id")?;
    let completion: i64 = row.get("completion_percentage")?;
    let completion_percentage = u8::try_from(completion).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid completion `{completion}` in profiles.completion_percentage"
        ))
    })?;

    let record = ProfileRecord {
        id: parse_user_id(&raw_id)?,
        name: row.get("name")?,
        region: row.get("region")?,
        business_type: row.get("business_type")?,
        time_commitment: row.get("time_commitment")?,
        capital_level: row.get("capital_level")?,
        stealth_mode: parse_flag(row, "stealth_mode")?,
        low_tech_access: parse_flag(row, "low_tech_access")?,
        business_stage: row.get("business_stage")?,
        target_market: row.get("target_market")?,
        revenue_goal: row.get("revenue_goal")?,
        business_model: row.get("business_model")?,
        completion_percentage,
        updated_at: row.get("updated_at")?,
    };
    record
        .validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(record)
}

fn parse_user_id(raw: &str) -> RepoResult<UserId> {
    Uuid::parse_str(raw).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{raw}` in profiles.user_id"))
    })
}

fn parse_flag(row: &Row<'_>, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in profiles.{column}"
        ))),
    }
}
