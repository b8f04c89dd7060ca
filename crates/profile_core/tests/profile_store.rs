use profile_core::db::migrations::{current_user_version, latest_version};
use profile_core::db::{open_db, open_db_in_memory, DbError};
use profile_core::{
    CompletionSync, LoadOutcome, ProfileController, ProfilePatch, ProfileRecord,
    ProfileRepository, ProfileService, ProfileValidationError, RepoError, ServiceError,
    SqliteProfileRepository, SqliteProfileService,
};
use std::sync::Arc;
use uuid::Uuid;

#[test]
fn migrations_are_applied_on_open() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());

    let table: String = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'profiles';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(table, "profiles");
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profiles.sqlite3");
    {
        let conn = open_db(&path).unwrap();
        conn.pragma_update(None, "user_version", latest_version() + 1)
            .unwrap();
    }

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion { db_version, latest_supported }
            if db_version == latest_version() + 1 && latest_supported == latest_version()
    ));
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::new(&conn);
    let id = Uuid::new_v4();
    let mut record = ProfileRecord::empty(id);
    record.name = Some("Ann".to_string());
    record.stealth_mode = true;
    record.completion_percentage = 20;

    repo.create_profile(&record).unwrap();
    let loaded = repo.get_profile(id).unwrap().unwrap();

    assert_eq!(loaded.id, id);
    assert_eq!(loaded.name.as_deref(), Some("Ann"));
    assert!(loaded.stealth_mode);
    assert!(!loaded.low_tech_access);
    assert_eq!(loaded.completion_percentage, 20);
    assert!(loaded.updated_at.is_some());
}

#[test]
fn create_rejects_duplicates_and_invalid_records() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::new(&conn);
    let record = ProfileRecord::empty(Uuid::new_v4());
    repo.create_profile(&record).unwrap();

    assert!(matches!(
        repo.create_profile(&record),
        Err(RepoError::AlreadyExists(id)) if id == record.id
    ));
    assert!(matches!(
        repo.create_profile(&ProfileRecord::empty(Uuid::nil())),
        Err(RepoError::Validation(ProfileValidationError::NilUserId))
    ));
}

#[test]
fn get_missing_profile_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::new(&conn);
    assert_eq!(repo.get_profile(Uuid::new_v4()).unwrap(), None);
}

#[test]
fn apply_patch_merges_server_side_and_bumps_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::new(&conn);
    let id = Uuid::new_v4();
    let mut record = ProfileRecord::empty(id);
    record.name = Some("Ann".to_string());
    repo.create_profile(&record).unwrap();
    let before = repo.get_profile(id).unwrap().unwrap();

    let patch = ProfilePatch {
        business_type: Some("Retail".to_string()),
        low_tech_access: Some(true),
        ..ProfilePatch::default()
    };
    let stored = repo.apply_patch(id, &patch).unwrap();

    assert_eq!(stored.name.as_deref(), Some("Ann"));
    assert_eq!(stored.business_type.as_deref(), Some("Retail"));
    assert!(stored.low_tech_access);
    assert!(stored.updated_at > before.updated_at);
    assert_eq!(repo.get_profile(id).unwrap().unwrap(), stored);
}

#[test]
fn apply_patch_rejects_missing_profile_and_invalid_completion() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::new(&conn);
    let id = Uuid::new_v4();

    assert!(matches!(
        repo.apply_patch(id, &ProfilePatch::completion(20)),
        Err(RepoError::NotFound(missing)) if missing == id
    ));

    repo.create_profile(&ProfileRecord::empty(id)).unwrap();
    assert!(matches!(
        repo.apply_patch(id, &ProfilePatch::completion(120)),
        Err(RepoError::Validation(ProfileValidationError::CompletionOutOfRange(120)))
    ));
    assert_eq!(
        repo.get_profile(id).unwrap().unwrap().completion_percentage,
        0
    );
}

#[test]
fn list_profile_ids_returns_all_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::new(&conn);
    let ids = [Uuid::new_v4(), Uuid::new_v4()];
    for id in ids {
        repo.create_profile(&ProfileRecord::empty(id)).unwrap();
    }

    let mut listed = repo.list_profile_ids().unwrap();
    listed.sort();
    let mut expected = ids.to_vec();
    expected.sort();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn service_reports_not_found_for_unknown_user() {
    let service = SqliteProfileService::in_memory().unwrap();
    let id = Uuid::new_v4();

    let err = service.fetch_complete_profile(id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(missing) if missing == id));
}

#[tokio::test]
async fn ensure_profile_creates_once_with_completion() {
    let service = SqliteProfileService::in_memory().unwrap();
    let id = Uuid::new_v4();

    let created = service
        .ensure_profile(id, Some("Ann".to_string()))
        .await
        .unwrap();
    assert_eq!(created.completion_percentage, 20);

    let again = service
        .ensure_profile(id, Some("Someone else".to_string()))
        .await
        .unwrap();
    assert_eq!(again, created);
    assert_eq!(service.list_profile_ids().await.unwrap(), vec![id]);
}

#[tokio::test]
async fn service_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profiles.sqlite3");
    let id = Uuid::new_v4();
    {
        let service = SqliteProfileService::open(&path).unwrap();
        service.ensure_profile(id, None).await.unwrap();
        service
            .apply_profile_update(
                id,
                &ProfilePatch {
                    region: Some("EU".to_string()),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap();
    }

    let reopened = SqliteProfileService::open(&path).unwrap();
    let record = reopened.fetch_complete_profile(id).await.unwrap();
    assert_eq!(record.region.as_deref(), Some("EU"));
}

#[tokio::test]
async fn controller_round_trip_over_sqlite_store() {
    let service = Arc::new(SqliteProfileService::in_memory().unwrap());
    let id = Uuid::new_v4();
    service
        .ensure_profile(id, Some("Ann".to_string()))
        .await
        .unwrap();
    let controller = ProfileController::new(Arc::clone(&service));

    assert!(matches!(
        controller.load(Some(id)).await.unwrap(),
        LoadOutcome::Loaded(_)
    ));
    controller
        .update(ProfilePatch {
            region: Some("EU".to_string()),
            business_type: Some("Retail".to_string()),
            ..ProfilePatch::default()
        })
        .await
        .unwrap();
    let sync = controller.sync_completion().await.unwrap();

    assert!(matches!(sync, CompletionSync::Corrected(ref record) if record.completion_percentage == 60));
    let stored = service.fetch_complete_profile(id).await.unwrap();
    assert_eq!(Some(stored), controller.profile());
}
