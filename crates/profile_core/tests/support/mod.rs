#![allow(dead_code)]

use async_trait::async_trait;
use profile_core::{
    ProfilePatch, ProfileRecord, ProfileService, ServiceError, ServiceResult, UserId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Scriptable in-memory profile service.
#[derive(Default)]
pub struct MockProfileService {
    records: Mutex<HashMap<UserId, ProfileRecord>>,
    patches: Mutex<Vec<ProfilePatch>>,
    fetch_gates: Mutex<HashMap<UserId, Arc<Notify>>>,
    update_gates: Mutex<HashMap<UserId, Arc<Notify>>>,
    fetch_calls: AtomicUsize,
    update_calls: AtomicUsize,
    fail_fetch: AtomicBool,
    fail_update: AtomicBool,
    empty_update: AtomicBool,
    clock: AtomicI64,
}

impl MockProfileService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, record: ProfileRecord) {
        self.records.lock().unwrap().insert(record.id, record);
    }

    pub fn stored(&self, id: UserId) -> Option<ProfileRecord> {
        self.records.lock().unwrap().get(&id).cloned()
    }

    /// Holds fetches for `id` until the returned handle is notified.
    pub fn hold_fetch(&self, id: UserId) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.fetch_gates
            .lock()
            .unwrap()
            .insert(id, Arc::clone(&gate));
        gate
    }

    /// Holds updates for `id` until the returned handle is notified.
    pub fn hold_update(&self, id: UserId) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.update_gates
            .lock()
            .unwrap()
            .insert(id, Arc::clone(&gate));
        gate
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_update(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    pub fn empty_update(&self, empty: bool) {
        self.empty_update.store(empty, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn patches(&self) -> Vec<ProfilePatch> {
        self.patches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileService for MockProfileService {
    async fn fetch_complete_profile(&self, user_id: UserId) -> ServiceResult<ProfileRecord> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.fetch_gates.lock().unwrap().remove(&user_id);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("connection refused".to_string()));
        }
        self.stored(user_id).ok_or(ServiceError::NotFound(user_id))
    }

    async fn apply_profile_update(
        &self,
        user_id: UserId,
        patch: &ProfilePatch,
    ) -> ServiceResult<Option<ProfileRecord>> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.patches.lock().unwrap().push(patch.clone());
        let gate = self.update_gates.lock().unwrap().remove(&user_id);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_update.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("write timed out".to_string()));
        }
        if self.empty_update.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let mut records = self.records.lock().unwrap();
        let current = records
            .get(&user_id)
            .ok_or(ServiceError::NotFound(user_id))?;
        let mut merged = patch.apply_to(current);
        merged.updated_at = Some(self.clock.fetch_add(1, Ordering::SeqCst) + 1);
        records.insert(user_id, merged.clone());
        Ok(Some(merged))
    }
}

pub fn record_with(
    id: UserId,
    name: &str,
    region: &str,
    business_type: &str,
    time_commitment: &str,
    capital_level: &str,
) -> ProfileRecord {
    let mut record = ProfileRecord::empty(id);
    record.name = Some(name.to_string());
    record.region = Some(region.to_string());
    record.business_type = Some(business_type.to_string());
    record.time_commitment = Some(time_commitment.to_string());
    record.capital_level = Some(capital_level.to_string());
    record
}
