//! Cached profile state over a `ProfileService`.
//!
//! # Responsibility
//! - Own the client-side copy of the current user's profile record.
//! - Mediate loads and partial updates against the profile service.
//! - Expose the completion correction as an explicit, idempotent hook.
//!
//! # Invariants
//! - The cached record is only ever replaced wholesale by a service response.
//! - Responses from a superseded load generation are never applied.
//! - A failed update keeps the previously cached record.
//! - The busy count is released on success, failure and cancellation.
//! - The state mutex is never held across an await point.

use crate::model::completion::{calculate_completion, completion_correction, TrackedFields};
use crate::model::profile::{ProfilePatch, ProfileRecord, UserId};
use crate::service::{ProfileService, ServiceError};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Controller-level failure handed back to callers.
#[derive(Debug)]
pub enum ProfileError {
    /// Operation attempted without a signed-in identity.
    NoIdentity,
    /// The profile service failed.
    ServiceFailure(ServiceError),
    /// The service acknowledged an update without returning the record.
    EmptyResponse,
}

impl Display for ProfileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoIdentity => write!(f, "No user found"),
            Self::ServiceFailure(err) => write!(f, "{err}"),
            Self::EmptyResponse => write!(f, "Failed to update profile"),
        }
    }
}

impl Error for ProfileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ServiceFailure(err) => Some(err),
            Self::NoIdentity | Self::EmptyResponse => None,
        }
    }
}

impl From<ServiceError> for ProfileError {
    fn from(value: ServiceError) -> Self {
        Self::ServiceFailure(value)
    }
}

/// Lifecycle phase of the cached profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilePhase {
    /// No identity or nothing requested yet.
    Idle,
    Loading,
    Ready,
    Saving,
    /// Last operation failed; see `ProfileController::error`.
    Error,
}

/// Result of a `load` call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No identity was given; state was cleared.
    Empty,
    /// Record fetched and cached.
    Loaded(ProfileRecord),
    /// A newer load or identity change won; the response was dropped.
    Superseded,
}

/// Result of the completion hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionSync {
    /// Nothing cached.
    NoProfile,
    /// Required fields unchanged since the last evaluation.
    Unchanged,
    /// Stored percentage already matches the computed one.
    InSync(u8),
    /// A correcting update was written; carries the returned record.
    Corrected(ProfileRecord),
}

/// Point-in-time view of controller state for presentation code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSnapshot {
    pub profile: Option<ProfileRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub phase: ProfilePhase,
}

#[derive(Debug)]
struct ControllerState {
    identity: Option<UserId>,
    /// Bumped by every load and identity change.
    generation: u64,
    profile: Option<ProfileRecord>,
    phase: ProfilePhase,
    error: Option<String>,
    in_flight: usize,
    /// Required-field snapshot last seen by `sync_completion`.
    evaluated: Option<TrackedFields>,
}

impl ControllerState {
    fn new() -> Self {
        Self {
            identity: None,
            generation: 0,
            profile: None,
            phase: ProfilePhase::Idle,
            error: None,
            in_flight: 0,
            evaluated: None,
        }
    }

    fn resting_phase(&self) -> ProfilePhase {
        if self.profile.is_some() {
            ProfilePhase::Ready
        } else {
            ProfilePhase::Idle
        }
    }
}

/// Releases one in-flight slot when dropped.
struct BusyGuard<'a> {
    state: &'a Mutex<ControllerState>,
}

impl<'a> BusyGuard<'a> {
    fn enter(state: &'a Mutex<ControllerState>, guard: &mut ControllerState) -> Self {
        guard.in_flight += 1;
        Self { state }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.in_flight == 0
            && matches!(state.phase, ProfilePhase::Loading | ProfilePhase::Saving)
        {
            // Operation future was dropped before it completed.
            state.phase = state.resting_phase();
        }
    }
}

/// Client-side owner of one user's profile record.
pub struct ProfileController<S: ProfileService + ?Sized> {
    service: Arc<S>,
    state: Mutex<ControllerState>,
}

impl<S: ProfileService + ?Sized> ProfileController<S> {
    /// Creates an idle controller over `service`.
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            state: Mutex::new(ControllerState::new()),
        }
    }

    /// Loads the profile for `identity`, making it the current identity.
    ///
    /// # Contract
    /// - `None` clears identity and cache without calling the service.
    /// - Switching to a different identity drops the previous user's record
    ///   immediately.
    /// - On failure the cache is cleared and the error text recorded.
    /// - Responses overtaken by a newer load return `Superseded`.
    pub async fn load(&self, identity: Option<UserId>) -> Result<LoadOutcome, ProfileError> {
        let Some(user_id) = identity else {
            let mut state = self.state.lock();
            state.identity = None;
            state.generation += 1;
            state.profile = None;
            state.evaluated = None;
            state.phase = ProfilePhase::Idle;
            debug!("event=profile_load module=controller status=skipped reason=no_identity");
            return Ok(LoadOutcome::Empty);
        };

        let (ticket, _busy) = {
            let mut state = self.state.lock();
            if state.identity != Some(user_id) {
                state.profile = None;
                state.evaluated = None;
            }
            state.identity = Some(user_id);
            state.generation += 1;
            state.phase = ProfilePhase::Loading;
            state.error = None;
            let busy = BusyGuard::enter(&self.state, &mut state);
            (state.generation, busy)
        };

        let started_at = Instant::now();
        info!("event=profile_load module=controller status=start user_id={user_id}");
        let result = self.service.fetch_complete_profile(user_id).await;

        let mut state = self.state.lock();
        if state.generation != ticket {
            debug!(
                "event=profile_load module=controller status=stale user_id={user_id} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            return Ok(LoadOutcome::Superseded);
        }

        match result {
            Ok(record) => {
                state.profile = Some(record.clone());
                state.phase = ProfilePhase::Ready;
                info!(
                    "event=profile_load module=controller status=ok user_id={user_id} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(LoadOutcome::Loaded(record))
            }
            Err(err) => {
                state.profile = None;
                state.evaluated = None;
                state.error = Some(err.to_string());
                state.phase = ProfilePhase::Error;
                error!(
                    "event=profile_load module=controller status=error user_id={user_id} duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(ProfileError::ServiceFailure(err))
            }
        }
    }

    /// Re-fetches the profile for the current identity.
    pub async fn reload(&self) -> Result<LoadOutcome, ProfileError> {
        let identity = self.identity();
        self.load(identity).await
    }

    /// Sends a partial update and caches the full record the service returns.
    ///
    /// # Contract
    /// - Without an identity returns `NoIdentity` and makes no service call.
    /// - The cache becomes exactly the returned record; no client-side merge.
    /// - On failure the cached record is kept; error text and phase change.
    /// - A response that lands after a newer load is returned but not cached.
    pub async fn update(&self, patch: ProfilePatch) -> Result<ProfileRecord, ProfileError> {
        let target = {
            let state = self.state.lock();
            state.identity.map(|user_id| (user_id, state.generation))
        };
        let Some((user_id, ticket)) = target else {
            warn!("event=profile_update module=controller status=rejected reason=no_identity");
            return Err(ProfileError::NoIdentity);
        };
        self.update_for(user_id, ticket, patch).await
    }

    /// Writes `patch` for `user_id`, caching the response only while
    /// `ticket` is still the current generation.
    async fn update_for(
        &self,
        user_id: UserId,
        ticket: u64,
        patch: ProfilePatch,
    ) -> Result<ProfileRecord, ProfileError> {
        let _busy = {
            let mut state = self.state.lock();
            if state.generation == ticket {
                state.phase = ProfilePhase::Saving;
                state.error = None;
            }
            BusyGuard::enter(&self.state, &mut state)
        };

        let fields = patch
            .fields()
            .iter()
            .map(|field| field.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let started_at = Instant::now();
        info!(
            "event=profile_update module=controller status=start user_id={user_id} fields={fields}"
        );
        let result = self.service.apply_profile_update(user_id, &patch).await;

        let mut state = self.state.lock();
        let current = state.generation == ticket;
        let outcome = match result {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(ProfileError::EmptyResponse),
            Err(err) => Err(ProfileError::ServiceFailure(err)),
        };

        match &outcome {
            Ok(record) => {
                if current {
                    state.profile = Some(record.clone());
                    state.phase = ProfilePhase::Ready;
                }
                info!(
                    "event=profile_update module=controller status={} user_id={user_id} duration_ms={}",
                    if current { "ok" } else { "stale" },
                    started_at.elapsed().as_millis()
                );
            }
            Err(err) => {
                if current {
                    state.error = Some(err.to_string());
                    state.phase = ProfilePhase::Error;
                }
                error!(
                    "event=profile_update module=controller status=error user_id={user_id} duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
            }
        }
        outcome
    }

    /// Completion percentage of `record`. Pure.
    pub fn completion(record: &ProfileRecord) -> u8 {
        calculate_completion(record)
    }

    /// Post-load/post-update hook that keeps the stored completion honest.
    ///
    /// Callers run this after observing a record replacement. It evaluates
    /// only when required fields changed since the previous evaluation and
    /// writes only when the stored percentage differs from the computed one,
    /// so calling it again after its own correction is a no-op. The write
    /// targets the user whose record was evaluated, even if the identity
    /// changes before it lands.
    pub async fn sync_completion(&self) -> Result<CompletionSync, ProfileError> {
        let (patch, tracked, user_id, ticket) = {
            let mut state = self.state.lock();
            let Some(profile) = state.profile.as_ref() else {
                return Ok(CompletionSync::NoProfile);
            };
            let user_id = profile.id;
            let tracked = TrackedFields::of(profile);
            if state.evaluated.as_ref() == Some(&tracked) {
                return Ok(CompletionSync::Unchanged);
            }
            let correction = completion_correction(profile);
            let stored = profile.completion_percentage;
            state.evaluated = Some(tracked.clone());
            match correction {
                None => return Ok(CompletionSync::InSync(stored)),
                Some(patch) => (patch, tracked, user_id, state.generation),
            }
        };

        debug!(
            "event=completion_sync module=controller status=start target={:?}",
            patch.completion_percentage
        );
        match self.update_for(user_id, ticket, patch).await {
            Ok(record) => Ok(CompletionSync::Corrected(record)),
            Err(err) => {
                let mut state = self.state.lock();
                if state.evaluated.as_ref() == Some(&tracked) {
                    state.evaluated = None;
                }
                Err(err)
            }
        }
    }

    /// Current identity, if any.
    pub fn identity(&self) -> Option<UserId> {
        self.state.lock().identity
    }

    /// Cached record, if any.
    pub fn profile(&self) -> Option<ProfileRecord> {
        self.state.lock().profile.clone()
    }

    /// Whether a load or update is in flight.
    pub fn loading(&self) -> bool {
        self.state.lock().in_flight > 0
    }

    /// Description of the last failure, cleared when a new operation starts.
    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn phase(&self) -> ProfilePhase {
        self.state.lock().phase
    }

    /// Consistent copy of everything presentation code reads.
    pub fn snapshot(&self) -> ProfileSnapshot {
        let state = self.state.lock();
        ProfileSnapshot {
            profile: state.profile.clone(),
            loading: state.in_flight > 0,
            error: state.error.clone(),
            phase: state.phase,
        }
    }
}
