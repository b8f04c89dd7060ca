//! Profile record and partial-update model.
//!
//! # Responsibility
//! - Define the full record returned by the profile service.
//! - Define `ProfilePatch`, the field-subset payload merged server-side.
//! - Provide stable field names for logging and form registration.
//!
//! # Invariants
//! - `id` is never nil.
//! - `completion_percentage` stays within `0..=100`.
//! - Text fields treat `None` and `Some("")` alike as "not filled".

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque reference to an authenticated user, used as the profile key.
pub type UserId = Uuid;

/// Upper bound for `completion_percentage`.
pub const MAX_COMPLETION: u8 = 100;

/// Validation errors for profile records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileValidationError {
    /// Profile identity is the nil UUID.
    NilUserId,
    /// Stored completion is above 100.
    CompletionOutOfRange(u8),
}

impl Display for ProfileValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUserId => write!(f, "profile id must not be nil"),
            Self::CompletionOutOfRange(value) => write!(
                f,
                "completion_percentage ({value}) must be <= {MAX_COMPLETION}"
            ),
        }
    }
}

impl Error for ProfileValidationError {}

/// Every field a profile record carries, by its stable wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProfileField {
    Name,
    Region,
    BusinessType,
    TimeCommitment,
    CapitalLevel,
    StealthMode,
    LowTechAccess,
    BusinessStage,
    TargetMarket,
    RevenueGoal,
    BusinessModel,
    CompletionPercentage,
}

impl ProfileField {
    /// All fields in record order.
    pub const ALL: [ProfileField; 12] = [
        Self::Name,
        Self::Region,
        Self::BusinessType,
        Self::TimeCommitment,
        Self::CapitalLevel,
        Self::StealthMode,
        Self::LowTechAccess,
        Self::BusinessStage,
        Self::TargetMarket,
        Self::RevenueGoal,
        Self::BusinessModel,
        Self::CompletionPercentage,
    ];

    /// Returns the snake_case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Region => "region",
            Self::BusinessType => "business_type",
            Self::TimeCommitment => "time_commitment",
            Self::CapitalLevel => "capital_level",
            Self::StealthMode => "stealth_mode",
            Self::LowTechAccess => "low_tech_access",
            Self::BusinessStage => "business_stage",
            Self::TargetMarket => "target_market",
            Self::RevenueGoal => "revenue_goal",
            Self::BusinessModel => "business_model",
            Self::CompletionPercentage => "completion_percentage",
        }
    }

    /// Parses a wire name. Returns `None` for unknown names.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == value)
    }

    /// Whether the field holds a boolean flag rather than text.
    pub fn is_flag(self) -> bool {
        matches!(self, Self::StealthMode | Self::LowTechAccess)
    }
}

impl Display for ProfileField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full profile record as returned by the profile service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Identity this record belongs to.
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub time_commitment: Option<String>,
    #[serde(default)]
    pub capital_level: Option<String>,
    #[serde(default)]
    pub stealth_mode: bool,
    #[serde(default)]
    pub low_tech_access: bool,
    #[serde(default)]
    pub business_stage: Option<String>,
    #[serde(default)]
    pub target_market: Option<String>,
    #[serde(default)]
    pub revenue_goal: Option<String>,
    #[serde(default)]
    pub business_model: Option<String>,
    /// Derived metric; see `model::completion`.
    #[serde(default)]
    pub completion_percentage: u8,
    /// Last store write in epoch milliseconds. Maintained by the store.
    #[serde(default)]
    pub updated_at: Option<i64>,
}

impl ProfileRecord {
    /// Creates an empty record for `id`.
    ///
    /// Does not validate; callers writing to storage go through `validate()`.
    pub fn empty(id: UserId) -> Self {
        Self {
            id,
            name: None,
            region: None,
            business_type: None,
            time_commitment: None,
            capital_level: None,
            stealth_mode: false,
            low_tech_access: false,
            business_stage: None,
            target_market: None,
            revenue_goal: None,
            business_model: None,
            completion_percentage: 0,
            updated_at: None,
        }
    }

    /// Checks record invariants.
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        if self.id.is_nil() {
            return Err(ProfileValidationError::NilUserId);
        }
        if self.completion_percentage > MAX_COMPLETION {
            return Err(ProfileValidationError::CompletionOutOfRange(
                self.completion_percentage,
            ));
        }
        Ok(())
    }

    /// Returns the text value of `field`.
    ///
    /// Flag fields and `completion_percentage` have no text form and yield
    /// `None`.
    pub fn text(&self, field: ProfileField) -> Option<&str> {
        let value = match field {
            ProfileField::Name => &self.name,
            ProfileField::Region => &self.region,
            ProfileField::BusinessType => &self.business_type,
            ProfileField::TimeCommitment => &self.time_commitment,
            ProfileField::CapitalLevel => &self.capital_level,
            ProfileField::BusinessStage => &self.business_stage,
            ProfileField::TargetMarket => &self.target_market,
            ProfileField::RevenueGoal => &self.revenue_goal,
            ProfileField::BusinessModel => &self.business_model,
            ProfileField::StealthMode
            | ProfileField::LowTechAccess
            | ProfileField::CompletionPercentage => return None,
        };
        value.as_deref()
    }

    /// Whether a text field holds a non-empty value.
    pub fn is_filled(&self, field: ProfileField) -> bool {
        self.text(field).is_some_and(|value| !value.is_empty())
    }
}

/// Partial update payload. Absent fields are left untouched by the merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_commitment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stealth_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_tech_access: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_market: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_percentage: Option<u8>,
}

impl ProfilePatch {
    /// Patch carrying only a completion percentage.
    pub fn completion(percentage: u8) -> Self {
        Self {
            completion_percentage: Some(percentage),
            ..Self::default()
        }
    }

    /// Whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Names of the fields present in this patch, in record order.
    pub fn fields(&self) -> Vec<ProfileField> {
        let present = [
            (ProfileField::Name, self.name.is_some()),
            (ProfileField::Region, self.region.is_some()),
            (ProfileField::BusinessType, self.business_type.is_some()),
            (ProfileField::TimeCommitment, self.time_commitment.is_some()),
            (ProfileField::CapitalLevel, self.capital_level.is_some()),
            (ProfileField::StealthMode, self.stealth_mode.is_some()),
            (ProfileField::LowTechAccess, self.low_tech_access.is_some()),
            (ProfileField::BusinessStage, self.business_stage.is_some()),
            (ProfileField::TargetMarket, self.target_market.is_some()),
            (ProfileField::RevenueGoal, self.revenue_goal.is_some()),
            (ProfileField::BusinessModel, self.business_model.is_some()),
            (
                ProfileField::CompletionPercentage,
                self.completion_percentage.is_some(),
            ),
        ];
        present
            .into_iter()
            .filter_map(|(field, is_set)| is_set.then_some(field))
            .collect()
    }

    /// Sets one text field by name. Returns `false` for flag/numeric fields.
    pub fn set_text(&mut self, field: ProfileField, value: impl Into<String>) -> bool {
        let slot = match field {
            ProfileField::Name => &mut self.name,
            ProfileField::Region => &mut self.region,
            ProfileField::BusinessType => &mut self.business_type,
            ProfileField::TimeCommitment => &mut self.time_commitment,
            ProfileField::CapitalLevel => &mut self.capital_level,
            ProfileField::BusinessStage => &mut self.business_stage,
            ProfileField::TargetMarket => &mut self.target_market,
            ProfileField::RevenueGoal => &mut self.revenue_goal,
            ProfileField::BusinessModel => &mut self.business_model,
            ProfileField::StealthMode
            | ProfileField::LowTechAccess
            | ProfileField::CompletionPercentage => return false,
        };
        *slot = Some(value.into());
        true
    }

    /// Sets one flag field by name. Returns `false` for non-flag fields.
    pub fn set_flag(&mut self, field: ProfileField, value: bool) -> bool {
        match field {
            ProfileField::StealthMode => self.stealth_mode = Some(value),
            ProfileField::LowTechAccess => self.low_tech_access = Some(value),
            _ => return false,
        }
        true
    }

    /// Merges this patch over `base`, producing the full resulting record.
    ///
    /// This is the server-side merge; `updated_at` is left for the store.
    pub fn apply_to(&self, base: &ProfileRecord) -> ProfileRecord {
        fn pick(patch: &Option<String>, base: &Option<String>) -> Option<String> {
            patch.clone().or_else(|| base.clone())
        }

        ProfileRecord {
            id: base.id,
            name: pick(&self.name, &base.name),
            region: pick(&self.region, &base.region),
            business_type: pick(&self.business_type, &base.business_type),
            time_commitment: pick(&self.time_commitment, &base.time_commitment),
            capital_level: pick(&self.capital_level, &base.capital_level),
            stealth_mode: self.stealth_mode.unwrap_or(base.stealth_mode),
            low_tech_access: self.low_tech_access.unwrap_or(base.low_tech_access),
            business_stage: pick(&self.business_stage, &base.business_stage),
            target_market: pick(&self.target_market, &base.target_market),
            revenue_goal: pick(&self.revenue_goal, &base.revenue_goal),
            business_model: pick(&self.business_model, &base.business_model),
            completion_percentage: self
                .completion_percentage
                .unwrap_or(base.completion_percentage),
            updated_at: base.updated_at,
        }
    }
}
