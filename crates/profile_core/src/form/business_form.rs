//! Business profile tab: editable draft, registry wiring and save flow.
//!
//! # Responsibility
//! - Seed a local draft from the controller's record.
//! - Forward edits to the form registry for cross-tab autofill.
//! - Submit the draft as a partial update and notify the user.
//!
//! # Invariants
//! - Seeding defaults absent text to `""` and absent flags to `false`.
//! - Saving is refused while the controller is busy.
//! - The draft survives failed saves untouched.

use crate::form::notify::Notifier;
use crate::form::registry::{
    FieldDescriptor, FieldKind, FieldValue, FormRegistry, FormRegistryError,
};
use crate::model::profile::{ProfileField, ProfilePatch, ProfileRecord};
use crate::service::profile_controller::{ProfileController, ProfileError};
use crate::service::ProfileService;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Registry id of the business profile tab.
pub const BUSINESS_PROFILE_FORM_ID: &str = "business-profile";

const SAVE_SUCCESS_TITLE: &str = "Business profile saved!";
const SAVE_SUCCESS_DETAIL: &str = "Your business information has been updated successfully.";
const SAVE_FAILURE_TITLE: &str = "Failed to save business profile";

/// Fields edited on this tab, in display order.
pub const BUSINESS_FIELDS: [ProfileField; 9] = [
    ProfileField::BusinessType,
    ProfileField::TimeCommitment,
    ProfileField::CapitalLevel,
    ProfileField::StealthMode,
    ProfileField::LowTechAccess,
    ProfileField::BusinessStage,
    ProfileField::TargetMarket,
    ProfileField::RevenueGoal,
    ProfileField::BusinessModel,
];

/// Rejected draft edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEditError {
    /// Field is not edited on this tab.
    NotEditable(ProfileField),
    /// Text given for a flag, or a flag for a text field.
    KindMismatch(ProfileField),
    Registry(FormRegistryError),
}

impl Display for FormEditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotEditable(field) => write!(f, "field `{field}` is not part of this form"),
            Self::KindMismatch(field) => write!(f, "wrong value kind for field `{field}`"),
            Self::Registry(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FormEditError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Registry(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FormRegistryError> for FormEditError {
    fn from(value: FormRegistryError) -> Self {
        Self::Registry(value)
    }
}

/// Rejected or failed save.
#[derive(Debug)]
pub enum FormSaveError {
    /// A load or update is already in flight.
    Busy,
    Profile(ProfileError),
}

impl Display for FormSaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy => write!(f, "profile is busy; try again when loading finishes"),
            Self::Profile(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FormSaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Busy => None,
            Self::Profile(err) => Some(err),
        }
    }
}

/// Local editable copy of the business fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessProfileDraft {
    pub business_type: String,
    pub time_commitment: String,
    pub capital_level: String,
    pub stealth_mode: bool,
    pub low_tech_access: bool,
    pub business_stage: String,
    pub target_market: String,
    pub revenue_goal: String,
    pub business_model: String,
}

impl BusinessProfileDraft {
    fn from_record(record: &ProfileRecord) -> Self {
        let text = |field| record.text(field).unwrap_or_default().to_string();
        Self {
            business_type: text(ProfileField::BusinessType),
            time_commitment: text(ProfileField::TimeCommitment),
            capital_level: text(ProfileField::CapitalLevel),
            stealth_mode: record.stealth_mode,
            low_tech_access: record.low_tech_access,
            business_stage: text(ProfileField::BusinessStage),
            target_market: text(ProfileField::TargetMarket),
            revenue_goal: text(ProfileField::RevenueGoal),
            business_model: text(ProfileField::BusinessModel),
        }
    }

    fn text_slot(&mut self, field: ProfileField) -> Option<&mut String> {
        match field {
            ProfileField::BusinessType => Some(&mut self.business_type),
            ProfileField::TimeCommitment => Some(&mut self.time_commitment),
            ProfileField::CapitalLevel => Some(&mut self.capital_level),
            ProfileField::BusinessStage => Some(&mut self.business_stage),
            ProfileField::TargetMarket => Some(&mut self.target_market),
            ProfileField::RevenueGoal => Some(&mut self.revenue_goal),
            ProfileField::BusinessModel => Some(&mut self.business_model),
            _ => None,
        }
    }

    fn flag_slot(&mut self, field: ProfileField) -> Option<&mut bool> {
        match field {
            ProfileField::StealthMode => Some(&mut self.stealth_mode),
            ProfileField::LowTechAccess => Some(&mut self.low_tech_access),
            _ => None,
        }
    }

    fn set(&mut self, field: ProfileField, value: FieldValue) -> Result<(), FormEditError> {
        if !BUSINESS_FIELDS.contains(&field) {
            return Err(FormEditError::NotEditable(field));
        }
        match value {
            FieldValue::Text(text) => {
                let slot = self
                    .text_slot(field)
                    .ok_or(FormEditError::KindMismatch(field))?;
                *slot = text;
            }
            FieldValue::Flag(flag) => {
                let slot = self
                    .flag_slot(field)
                    .ok_or(FormEditError::KindMismatch(field))?;
                *slot = flag;
            }
        }
        Ok(())
    }
}

/// Business profile tab state.
#[derive(Debug, Clone, Default)]
pub struct BusinessProfileForm {
    draft: BusinessProfileDraft,
}

impl BusinessProfileForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &BusinessProfileDraft {
        &self.draft
    }

    /// Field declarations published to the registry.
    ///
    /// Flags are tab-local and are not shared across forms. Revenue goal and
    /// business model are declared as free text even though the tab offers
    /// suggestions for them, so other forms can share arbitrary values.
    pub fn registered_fields() -> Vec<FieldDescriptor> {
        [
            (ProfileField::BusinessType, FieldKind::Select, "Business Type"),
            (ProfileField::TimeCommitment, FieldKind::Select, "Time Commitment"),
            (ProfileField::CapitalLevel, FieldKind::Select, "Capital Level"),
            (ProfileField::BusinessStage, FieldKind::Select, "Business Stage"),
            (ProfileField::TargetMarket, FieldKind::Text, "Target Market"),
            (ProfileField::RevenueGoal, FieldKind::Text, "Revenue Goal"),
            (ProfileField::BusinessModel, FieldKind::Text, "Business Model"),
        ]
        .into_iter()
        .map(|(field, kind, label)| FieldDescriptor::new(field.as_str(), kind, label))
        .collect()
    }

    /// Registers this tab with the registry.
    pub fn register(registry: &mut FormRegistry) -> Result<(), FormRegistryError> {
        registry.register(BUSINESS_PROFILE_FORM_ID, Self::registered_fields())
    }

    /// Replaces the draft from `profile`. Keeps the draft when `None`.
    pub fn seed_from(&mut self, profile: Option<&ProfileRecord>) {
        if let Some(record) = profile {
            self.draft = BusinessProfileDraft::from_record(record);
        }
    }

    /// Applies one user edit and forwards shared fields to the registry.
    pub fn edit(
        &mut self,
        registry: &mut FormRegistry,
        field: ProfileField,
        value: FieldValue,
    ) -> Result<(), FormEditError> {
        self.draft.set(field, value.clone())?;
        if field.is_flag() {
            return Ok(());
        }

        let filled = registry.update_field(BUSINESS_PROFILE_FORM_ID, field.as_str(), value)?;
        if !filled.is_empty() {
            debug!(
                "event=form_autofill module=form field={field} targets={}",
                filled.join(",")
            );
        }
        Ok(())
    }

    /// Pulls values other tabs autofilled into this form.
    ///
    /// Returns the number of fields taken over.
    pub fn absorb_registry(&mut self, registry: &FormRegistry) -> usize {
        let Some(values) = registry.form_values(BUSINESS_PROFILE_FORM_ID) else {
            return 0;
        };
        values
            .iter()
            .filter_map(|(name, value)| {
                let field = ProfileField::parse(name)?;
                self.draft.set(field, value.clone()).ok()
            })
            .count()
    }

    /// Partial update carrying every business field.
    pub fn to_patch(&self) -> ProfilePatch {
        let draft = &self.draft;
        ProfilePatch {
            business_type: Some(draft.business_type.clone()),
            time_commitment: Some(draft.time_commitment.clone()),
            capital_level: Some(draft.capital_level.clone()),
            stealth_mode: Some(draft.stealth_mode),
            low_tech_access: Some(draft.low_tech_access),
            business_stage: Some(draft.business_stage.clone()),
            target_market: Some(draft.target_market.clone()),
            revenue_goal: Some(draft.revenue_goal.clone()),
            business_model: Some(draft.business_model.clone()),
            ..ProfilePatch::default()
        }
    }

    /// Saves the draft through `controller` and reports to `notifier`.
    ///
    /// # Contract
    /// - Refuses with `Busy` while the controller has work in flight.
    /// - On success notifies, then runs the completion hook silently.
    /// - On failure notifies the reason and leaves the draft as is.
    pub async fn save<S, N>(
        &self,
        controller: &ProfileController<S>,
        notifier: &N,
    ) -> Result<ProfileRecord, FormSaveError>
    where
        S: ProfileService + ?Sized,
        N: Notifier + ?Sized,
    {
        if controller.loading() {
            return Err(FormSaveError::Busy);
        }

        match controller.update(self.to_patch()).await {
            Ok(record) => {
                notifier.success(SAVE_SUCCESS_TITLE, SAVE_SUCCESS_DETAIL);
                if let Err(err) = controller.sync_completion().await {
                    warn!("event=completion_sync module=form status=error error={err}");
                }
                Ok(controller.profile().unwrap_or(record))
            }
            Err(err) => {
                notifier.error(SAVE_FAILURE_TITLE, &err.to_string());
                Err(FormSaveError::Profile(err))
            }
        }
    }
}
