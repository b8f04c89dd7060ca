//! In-process form coordination registry.
//!
//! # Responsibility
//! - Track which editable fields each open form declares.
//! - Propagate a value typed in one form to same-named empty fields in the
//!   others, flagging them as auto-filled.
//!
//! # Invariants
//! - Form ids are unique and match `^[a-z0-9][a-z0-9_-]*$`.
//! - Only declared fields can be written.
//! - A user edit clears the auto-filled flag for that field in that form.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

static FORM_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("valid form id regex"));

/// Input widget family of a registered field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Select,
    Text,
}

/// One editable field declared by a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub label: String,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            label: label.into(),
        }
    }
}

/// Current value of a registered field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    /// Empty text and an unset flag both count as "nothing entered".
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(value) => value.is_empty(),
            Self::Flag(value) => !value,
        }
    }
}

/// Registration and update errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormRegistryError {
    InvalidFormId(String),
    DuplicateFormId(String),
    FormNotFound(String),
    UnknownField { form_id: String, field: String },
}

impl Display for FormRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormId(value) => write!(f, "form id is invalid: {value}"),
            Self::DuplicateFormId(value) => write!(f, "form id already registered: {value}"),
            Self::FormNotFound(value) => write!(f, "form not found: {value}"),
            Self::UnknownField { form_id, field } => {
                write!(f, "form `{form_id}` does not declare field `{field}`")
            }
        }
    }
}

impl Error for FormRegistryError {}

#[derive(Debug, Default)]
struct RegisteredForm {
    fields: Vec<FieldDescriptor>,
    values: BTreeMap<String, FieldValue>,
    auto_filled: BTreeSet<String>,
}

impl RegisteredForm {
    fn declares(&self, field: &str) -> bool {
        self.fields.iter().any(|descriptor| descriptor.name == field)
    }
}

/// Registry shared by all open profile forms.
#[derive(Debug, Default)]
pub struct FormRegistry {
    forms: BTreeMap<String, RegisteredForm>,
}

impl FormRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one form and its field declarations.
    pub fn register(
        &mut self,
        form_id: &str,
        fields: Vec<FieldDescriptor>,
    ) -> Result<(), FormRegistryError> {
        let form_id = form_id.trim();
        if !FORM_ID_RE.is_match(form_id) {
            return Err(FormRegistryError::InvalidFormId(form_id.to_string()));
        }
        if self.forms.contains_key(form_id) {
            return Err(FormRegistryError::DuplicateFormId(form_id.to_string()));
        }

        self.forms.insert(
            form_id.to_string(),
            RegisteredForm {
                fields,
                ..RegisteredForm::default()
            },
        );
        Ok(())
    }

    /// Removes a form and everything it holds.
    pub fn unregister(&mut self, form_id: &str) -> Result<(), FormRegistryError> {
        self.forms
            .remove(form_id.trim())
            .map(|_| ())
            .ok_or_else(|| FormRegistryError::FormNotFound(form_id.trim().to_string()))
    }

    /// Records a user edit and autofills same-named empty fields elsewhere.
    ///
    /// Returns the ids of the other forms that received the value.
    pub fn update_field(
        &mut self,
        form_id: &str,
        field: &str,
        value: FieldValue,
    ) -> Result<Vec<String>, FormRegistryError> {
        let form = self
            .forms
            .get_mut(form_id)
            .ok_or_else(|| FormRegistryError::FormNotFound(form_id.to_string()))?;
        if !form.declares(field) {
            return Err(FormRegistryError::UnknownField {
                form_id: form_id.to_string(),
                field: field.to_string(),
            });
        }
        form.values.insert(field.to_string(), value.clone());
        form.auto_filled.remove(field);

        if value.is_empty() {
            return Ok(Vec::new());
        }

        let mut filled = Vec::new();
        for (other_id, other) in self.forms.iter_mut() {
            if other_id == form_id || !other.declares(field) {
                continue;
            }
            let is_blank = other.values.get(field).map_or(true, FieldValue::is_empty);
            if is_blank {
                other.values.insert(field.to_string(), value.clone());
                other.auto_filled.insert(field.to_string());
                filled.push(other_id.clone());
            }
        }
        Ok(filled)
    }

    /// Whether `field` in `form_id` currently holds an autofilled value.
    pub fn is_field_auto_filled(&self, form_id: &str, field: &str) -> bool {
        self.forms
            .get(form_id)
            .is_some_and(|form| form.auto_filled.contains(field))
    }

    /// Values entered or autofilled for `form_id`.
    pub fn form_values(&self, form_id: &str) -> Option<&BTreeMap<String, FieldValue>> {
        self.forms.get(form_id).map(|form| &form.values)
    }

    /// Sorted registered form ids.
    pub fn form_ids(&self) -> Vec<String> {
        self.forms.keys().cloned().collect()
    }
}
