mod support;

use profile_core::{
    BusinessProfileForm, FieldValue, FormRegistry, FormSaveError, Notifier, ProfileController,
    ProfileError, ProfileField,
};
use std::sync::{Arc, Mutex};
use support::{record_with, MockProfileService};
use uuid::Uuid;

#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<(String, String, String)>>,
}

impl RecordingNotifier {
    fn events(&self) -> Vec<(String, String, String)> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, kind: &str, title: &str, detail: &str) {
        self.events.lock().unwrap().push((
            kind.to_string(),
            title.to_string(),
            detail.to_string(),
        ));
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, title: &str, detail: &str) {
        self.push("success", title, detail);
    }

    fn error(&self, title: &str, detail: &str) {
        self.push("error", title, detail);
    }
}

#[tokio::test]
async fn save_submits_draft_notifies_and_corrects_completion() {
    let service = MockProfileService::new();
    let user = Uuid::new_v4();
    service.insert(record_with(user, "Ann", "EU", "", "", ""));
    let controller = ProfileController::new(Arc::clone(&service));
    controller.load(Some(user)).await.unwrap();

    let mut registry = FormRegistry::new();
    BusinessProfileForm::register(&mut registry).unwrap();
    let mut form = BusinessProfileForm::new();
    form.seed_from(controller.profile().as_ref());
    form.edit(
        &mut registry,
        ProfileField::BusinessType,
        FieldValue::Text("Retail".to_string()),
    )
    .unwrap();
    form.edit(
        &mut registry,
        ProfileField::CapitalLevel,
        FieldValue::Text("Bootstrap ($0-1K)".to_string()),
    )
    .unwrap();

    let notifier = RecordingNotifier::default();
    let saved = form.save(&controller, &notifier).await.unwrap();

    assert_eq!(saved.business_type.as_deref(), Some("Retail"));
    assert_eq!(saved.completion_percentage, 80);
    assert_eq!(controller.profile(), Some(saved));
    assert_eq!(service.update_calls(), 2);
    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "success");
    assert_eq!(events[0].1, "Business profile saved!");
}

#[tokio::test]
async fn failed_save_notifies_and_keeps_draft() {
    let service = MockProfileService::new();
    let user = Uuid::new_v4();
    service.insert(record_with(user, "Ann", "", "", "", ""));
    let controller = ProfileController::new(Arc::clone(&service));
    controller.load(Some(user)).await.unwrap();
    let previous = controller.profile();

    let mut registry = FormRegistry::new();
    BusinessProfileForm::register(&mut registry).unwrap();
    let mut form = BusinessProfileForm::new();
    form.seed_from(previous.as_ref());
    form.edit(
        &mut registry,
        ProfileField::TargetMarket,
        FieldValue::Text("Indie makers".to_string()),
    )
    .unwrap();
    let draft = form.draft().clone();

    service.fail_update(true);
    let notifier = RecordingNotifier::default();
    let err = form.save(&controller, &notifier).await.unwrap_err();

    assert!(matches!(err, FormSaveError::Profile(ProfileError::ServiceFailure(_))));
    assert_eq!(form.draft(), &draft);
    assert_eq!(controller.profile(), previous);
    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "error");
    assert_eq!(events[0].1, "Failed to save business profile");
    assert!(events[0].2.contains("write timed out"));
}

#[tokio::test]
async fn save_without_identity_reports_no_user() {
    let service = MockProfileService::new();
    let controller = ProfileController::new(Arc::clone(&service));
    let form = BusinessProfileForm::new();
    let notifier = RecordingNotifier::default();

    let err = form.save(&controller, &notifier).await.unwrap_err();

    assert!(matches!(err, FormSaveError::Profile(ProfileError::NoIdentity)));
    assert_eq!(notifier.events()[0].2, "No user found");
    assert_eq!(service.update_calls(), 0);
}

#[tokio::test]
async fn save_is_refused_while_controller_is_busy() {
    let service = MockProfileService::new();
    let user = Uuid::new_v4();
    service.insert(record_with(user, "Ann", "", "", "", ""));
    let gate = service.hold_fetch(user);
    let controller = Arc::new(ProfileController::new(Arc::clone(&service)));

    let pending = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.load(Some(user)).await }
    });
    tokio::task::yield_now().await;

    let notifier = RecordingNotifier::default();
    let err = BusinessProfileForm::new()
        .save(controller.as_ref(), &notifier)
        .await
        .unwrap_err();
    assert!(matches!(err, FormSaveError::Busy));
    assert!(notifier.events().is_empty());
    assert_eq!(service.update_calls(), 0);

    gate.notify_one();
    pending.await.unwrap().unwrap();
}
