use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;

use aps_app::{OnboardingError, OnboardingOrchestrator};
use aps_core::onboarding::{DraftField, OnboardingPatch, OnboardingRecord, WizardPosition, WizardStep};
use aps_core::ports::{
    JobApplication, NavigationPort, Notice, NotifierPort, OnboardingStorePort, Screen, StoreError,
};
use aps_core::session::IdentityId;

#[tokio::test]
async fn completing_all_three_steps_persists_the_union_of_fields() {
    let store = Arc::new(MemoryStore::default());
    let (orchestrator, navigation, _notifier, user_id) = build_orchestrator(store.clone());
    orchestrator.load().await;

    fill_step_one(&orchestrator).await;
    orchestrator.next().await.expect("step 1");
    fill_step_two(&orchestrator).await;
    orchestrator.next().await.expect("step 2");
    fill_step_three(&orchestrator).await;
    let snapshot = orchestrator.next().await.expect("step 3");

    assert_eq!(snapshot.position, WizardPosition::Completed);
    let record = store.record(&user_id).expect("record persisted");
    assert_eq!(
        record.completed_steps,
        [1u8, 2, 3].into_iter().collect()
    );
    assert!(record.onboarding_completed);
    // No field from an earlier step is lost.
    assert_eq!(record.full_name, "Ada Lovelace");
    assert_eq!(record.desired_role, "Software Engineer");
    assert_eq!(record.desired_location, "Remote");
    assert_eq!(record.experience_band, "4-6");
    assert_eq!(record.expected_salary, "$80,000 - $100,000");
    assert_eq!(record.current_salary.as_deref(), Some("$70,000"));
    assert_eq!(record.skills, vec!["React", "Node.js", "Python"]);
    assert_eq!(record.availability, "immediate");
    assert_eq!(record.remote_preference, "remote");
    assert_eq!(navigation.screens(), vec![Screen::Dashboard]);
}

#[tokio::test]
async fn back_then_next_with_unchanged_input_reproduces_the_record() {
    let store = Arc::new(MemoryStore::default());
    let (orchestrator, _navigation, _notifier, user_id) = build_orchestrator(store.clone());
    orchestrator.load().await;

    fill_step_one(&orchestrator).await;
    orchestrator.next().await.expect("step 1");
    let after_first = store.record(&user_id).expect("record");

    let snapshot = orchestrator.back().await;
    assert_eq!(snapshot.position, WizardPosition::Step(WizardStep::Basics));
    let snapshot = orchestrator.next().await.expect("step 1 again");
    assert_eq!(snapshot.position, WizardPosition::Step(WizardStep::Experience));

    let mut after_retry = store.record(&user_id).expect("record");
    after_retry.updated_at = after_first.updated_at;
    assert_eq!(after_retry, after_first);
}

#[tokio::test]
async fn back_does_not_uncomplete_a_step_or_touch_the_store() {
    let store = Arc::new(MemoryStore::default());
    let (orchestrator, _navigation, _notifier, user_id) = build_orchestrator(store.clone());
    orchestrator.load().await;

    fill_step_one(&orchestrator).await;
    orchestrator.next().await.expect("step 1");
    let upserts_before = store.upsert_count();

    orchestrator.back().await;

    assert_eq!(store.upsert_count(), upserts_before);
    let record = store.record(&user_id).expect("record");
    assert_eq!(record.completed_steps, [1u8].into_iter().collect());
}

#[tokio::test]
async fn validation_failure_never_reaches_the_store() {
    let store = Arc::new(MemoryStore::default());
    let (orchestrator, _navigation, notifier, _user_id) = build_orchestrator(store.clone());
    orchestrator.load().await;

    // Step 1 with nothing filled in.
    let result = orchestrator.next().await;
    assert!(matches!(result, Err(OnboardingError::Validation(_))));
    assert_eq!(store.upsert_count(), 0);
    assert!(notifier.titles().contains(&"Missing Information".to_string()));
}

#[tokio::test]
async fn persistence_failure_keeps_the_draft_and_is_retryable() {
    let store = Arc::new(MemoryStore::default());
    store.fail_next_upsert();
    let (orchestrator, _navigation, notifier, user_id) = build_orchestrator(store.clone());
    orchestrator.load().await;

    fill_step_one(&orchestrator).await;
    let result = orchestrator.next().await;
    assert!(matches!(result, Err(OnboardingError::Persistence(_))));
    assert!(notifier.titles().contains(&"Error".to_string()));

    let snapshot = orchestrator.snapshot().await;
    assert_eq!(snapshot.position, WizardPosition::Step(WizardStep::Basics));
    assert_eq!(snapshot.draft.full_name, "Ada Lovelace");
    assert!(!snapshot.saving);

    // Same call again succeeds; merge semantics make the retry safe.
    let snapshot = orchestrator.next().await.expect("retry");
    assert_eq!(snapshot.position, WizardPosition::Step(WizardStep::Experience));
    let record = store.record(&user_id).expect("record");
    assert_eq!(record.completed_steps, [1u8].into_iter().collect());
}

#[tokio::test]
async fn load_seeds_the_draft_and_derives_the_resume_step() {
    let store = Arc::new(MemoryStore::default());
    let user_id = IdentityId::new("resuming-user".into());
    let mut stored = OnboardingRecord::fresh(user_id.clone());
    stored.full_name = "Ada Lovelace".into();
    stored.desired_role = "Engineer".into();
    stored.desired_location = "Remote".into();
    stored.skills = vec!["React".into(), "Python".into()];
    stored.completed_steps = [1u8].into_iter().collect();
    stored.current_step = 3; // drifted counter, must be ignored
    store.insert(stored);

    let (orchestrator, _navigation, _notifier) = build_for_user(store, user_id);
    let snapshot = orchestrator.load().await;

    assert_eq!(snapshot.position, WizardPosition::Step(WizardStep::Experience));
    assert_eq!(snapshot.draft.full_name, "Ada Lovelace");
    assert_eq!(snapshot.draft.skills, "React, Python");
}

#[tokio::test]
async fn load_of_a_completed_record_does_not_re_enter_the_wizard() {
    let store = Arc::new(MemoryStore::default());
    let user_id = IdentityId::new("done-user".into());
    let mut stored = OnboardingRecord::fresh(user_id.clone());
    stored.completed_steps = [1u8, 2, 3].into_iter().collect();
    stored.current_step = 4;
    stored.onboarding_completed = true;
    store.insert(stored);

    let navigation = Arc::new(RecordingNavigation::default());
    let orchestrator = OnboardingOrchestrator::new(
        store,
        navigation.clone(),
        Arc::new(RecordingNotifier::default()),
        user_id,
    );
    let snapshot = orchestrator.load().await;

    assert_eq!(snapshot.position, WizardPosition::Completed);
    assert_eq!(navigation.screens(), vec![Screen::Dashboard]);
}

#[tokio::test]
async fn load_failure_fails_open_to_an_empty_draft() {
    let store = Arc::new(MemoryStore::default());
    store.fail_next_get();
    let (orchestrator, _navigation, notifier, _user_id) = build_orchestrator(store.clone());

    let snapshot = orchestrator.load().await;

    assert_eq!(snapshot.position, WizardPosition::Step(WizardStep::Basics));
    assert_eq!(snapshot.draft.full_name, "");
    assert!(notifier.titles().contains(&"Error".to_string()));

    // The wizard still works after the failed read.
    fill_step_one(&orchestrator).await;
    let snapshot = orchestrator.next().await.expect("step 1");
    assert_eq!(snapshot.position, WizardPosition::Step(WizardStep::Experience));
}

#[tokio::test]
async fn skills_are_normalized_at_the_persistence_boundary() {
    let store = Arc::new(MemoryStore::default());
    let (orchestrator, _navigation, _notifier, user_id) = build_orchestrator(store.clone());
    orchestrator.load().await;

    fill_step_one(&orchestrator).await;
    orchestrator.next().await.expect("step 1");
    fill_step_two(&orchestrator).await;
    orchestrator.next().await.expect("step 2");
    orchestrator
        .set_field(DraftField::Skills, "React, Node.js ,, Python".into())
        .await;
    orchestrator
        .set_field(DraftField::Availability, "2-weeks".into())
        .await;
    orchestrator
        .set_field(DraftField::RemotePreference, "hybrid".into())
        .await;
    orchestrator.next().await.expect("step 3");

    let record = store.record(&user_id).expect("record");
    assert_eq!(record.skills, vec!["React", "Node.js", "Python"]);
}

async fn fill_step_one(orchestrator: &OnboardingOrchestrator) {
    orchestrator
        .set_field(DraftField::FullName, "Ada Lovelace".into())
        .await;
    orchestrator
        .set_field(DraftField::DesiredRole, "Software Engineer".into())
        .await;
    orchestrator
        .set_field(DraftField::DesiredLocation, "Remote".into())
        .await;
}

async fn fill_step_two(orchestrator: &OnboardingOrchestrator) {
    orchestrator
        .set_field(DraftField::ExperienceBand, "4-6".into())
        .await;
    orchestrator
        .set_field(DraftField::ExpectedSalary, "$80,000 - $100,000".into())
        .await;
    orchestrator
        .set_field(DraftField::CurrentSalary, "$70,000".into())
        .await;
}

async fn fill_step_three(orchestrator: &OnboardingOrchestrator) {
    orchestrator
        .set_field(DraftField::Skills, "React, Node.js, Python".into())
        .await;
    orchestrator
        .set_field(DraftField::Availability, "immediate".into())
        .await;
    orchestrator
        .set_field(DraftField::RemotePreference, "remote".into())
        .await;
}

fn build_orchestrator(
    store: Arc<MemoryStore>,
) -> (
    OnboardingOrchestrator,
    Arc<RecordingNavigation>,
    Arc<RecordingNotifier>,
    IdentityId,
) {
    let user_id = IdentityId::random();
    let (orchestrator, navigation, notifier) = build_for_user(store, user_id.clone());
    (orchestrator, navigation, notifier, user_id)
}

fn build_for_user(
    store: Arc<MemoryStore>,
    user_id: IdentityId,
) -> (
    OnboardingOrchestrator,
    Arc<RecordingNavigation>,
    Arc<RecordingNotifier>,
) {
    let navigation = Arc::new(RecordingNavigation::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let orchestrator =
        OnboardingOrchestrator::new(store, navigation.clone(), notifier.clone(), user_id);
    (orchestrator, navigation, notifier)
}

/// In-memory store honoring the merge-upsert contract.
#[derive(Default)]
struct MemoryStore {
    records: StdMutex<HashMap<IdentityId, OnboardingRecord>>,
    upserts: AtomicUsize,
    fail_next_upsert: AtomicBool,
    fail_next_get: AtomicBool,
}

impl MemoryStore {
    fn record(&self, user_id: &IdentityId) -> Option<OnboardingRecord> {
        self.records.lock().unwrap().get(user_id).cloned()
    }

    fn insert(&self, record: OnboardingRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.user_id.clone(), record);
    }

    fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    fn fail_next_upsert(&self) {
        self.fail_next_upsert.store(true, Ordering::SeqCst);
    }

    fn fail_next_get(&self) {
        self.fail_next_get.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl OnboardingStorePort for MemoryStore {
    async fn get(&self, user_id: &IdentityId) -> Result<Option<OnboardingRecord>, StoreError> {
        if self.fail_next_get.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".into()));
        }
        Ok(self.records.lock().unwrap().get(user_id).cloned())
    }

    async fn upsert(
        &self,
        user_id: &IdentityId,
        patch: OnboardingPatch,
    ) -> Result<OnboardingRecord, StoreError> {
        if self.fail_next_upsert.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".into()));
        }
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(user_id.clone())
            .or_insert_with(|| OnboardingRecord::fresh(user_id.clone()));
        record.apply(patch);
        Ok(record.clone())
    }

    async fn list_applications(
        &self,
        _user_id: &IdentityId,
    ) -> Result<Vec<JobApplication>, StoreError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct RecordingNavigation {
    screens: StdMutex<Vec<Screen>>,
}

impl RecordingNavigation {
    fn screens(&self) -> Vec<Screen> {
        self.screens.lock().unwrap().clone()
    }
}

impl NavigationPort for RecordingNavigation {
    fn go_to(&self, screen: Screen) {
        self.screens.lock().unwrap().push(screen);
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notices: StdMutex<Vec<Notice>>,
}

impl RecordingNotifier {
    fn titles(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|notice| notice.title.clone())
            .collect()
    }
}

impl NotifierPort for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
