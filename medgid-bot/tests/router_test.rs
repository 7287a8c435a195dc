//! Conversation-flow tests: fake triage, fake provider source, recording port.

use std::sync::Arc;

use async_trait::async_trait;
use medgid_bot::{Output, OutputPort, Router, SessionEvent};
use medgid_core::{Chat, Phase, User};
use medgid_directory::{
    registry, DirectoryCache, DirectoryError, DirectoryService, ProgressCallback, ProviderRecord,
    ProviderSource, Specialization,
};
use medgid_triage::{TriageClient, TriageError, TriageOutcome};
use tempfile::TempDir;
use tokio::sync::Mutex;

struct RecordingPort {
    outputs: Mutex<Vec<Output>>,
}

impl RecordingPort {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            outputs: Mutex::new(Vec::new()),
        })
    }

    async fn take(&self) -> Vec<Output> {
        std::mem::take(&mut *self.outputs.lock().await)
    }
}

#[async_trait]
impl OutputPort for RecordingPort {
    async fn emit(&self, _chat: &Chat, output: Output) -> medgid_core::Result<()> {
        self.outputs.lock().await.push(output);
        Ok(())
    }
}

struct FakeTriage {
    outcome: Result<TriageOutcome, ()>,
}

#[async_trait]
impl TriageClient for FakeTriage {
    async fn analyze(&self, _symptoms: &str) -> Result<TriageOutcome, TriageError> {
        match &self.outcome {
            Ok(outcome) => Ok(outcome.clone()),
            Err(()) => Err(TriageError::Timeout),
        }
    }
}

struct FakeSource {
    providers: Vec<ProviderRecord>,
    fail: bool,
}

#[async_trait]
impl ProviderSource for FakeSource {
    async fn fetch(
        &self,
        _specialization: &Specialization,
        _progress: &mut ProgressCallback,
    ) -> Result<Vec<ProviderRecord>, DirectoryError> {
        if self.fail {
            return Err(DirectoryError::Parse(1));
        }
        Ok(self.providers.clone())
    }
}

struct Harness {
    router: Arc<Router>,
    port: Arc<RecordingPort>,
    _cache_dir: TempDir,
}

fn harness(triage: FakeTriage, source: FakeSource) -> Harness {
    let cache_dir = TempDir::new().unwrap();
    let cache = DirectoryCache::new(cache_dir.path().join("cache.json"));
    let directory = Arc::new(DirectoryService::new(cache, Arc::new(source)));
    let port = RecordingPort::new();
    let router = Arc::new(Router::new(
        directory,
        Arc::new(triage),
        Arc::clone(&port) as Arc<dyn OutputPort>,
    ));
    Harness {
        router,
        port,
        _cache_dir: cache_dir,
    }
}

fn ok_triage() -> FakeTriage {
    FakeTriage {
        outcome: Ok(TriageOutcome {
            diagnosis: "flu-like illness".to_string(),
            specialists: vec!["Cardiologist".to_string(), "Therapist".to_string()],
        }),
    }
}

fn one_provider() -> FakeSource {
    let mut record = ProviderRecord::unspecified("Ivanov I. I.".to_string());
    record.rating = 4.5;
    FakeSource {
        providers: vec![record],
        fail: false,
    }
}

fn test_user() -> User {
    User {
        id: 100,
        username: Some("patient".to_string()),
        first_name: Some("Pat".to_string()),
        last_name: None,
    }
}

const CHAT: Chat = Chat { id: 100 };

#[tokio::test]
async fn test_start_resets_session_and_welcomes() {
    let h = harness(ok_triage(), one_provider());
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::Start)
        .await;

    assert_eq!(h.port.take().await, vec![Output::Welcome]);
    assert_eq!(
        h.router.session_snapshot(CHAT.id).await.phase,
        Phase::AwaitingChoice
    );
}

#[tokio::test]
async fn test_describe_symptoms_moves_to_symptom_phase() {
    let h = harness(ok_triage(), one_provider());
    // From Idle, without a prior /start.
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::DescribeSymptoms)
        .await;

    assert_eq!(h.port.take().await, vec![Output::SymptomPrompt]);
    assert_eq!(
        h.router.session_snapshot(CHAT.id).await.phase,
        Phase::AwaitingSymptoms
    );
}

#[tokio::test]
async fn test_empty_symptoms_reprompts_without_phase_change() {
    let h = harness(ok_triage(), one_provider());
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::DescribeSymptoms)
        .await;
    h.port.take().await;

    h.router
        .handle(&test_user(), &CHAT, SessionEvent::Text("   ".to_string()))
        .await;

    assert_eq!(h.port.take().await, vec![Output::SymptomsRetry]);
    assert_eq!(
        h.router.session_snapshot(CHAT.id).await.phase,
        Phase::AwaitingSymptoms
    );
}

#[tokio::test]
async fn test_symptom_text_runs_triage_and_stores_recommendations() {
    let h = harness(ok_triage(), one_provider());
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::DescribeSymptoms)
        .await;
    h.port.take().await;

    h.router
        .handle(
            &test_user(),
            &CHAT,
            SessionEvent::Text("fever and chest pain".to_string()),
        )
        .await;

    let outputs = h.port.take().await;
    assert_eq!(outputs[0], Output::Analyzing);
    assert_eq!(
        outputs[1],
        Output::TriageSummary {
            diagnosis: "flu-like illness".to_string(),
            specialists: vec!["Cardiologist".to_string(), "Therapist".to_string()],
        }
    );

    let state = h.router.session_snapshot(CHAT.id).await;
    assert_eq!(state.phase, Phase::AwaitingSpecialistChoice);
    assert_eq!(state.recommended, vec!["Cardiologist", "Therapist"]);
}

#[tokio::test]
async fn test_triage_failure_aborts_to_safe_state() {
    let h = harness(FakeTriage { outcome: Err(()) }, one_provider());
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::DescribeSymptoms)
        .await;
    h.port.take().await;

    h.router
        .handle(&test_user(), &CHAT, SessionEvent::Text("headache".to_string()))
        .await;

    let outputs = h.port.take().await;
    assert_eq!(outputs[0], Output::Analyzing);
    assert!(matches!(&outputs[1], Output::ServiceError(_)));
    // Safe state: back to Idle, no retry loop.
    assert_eq!(h.router.session_snapshot(CHAT.id).await.phase, Phase::Idle);
}

#[tokio::test]
async fn test_recommended_choice_keeps_phase_and_keyboard() {
    let h = harness(ok_triage(), one_provider());
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::DescribeSymptoms)
        .await;
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::Text("chest pain".to_string()))
        .await;
    h.port.take().await;

    let cardio = registry::by_display_name("Cardiologist").unwrap();
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::SpecialistChosen(cardio))
        .await;

    let outputs = h.port.take().await;
    match outputs.last().unwrap() {
        Output::ProviderList {
            specialization,
            providers,
            recommended,
        } => {
            assert_eq!(specialization, "Cardiologist");
            assert_eq!(providers.len(), 1);
            // Recommendation keyboard is preserved for further picks.
            assert_eq!(recommended, &vec!["Cardiologist".to_string(), "Therapist".to_string()]);
        }
        other => panic!("expected ProviderList, got {:?}", other),
    }
    assert_eq!(
        h.router.session_snapshot(CHAT.id).await.phase,
        Phase::AwaitingSpecialistChoice
    );
}

#[tokio::test]
async fn test_direct_specialist_choice_from_idle() {
    let h = harness(ok_triage(), one_provider());
    let therapist = registry::by_display_name("Therapist").unwrap();
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::SpecialistChosen(therapist))
        .await;

    let outputs = h.port.take().await;
    match outputs.last().unwrap() {
        Output::ProviderList { recommended, .. } => assert!(recommended.is_empty()),
        other => panic!("expected ProviderList, got {:?}", other),
    }
    assert_eq!(h.router.session_snapshot(CHAT.id).await.phase, Phase::Idle);
}

#[tokio::test]
async fn test_empty_listing_reports_no_providers() {
    let h = harness(
        ok_triage(),
        FakeSource {
            providers: Vec::new(),
            fail: false,
        },
    );
    let spec = registry::by_display_name("Phlebologist").unwrap();
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::SpecialistChosen(spec))
        .await;

    let outputs = h.port.take().await;
    assert_eq!(
        *outputs.last().unwrap(),
        Output::NoProvidersFound {
            specialization: "Phlebologist".to_string()
        }
    );
}

#[tokio::test]
async fn test_lookup_failure_surfaces_service_error() {
    let h = harness(
        ok_triage(),
        FakeSource {
            providers: Vec::new(),
            fail: true,
        },
    );
    let spec = registry::by_display_name("Urologist").unwrap();
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::SpecialistChosen(spec))
        .await;

    let outputs = h.port.take().await;
    assert!(matches!(outputs.last().unwrap(), Output::ServiceError(_)));
}

#[tokio::test]
async fn test_unrecognized_text_reprompts_without_phase_change() {
    let h = harness(ok_triage(), one_provider());
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::Start)
        .await;
    h.port.take().await;

    h.router
        .handle(&test_user(), &CHAT, SessionEvent::Text("blah".to_string()))
        .await;

    assert_eq!(h.port.take().await, vec![Output::Guidance]);
    assert_eq!(
        h.router.session_snapshot(CHAT.id).await.phase,
        Phase::AwaitingChoice
    );
}

#[tokio::test]
async fn test_main_menu_resets_recommendations() {
    let h = harness(ok_triage(), one_provider());
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::DescribeSymptoms)
        .await;
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::Text("chest pain".to_string()))
        .await;
    h.port.take().await;

    h.router
        .handle(&test_user(), &CHAT, SessionEvent::MainMenu)
        .await;

    assert_eq!(h.port.take().await, vec![Output::Welcome]);
    let state = h.router.session_snapshot(CHAT.id).await;
    assert_eq!(state.phase, Phase::AwaitingChoice);
    assert!(state.recommended.is_empty());
}

#[tokio::test]
async fn test_find_specialist_shows_list_and_goes_idle() {
    let h = harness(ok_triage(), one_provider());
    h.router
        .handle(&test_user(), &CHAT, SessionEvent::Start)
        .await;
    h.port.take().await;

    h.router
        .handle(&test_user(), &CHAT, SessionEvent::FindSpecialist)
        .await;

    assert_eq!(h.port.take().await, vec![Output::SpecializationList]);
    assert_eq!(h.router.session_snapshot(CHAT.id).await.phase, Phase::Idle);
}
