//! Conversation router: the state machine over decoded events.
//!
//! Every (phase, event) pair has a defined transition. Menu events work from
//! any phase; unrecognized text re-prompts without changing phase; failures
//! from triage or the directory abort only the current flow and leave the
//! session in a safe phase. All side effects go through [`OutputPort`].

use std::sync::Arc;

use medgid_core::{Chat, Phase, SessionState, User};
use medgid_directory::{
    DirectoryService, ProgressCallback, ScrapeProgress, Specialization,
};
use medgid_triage::TriageClient;
use tracing::{error, info, instrument, warn};

use crate::events::SessionEvent;
use crate::output::{Output, OutputPort};
use crate::session::SessionStore;

/// Routes one session's events to the triage client and the discovery
/// pipeline, tracking conversation phase per chat.
pub struct Router {
    sessions: SessionStore,
    directory: Arc<DirectoryService>,
    triage: Arc<dyn TriageClient>,
    port: Arc<dyn OutputPort>,
}

impl Router {
    pub fn new(
        directory: Arc<DirectoryService>,
        triage: Arc<dyn TriageClient>,
        port: Arc<dyn OutputPort>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            directory,
            triage,
            port,
        }
    }

    /// Handles one inbound event. Never fails: errors are logged and surfaced
    /// to the user as outputs.
    #[instrument(skip_all, fields(user_id = user.id, chat_id = chat.id))]
    pub async fn handle(&self, user: &User, chat: &Chat, event: SessionEvent) {
        match event {
            SessionEvent::Start | SessionEvent::MainMenu => {
                self.sessions.reset_to_menu(chat.id).await;
                self.emit(chat, Output::Welcome).await;
            }
            SessionEvent::FindSpecialist => {
                // Specialty selection is stateless; picking from the list
                // works from Idle.
                self.sessions.clear(chat.id).await;
                self.emit(chat, Output::SpecializationList).await;
            }
            SessionEvent::DescribeSymptoms => {
                self.sessions
                    .set_phase(chat.id, Phase::AwaitingSymptoms)
                    .await;
                self.emit(chat, Output::SymptomPrompt).await;
            }
            SessionEvent::SpecialistChosen(spec) => {
                self.handle_specialist_chosen(chat, spec).await;
            }
            SessionEvent::Text(text) => {
                self.handle_text(user, chat, &text).await;
            }
        }
    }

    async fn handle_specialist_chosen(&self, chat: &Chat, spec: &'static Specialization) {
        let state = self.sessions.get(chat.id).await;
        info!(slug = spec.slug, phase = ?state.phase, "Specialist chosen");

        // Inside the recommendation flow the keyboard is preserved and the
        // phase stays put; anywhere else the pick is a one-shot lookup.
        let recommended = if state.phase == Phase::AwaitingSpecialistChoice {
            state.recommended
        } else {
            self.sessions.clear(chat.id).await;
            Vec::new()
        };

        let mut progress = self.progress_callback(chat);
        match self.directory.lookup(spec, &mut *progress).await {
            Ok(providers) if providers.is_empty() => {
                self.emit(
                    chat,
                    Output::NoProvidersFound {
                        specialization: spec.display_name.to_string(),
                    },
                )
                .await;
            }
            Ok(providers) => {
                self.emit(
                    chat,
                    Output::ProviderList {
                        specialization: spec.display_name.to_string(),
                        providers,
                        recommended,
                    },
                )
                .await;
            }
            Err(e) => {
                warn!(slug = spec.slug, error = %e, "Provider lookup failed");
                self.emit(chat, Output::ServiceError(e.user_message().to_string()))
                    .await;
            }
        }
    }

    async fn handle_text(&self, user: &User, chat: &Chat, text: &str) {
        let state = self.sessions.get(chat.id).await;
        if state.phase != Phase::AwaitingSymptoms {
            self.emit(chat, Output::Guidance).await;
            return;
        }

        let symptoms = text.trim();
        if symptoms.is_empty() {
            // Stay in the symptom phase and ask again.
            self.emit(chat, Output::SymptomsRetry).await;
            return;
        }

        self.emit(chat, Output::Analyzing).await;
        match self.triage.analyze(symptoms).await {
            Ok(outcome) => {
                info!(
                    user = %user.full_name(),
                    symptoms = %symptoms,
                    diagnosis = %outcome.diagnosis,
                    specialists = ?outcome.specialists,
                    "Triage recommendation"
                );
                self.sessions
                    .set(
                        chat.id,
                        SessionState {
                            phase: Phase::AwaitingSpecialistChoice,
                            recommended: outcome.specialists.clone(),
                        },
                    )
                    .await;
                self.emit(
                    chat,
                    Output::TriageSummary {
                        diagnosis: outcome.diagnosis,
                        specialists: outcome.specialists,
                    },
                )
                .await;
            }
            Err(e) => {
                error!(user_id = user.id, error = %e, "Triage failed, aborting symptom flow");
                self.sessions.clear(chat.id).await;
                self.emit(chat, Output::ServiceError(e.user_message().to_string()))
                    .await;
            }
        }
    }

    /// Progress callback that forwards scrape checkpoints as outputs,
    /// best-effort.
    fn progress_callback(&self, chat: &Chat) -> Box<ProgressCallback> {
        let port = Arc::clone(&self.port);
        let chat = chat.clone();
        Box::new(move |p: ScrapeProgress| {
            let port = Arc::clone(&port);
            let chat = chat.clone();
            Box::pin(async move {
                if let Err(e) = port.emit(&chat, Output::SearchProgress(p)).await {
                    warn!(chat_id = chat.id, error = %e, "Progress update dropped");
                }
            })
        })
    }

    async fn emit(&self, chat: &Chat, output: Output) {
        if let Err(e) = self.port.emit(chat, output).await {
            error!(chat_id = chat.id, error = %e, "Failed to emit output");
        }
    }

    /// Session snapshot for integration tests.
    #[doc(hidden)]
    pub async fn session_snapshot(&self, chat_id: i64) -> SessionState {
        self.sessions.get(chat_id).await
    }
}
