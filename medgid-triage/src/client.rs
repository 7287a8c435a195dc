//! Completion-service triage client.
//!
//! One synchronous (non-streamed) completion request per triage run, bounded
//! by a 30 s timeout. The wire format is the foundation-models completion API:
//! `modelUri` + `completionOptions` + a single user message; the reply text
//! lives in `result.alternatives[0].message.text`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::TriageError;
use crate::parse::parse_reply;
use crate::prompt::build_prompt;
use crate::{TriageClient, TriageOutcome};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 500;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    model_uri: String,
    completion_options: CompletionOptions,
    messages: Vec<CompletionMessage>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    stream: bool,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct CompletionMessage {
    role: &'static str,
    text: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    result: CompletionResult,
}

#[derive(Deserialize)]
struct CompletionResult {
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    message: AlternativeMessage,
}

#[derive(Deserialize)]
struct AlternativeMessage {
    text: String,
}

/// [`TriageClient`] backed by the completion endpoint.
pub struct CompletionTriageClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model_uri: String,
}

impl CompletionTriageClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        folder_id: &str,
    ) -> Result<Self, TriageError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
            model_uri: format!("gpt://{}/yandexgpt/latest", folder_id),
        })
    }

    async fn complete(&self, prompt: String) -> Result<String, TriageError> {
        let request = CompletionRequest {
            model_uri: self.model_uri.clone(),
            completion_options: CompletionOptions {
                stream: false,
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            },
            messages: vec![CompletionMessage {
                role: "user",
                text: prompt,
            }],
        };

        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", format!("Api-Key {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Triage service rejected request");
            return Err(TriageError::UpstreamStatus { status });
        }

        let envelope: CompletionResponse = response.json().await?;
        envelope
            .result
            .alternatives
            .into_iter()
            .next()
            .map(|a| a.message.text)
            .ok_or(TriageError::MissingAlternatives)
    }
}

#[async_trait]
impl TriageClient for CompletionTriageClient {
    #[instrument(skip(self, symptoms))]
    async fn analyze(&self, symptoms: &str) -> Result<TriageOutcome, TriageError> {
        let reply = self.complete(build_prompt(symptoms)).await?;
        let outcome = parse_reply(&reply);
        info!(
            diagnosis = %outcome.diagnosis,
            specialists = ?outcome.specialists,
            "Triage complete"
        );
        Ok(outcome)
    }
}
