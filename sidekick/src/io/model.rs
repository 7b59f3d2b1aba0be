//! Model client seam and the Gemini REST implementation.
//!
//! The driver hands the full ordered transcript to a [`ModelClient`] and
//! gets back raw response text. Transport, authentication, and retry policy
//! live entirely behind this trait; a failure surfaces as one
//! [`ModelError`] that aborts only the current turn.
//!
//! Calls are blocking on purpose: the loop is strictly turn-based with at
//! most one outstanding request, so no async runtime is involved.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::transcript::{Role, Turn};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// One model invocation: system instruction plus the whole transcript.
#[derive(Debug, Clone)]
pub struct ModelRequest<'a> {
    pub system: &'a str,
    pub turns: &'a [Turn],
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Transport(String),
    #[error("model API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("model returned no usable text")]
    EmptyResponse,
}

/// Abstraction over model backends. Tests use scripted clients that return
/// predetermined responses without any network traffic.
pub trait ModelClient {
    fn complete(&self, request: &ModelRequest<'_>) -> Result<String, ModelError>;
}

/// Client for the Gemini `generateContent` REST API.
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ModelError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{BASE_URL}/{model}:generateContent?key={api_key}",
            model = self.model,
            api_key = self.api_key
        )
    }
}

impl ModelClient for GeminiClient {
    fn complete(&self, request: &ModelRequest<'_>) -> Result<String, ModelError> {
        let body = GenerateContentRequest::from_request(request);
        info!(model = %self.model, turns = request.turns.len(), "sending model request");

        let response = self
            .http
            .post(self.url())
            .json(&body)
            .send()
            .map_err(|err| ModelError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(ModelError::Api {
                status: status.as_u16(),
                message: api_error_message(&body_text),
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|err| ModelError::Transport(format!("parse response: {err}")))?;
        let text = parsed.into_text().ok_or(ModelError::EmptyResponse)?;
        debug!(bytes = text.len(), "model response received");
        Ok(text)
    }
}

/// Role string the Gemini API expects for a transcript turn. Tool results
/// travel back as user-role content, mirroring how the conversation reads
/// from the model's side.
fn api_role(role: Role) -> &'static str {
    match role {
        Role::Model => "model",
        Role::User | Role::Tool => "user",
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

impl GenerateContentRequest {
    fn from_request(request: &ModelRequest<'_>) -> Self {
        let contents = request
            .turns
            .iter()
            .map(|turn| Content {
                role: api_role(turn.role).to_string(),
                parts: vec![Part {
                    text: turn.content.clone(),
                }],
            })
            .collect();
        let system_instruction = (!request.system.is_empty()).then(|| Content {
            role: "system".to_string(),
            parts: vec![Part {
                text: request.system.to_string(),
            }],
        });
        Self {
            contents,
            system_instruction,
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .and_then(|mut candidates| (!candidates.is_empty()).then(|| candidates.remove(0)))
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status = wrapper.error.status.unwrap_or_default();
            let message = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status.is_empty() {
                message
            } else {
                format!("{status}: {message}")
            }
        })
        .unwrap_or_else(|_| body.to_string())
}
