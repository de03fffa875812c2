//! Generative-text backend and the soft-fail helpers every agent uses for
//! enrichment calls.

use crate::config::GcpConfig;
use crate::error::{AgentError, transport_error, truncate_error};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const STAGE: &str = "generate";

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AgentError>;
}

/// Run an enrichment prompt. Failures and empty output degrade to `""`.
pub async fn generate_or_empty(generator: &dyn TextGenerator, prompt: &str) -> String {
    generate_or(generator, prompt, "").await
}

/// Run an enrichment prompt. Failures and empty output degrade to `fallback`.
pub async fn generate_or(generator: &dyn TextGenerator, prompt: &str, fallback: &str) -> String {
    match generator.generate(prompt).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            log::debug!("Generative backend returned no text, using fallback");
            fallback.to_string()
        }
        Err(e) => {
            log::warn!("Enrichment call failed, using fallback: {}", e);
            fallback.to_string()
        }
    }
}

// =====================================================
// Vertex AI Gemini
// =====================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Text of the first candidate, with its parts concatenated and trimmed.
fn extract_text(body: &str) -> Result<String, AgentError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| AgentError::decode(STAGE, e.to_string()))?;
    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    Ok(text.trim().to_string())
}

pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, config: &GcpConfig) -> Self {
        log::info!(
            "Generative backend: {} in {} ({})",
            config.model,
            config.vertex_location,
            config.project
        );
        Self {
            http,
            endpoint: config.generate_content_url(),
            access_token: config.access_token.clone(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let mut request = self.http.post(&self.endpoint).timeout(self.timeout).json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(STAGE, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(STAGE, e))?;

        if !status.is_success() {
            return Err(AgentError::upstream_status(
                STAGE,
                status.as_u16(),
                truncate_error(&text),
            ));
        }
        extract_text(&text)
    }
}
