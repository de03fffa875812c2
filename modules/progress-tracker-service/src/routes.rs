//! Axum route handlers for the progress tracker.

use agent_common::AgentError;
use agent_common::documents::{Document, DocumentStore};
use agent_common::genai::{TextGenerator, generate_or_empty};
use agent_types::{ProgressAction, ProgressRequest, ProgressResponse, ProgressStatus};
use axum::extract::State;
use axum::response::Json;
use serde_json::Value;
use std::sync::Arc;

pub const COLLECTION: &str = "progress";

pub struct AppState {
    pub documents: Arc<dyn DocumentStore>,
    pub generator: Arc<dyn TextGenerator>,
}

pub fn insight_prompt(progress: &Document) -> String {
    format!(
        "User progress details: {}\n\n\
         Provide 1 motivational insight and 1 next best step. \
         Keep it in two short bullet points.",
        Value::Object(progress.clone())
    )
}

// POST /progress-tracker
pub async fn track(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProgressRequest>,
) -> Result<Json<ProgressResponse>, AgentError> {
    agent_types::require_non_empty("user_id", &req.user_id).map_err(AgentError::invalid)?;

    let update = match (req.action, req.progress) {
        (ProgressAction::Update, Some(progress)) if !progress.is_empty() => Some(progress),
        (ProgressAction::Update, _) => {
            log::debug!(
                "[PROGRESS_TRACKER] Update for {} carried no progress, reading instead",
                req.user_id
            );
            None
        }
        _ => None,
    };

    let status = match update {
        Some(progress) => {
            state
                .documents
                .set(COLLECTION, &req.user_id, progress.into_map(), true)
                .await?;
            ProgressStatus::Updated
        }
        None => ProgressStatus::Fetched,
    };

    let stored = state
        .documents
        .get(COLLECTION, &req.user_id)
        .await?
        .unwrap_or_default();

    let insight = generate_or_empty(state.generator.as_ref(), &insight_prompt(&stored)).await;

    Ok(Json(ProgressResponse {
        status,
        progress: stored,
        insight,
    }))
}
