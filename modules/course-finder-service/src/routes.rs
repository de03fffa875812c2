//! Axum route handlers for the course finder.

use crate::youtube_api::{VideoItem, VideoSearch};
use agent_common::AgentError;
use agent_common::genai::{TextGenerator, generate_or_empty};
use agent_common::secrets::SecretStore;
use agent_types::{Course, CourseFinderRequest, CourseFinderResponse, PromptRequest};
use axum::extract::State;
use axum::response::Json;
use futures_util::future::join_all;
use std::sync::Arc;

pub const API_KEY_SECRET: &str = "youtube-api-key";

pub struct AppState {
    pub secrets: Arc<dyn SecretStore>,
    pub search: Arc<dyn VideoSearch>,
    pub generator: Arc<dyn TextGenerator>,
}

pub fn summary_prompt(description: &str) -> String {
    format!(
        "Summarize the following YouTube course/video description in ONE crisp sentence, \
         focusing on what a learner will gain:\n\n{}",
        description
    )
}

async fn summarize(generator: &dyn TextGenerator, description: &str) -> String {
    if description.trim().is_empty() {
        return String::new();
    }
    generate_or_empty(generator, &summary_prompt(description)).await
}

async fn to_course(generator: &dyn TextGenerator, item: VideoItem) -> Course {
    let summary = summarize(generator, item.description.as_deref().unwrap_or("")).await;
    Course {
        url: item.watch_url(),
        title: item
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled".to_string()),
        summary,
    }
}

// POST /course-finder
pub async fn find_courses(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CourseFinderRequest>,
) -> Result<Json<CourseFinderResponse>, AgentError> {
    PromptRequest::new(req.user_id.as_str(), req.prompt.as_str())
        .validate()
        .map_err(AgentError::invalid)?;

    let api_key = state.secrets.get_secret(API_KEY_SECRET).await?;

    let max_results = req.clamped_max_results();
    let items = state.search.search(&api_key, &req.prompt, max_results).await?;
    log::info!(
        "[COURSE_FINDER] {} results for user {} (requested {})",
        items.len(),
        req.user_id,
        max_results
    );

    let generator = state.generator.as_ref();
    let courses = join_all(items.into_iter().map(|item| to_course(generator, item))).await;

    Ok(Json(CourseFinderResponse { courses }))
}
