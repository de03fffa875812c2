//! Axum route handlers for the roadmap maker.

use agent_common::AgentError;
use agent_common::genai::{TextGenerator, generate_or_empty};
use agent_types::{PromptRequest, RoadmapResponse};
use axum::extract::State;
use axum::response::Json;
use std::sync::Arc;

pub struct AppState {
    pub generator: Arc<dyn TextGenerator>,
}

pub fn roadmap_prompt(goal: &str) -> String {
    format!(
        "Create a detailed, step-by-step learning roadmap for the goal below. \
         Break it into weeks, list concrete resources, and add estimated durations \
         (in hours). Keep it compact and practical.\n\nGOAL:\n{}",
        goal
    )
}

// POST /roadmap-maker
pub async fn roadmap(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PromptRequest>,
) -> Result<Json<RoadmapResponse>, AgentError> {
    req.validate().map_err(AgentError::invalid)?;

    let roadmap = generate_or_empty(state.generator.as_ref(), &roadmap_prompt(&req.prompt)).await;
    if roadmap.is_empty() {
        log::warn!("[ROADMAP_MAKER] Empty roadmap for user {}", req.user_id);
    }

    Ok(Json(RoadmapResponse { roadmap }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedGenerator {
        reply: Result<String, AgentError>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(reply: Result<String, AgentError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn test_roadmap_returns_generated_text() {
        let generator = ScriptedGenerator::new(Ok("Week 1: ...".to_string()));
        let state = Arc::new(AppState {
            generator: generator.clone(),
        });

        let Json(resp) = roadmap(State(state), Json(PromptRequest::new("u1", "learn rust")))
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            serde_json::json!({"roadmap": "Week 1: ..."})
        );

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with("GOAL:\nlearn rust"));
    }

    #[tokio::test]
    async fn test_roadmap_soft_fails_to_empty() {
        let generator = ScriptedGenerator::new(Err(AgentError::upstream_status(
            "generate", 500, "internal",
        )));
        let state = Arc::new(AppState { generator });

        let Json(resp) = roadmap(State(state), Json(PromptRequest::new("u1", "learn rust")))
            .await
            .unwrap();
        assert_eq!(resp.roadmap, "");
    }

    #[tokio::test]
    async fn test_roadmap_rejects_empty_prompt() {
        let state = Arc::new(AppState {
            generator: ScriptedGenerator::new(Ok("unused".to_string())),
        });

        let err = roadmap(State(state), Json(PromptRequest::new("u1", " ")))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidRequest { .. }));
    }
}
