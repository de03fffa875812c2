//! Axum route handlers for the router.

use crate::fanout::Dispatcher;
use agent_common::AgentError;
use agent_types::{AgentInfo, AggregatedResult, PromptRequest};
use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

pub struct AppState {
    pub dispatcher: Dispatcher,
}

// POST /execute-prompt
pub async fn execute_prompt(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PromptRequest>,
) -> Result<Json<AggregatedResult>, Response> {
    req.validate()
        .map_err(|e| AgentError::invalid(e).into_response())?;

    log::info!(
        "[ROUTER] Fanning out prompt for user {} to {} agents",
        req.user_id,
        state.dispatcher.registry().len()
    );

    state
        .dispatcher
        .execute(&req)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}

// GET /agents
pub async fn list_agents(State(state): State<Arc<AppState>>) -> Json<Vec<AgentInfo>> {
    let agents = state
        .dispatcher
        .registry()
        .agents()
        .iter()
        .map(|agent| AgentInfo {
            name: agent.name.clone(),
            endpoint: agent.endpoint.to_string(),
        })
        .collect();
    Json(agents)
}
