//! Concurrent fan-out of one prompt to every registered agent.
//!
//! All calls start together and share one deadline. The first failure
//! resolves the whole request; the remaining in-flight calls are dropped,
//! which aborts their HTTP requests. Dropping the `execute` future (client
//! disconnect) has the same effect.

use crate::registry::{AgentRegistration, AgentRegistry};
use agent_common::AgentError;
use agent_common::error::{transport_error, truncate_error};
use agent_types::{AggregatedResult, ErrorDetail, PromptRequest};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use futures_util::future::try_join_all;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// One agent's call failed, which fails the whole request.
#[derive(Debug)]
pub struct FanOutError {
    pub agent: String,
    pub cause: AgentError,
}

impl fmt::Display for FanOutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed", self.agent)
    }
}

impl std::error::Error for FanOutError {}

impl IntoResponse for FanOutError {
    fn into_response(self) -> Response {
        log::error!("[ROUTER] {}: {}", self, self.cause);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorDetail::new(self.to_string())),
        )
            .into_response()
    }
}

pub struct Dispatcher {
    http: reqwest::Client,
    registry: Arc<AgentRegistry>,
    deadline: Duration,
}

impl Dispatcher {
    pub fn new(http: reqwest::Client, registry: Arc<AgentRegistry>, deadline: Duration) -> Self {
        Self {
            http,
            registry,
            deadline,
        }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Call every agent and collect their replies keyed by agent name.
    pub async fn execute(&self, req: &PromptRequest) -> Result<AggregatedResult, FanOutError> {
        let started = Instant::now();
        let deadline = started + self.deadline;

        let calls = self
            .registry
            .agents()
            .iter()
            .map(|agent| self.call_agent(agent, req, deadline));
        let replies = try_join_all(calls).await?;

        log::info!(
            "[ROUTER] {} agents answered for user {} in {:?}",
            replies.len(),
            req.user_id,
            started.elapsed()
        );

        Ok(AggregatedResult {
            user_id: req.user_id.clone(),
            results: replies.into_iter().collect(),
        })
    }

    async fn call_agent(
        &self,
        agent: &AgentRegistration,
        req: &PromptRequest,
        deadline: Instant,
    ) -> Result<(String, Value), FanOutError> {
        let started = Instant::now();
        let outcome = match tokio::time::timeout_at(deadline, self.post(agent, req)).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::timeout(
                agent.name.as_str(),
                format!("timed out after {:?}", self.deadline),
            )),
        };

        match outcome {
            Ok(reply) => {
                log::debug!("[ROUTER] {} answered in {:?}", agent.name, started.elapsed());
                Ok((agent.name.clone(), reply))
            }
            Err(cause) => Err(FanOutError {
                agent: agent.name.clone(),
                cause,
            }),
        }
    }

    async fn post(&self, agent: &AgentRegistration, req: &PromptRequest) -> Result<Value, AgentError> {
        let stage = agent.name.as_str();
        let response = self
            .http
            .post(agent.endpoint.clone())
            .json(&agent.request_body(req))
            .send()
            .await
            .map_err(|e| transport_error(stage, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(stage, e))?;

        if status != reqwest::StatusCode::OK {
            return Err(AgentError::upstream_status(
                stage,
                status.as_u16(),
                truncate_error(&String::from_utf8_lossy(&body)),
            ));
        }

        serde_json::from_slice(&body).map_err(|e| AgentError::decode(stage, e.to_string()))
    }
}
