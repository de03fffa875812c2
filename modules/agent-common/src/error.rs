//! Error type shared by the agent services and the router.

use agent_types::ErrorDetail;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AgentError {
    /// A required secret or setting is missing or empty
    Configuration { message: String },
    /// An external API or agent answered with a failure status or was unreachable
    Upstream {
        stage: String,
        message: String,
        status: Option<u16>,
    },
    /// An external API or agent did not answer in time
    Timeout { stage: String, message: String },
    /// A response body could not be decoded
    Decode { stage: String, message: String },
    /// Client input rejected at the boundary
    InvalidRequest { message: String },
}

impl AgentError {
    pub fn config(message: impl Into<String>) -> Self {
        AgentError::Configuration {
            message: message.into(),
        }
    }

    pub fn upstream(stage: impl Into<String>, message: impl Into<String>) -> Self {
        AgentError::Upstream {
            stage: stage.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn upstream_status(
        stage: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        AgentError::Upstream {
            stage: stage.into(),
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn timeout(stage: impl Into<String>, message: impl Into<String>) -> Self {
        AgentError::Timeout {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn decode(stage: impl Into<String>, message: impl Into<String>) -> Self {
        AgentError::Decode {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        AgentError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Name of the step that failed.
    pub fn stage(&self) -> &str {
        match self {
            AgentError::Configuration { .. } => "configuration",
            AgentError::Upstream { stage, .. }
            | AgentError::Timeout { stage, .. }
            | AgentError::Decode { stage, .. } => stage,
            AgentError::InvalidRequest { .. } => "request",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AgentError::Timeout { .. })
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AgentError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::Configuration { message } => write!(f, "configuration failed: {}", message),
            AgentError::Upstream {
                stage,
                message,
                status: Some(code),
            } => write!(f, "{} failed: [HTTP {}] {}", stage, code, message),
            AgentError::Upstream { stage, message, .. } | AgentError::Timeout { stage, message } => {
                write!(f, "{} failed: {}", stage, message)
            }
            AgentError::Decode { stage, message } => {
                write!(f, "{} failed: invalid response: {}", stage, message)
            }
            AgentError::InvalidRequest { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for AgentError {}

impl IntoResponse for AgentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }
        (status, Json(ErrorDetail::new(self.to_string()))).into_response()
    }
}

/// Map a transport-level reqwest failure onto the stage it happened in.
pub fn transport_error(stage: &str, err: reqwest::Error) -> AgentError {
    if err.is_timeout() {
        AgentError::timeout(stage, "request timed out")
    } else {
        AgentError::upstream(stage, format!("request failed: {}", err))
    }
}

/// Keep upstream error bodies short enough to log and return.
pub fn truncate_error(s: &str) -> &str {
    if s.len() <= 200 {
        return s;
    }
    let mut end = 200;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
