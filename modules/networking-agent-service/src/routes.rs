//! Axum route handlers for the networking agent.

use crate::mailer::{MailTransport, OutboundEmail};
use agent_common::AgentError;
use agent_common::genai::{TextGenerator, generate_or};
use agent_common::secrets::SecretStore;
use agent_types::{
    DeliveryStatus, NetworkingRequest, NetworkingResponse, PromptRequest, require_non_empty,
};
use axum::extract::State;
use axum::response::Json;
use lettre::message::Mailbox;
use std::sync::Arc;

pub const SMTP_SECRET: &str = "SMTP_API_KEY";

pub struct AppState {
    pub secrets: Arc<dyn SecretStore>,
    pub mailer: Arc<dyn MailTransport>,
    pub generator: Arc<dyn TextGenerator>,
    pub sender: Mailbox,
    pub subject: String,
}

pub fn polish_prompt(message: &str) -> String {
    format!(
        "Polish and personalize this outreach message for a professional context. \
         Keep it warm, concise, and actionable:\n\n{}",
        message
    )
}

// POST /networking-agent
pub async fn network(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NetworkingRequest>,
) -> Result<Json<NetworkingResponse>, AgentError> {
    PromptRequest::new(req.user_id.as_str(), req.prompt.as_str())
        .validate()
        .map_err(AgentError::invalid)?;
    let email = req.email.as_deref().unwrap_or("").trim().to_string();
    require_non_empty("email", &email).map_err(AgentError::invalid)?;
    let recipient: Mailbox = email
        .parse()
        .map_err(|e| AgentError::invalid(format!("email is not a valid address: {}", e)))?;

    let polished = generate_or(
        state.generator.as_ref(),
        &polish_prompt(&req.prompt),
        &req.prompt,
    )
    .await;

    let password = state.secrets.get_secret(SMTP_SECRET).await?;
    state
        .mailer
        .send(
            &password,
            OutboundEmail {
                from: state.sender.clone(),
                to: recipient,
                subject: state.subject.clone(),
                body: polished.clone(),
            },
        )
        .await?;

    Ok(Json(NetworkingResponse {
        status: DeliveryStatus::Sent,
        email,
        message: polished,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_common::secrets::StaticSecretStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        fail: bool,
        sent: Mutex<Vec<(String, OutboundEmail)>>,
    }

    #[async_trait]
    impl MailTransport for RecordingMailer {
        async fn send(&self, password: &str, email: OutboundEmail) -> Result<(), AgentError> {
            if self.fail {
                return Err(AgentError::upstream("smtp", "535 authentication failed"));
            }
            self.sent.lock().unwrap().push((password.to_string(), email));
            Ok(())
        }
    }

    struct ScriptedGenerator(Result<String, AgentError>);

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, AgentError> {
            self.0.clone()
        }
    }

    fn state(
        mailer: Arc<RecordingMailer>,
        reply: Result<String, AgentError>,
        secrets: StaticSecretStore,
    ) -> Arc<AppState> {
        Arc::new(AppState {
            secrets: Arc::new(secrets),
            mailer,
            generator: Arc::new(ScriptedGenerator(reply)),
            sender: "no-reply@aspira.ai".parse().unwrap(),
            subject: "Aspira Networking Invitation".to_string(),
        })
    }

    fn secrets() -> StaticSecretStore {
        StaticSecretStore::new().with(SMTP_SECRET, "sg-key")
    }

    fn request(email: &str) -> Json<NetworkingRequest> {
        Json(
            serde_json::from_value(json!({
                "user_id": "u1",
                "prompt": "hey want to pair on rust sometime",
                "email": email
            }))
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_sends_polished_message() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = state(
            mailer.clone(),
            Ok("Hi! Would you like to pair on Rust next week?".to_string()),
            secrets(),
        );

        let Json(resp) = network(State(state), request("ada@example.com")).await.unwrap();
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({
                "status": "sent",
                "email": "ada@example.com",
                "message": "Hi! Would you like to pair on Rust next week?"
            })
        );

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (password, email) = &sent[0];
        assert_eq!(password, "sg-key");
        assert_eq!(email.to.email.to_string(), "ada@example.com");
        assert_eq!(email.subject, "Aspira Networking Invitation");
        assert_eq!(email.body, "Hi! Would you like to pair on Rust next week?");
    }

    #[tokio::test]
    async fn test_polish_failure_sends_original_text() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = state(
            mailer.clone(),
            Err(AgentError::upstream_status("generate", 429, "rate limited")),
            secrets(),
        );

        let Json(resp) = network(State(state), request("ada@example.com")).await.unwrap();
        assert_eq!(resp.message, "hey want to pair on rust sometime");

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent[0].1.body, "hey want to pair on rust sometime");
    }

    #[tokio::test]
    async fn test_smtp_failure_is_hard() {
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let state = state(mailer, Ok("polished".to_string()), secrets());

        let err = network(State(state), request("ada@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "smtp");
    }

    #[tokio::test]
    async fn test_missing_secret_blocks_send() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = state(
            mailer.clone(),
            Ok("polished".to_string()),
            StaticSecretStore::new(),
        );

        let err = network(State(state), request("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Configuration { .. }));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_email_is_invalid_request() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = state(mailer.clone(), Ok("polished".to_string()), secrets());

        let req: NetworkingRequest =
            serde_json::from_value(json!({"user_id": "u1", "prompt": "intro me"})).unwrap();
        let err = network(State(state), Json(req)).await.unwrap_err();
        assert_eq!(err, AgentError::invalid("email must not be empty"));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_invalid_email() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = state(mailer.clone(), Ok("polished".to_string()), secrets());

        let err = network(State(state), request("not an address"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidRequest { .. }));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }
}
