//! Networking Agent Service: polishes an outreach message and emails it.
//!
//! Default: http://127.0.0.1:9204/

mod mailer;
mod routes;

use agent_common::config::{GcpConfig, ServerConfig, env_or};
use agent_common::genai::GeminiClient;
use agent_common::secrets::secret_store_from_env;
use agent_common::server;
use routes::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let server_config = ServerConfig::from_env("NETWORKING_AGENT_PORT", 9204);
    let gcp = GcpConfig::from_env();
    let http = server::http_client();

    let sender = env_or("MAIL_FROM", "no-reply@aspira.ai")
        .parse()
        .expect("MAIL_FROM must be a valid mailbox");

    let state = Arc::new(AppState {
        secrets: secret_store_from_env(http.clone(), &gcp),
        mailer: Arc::new(mailer::SmtpMailer::new(mailer::SmtpConfig::from_env())),
        generator: Arc::new(GeminiClient::new(http, &gcp)),
        sender,
        subject: env_or("MAIL_SUBJECT", "Aspira Networking Invitation"),
    });

    let app = axum::Router::new()
        .route("/ping", axum::routing::get(server::ping))
        .route("/networking-agent", axum::routing::post(routes::network))
        .with_state(state);

    server::serve(app, &server_config, "Networking Agent Service")
        .await
        .expect("Server error");
}
