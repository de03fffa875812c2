//! Roadmap Maker Service: turns a learning goal into a week-by-week roadmap.
//!
//! Default: http://127.0.0.1:9202/

mod routes;

use agent_common::config::{GcpConfig, ServerConfig};
use agent_common::genai::GeminiClient;
use agent_common::server;
use routes::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let server_config = ServerConfig::from_env("ROADMAP_MAKER_PORT", 9202);
    let gcp = GcpConfig::from_env();
    let http = server::http_client();

    let state = Arc::new(AppState {
        generator: Arc::new(GeminiClient::new(http, &gcp)),
    });

    let app = axum::Router::new()
        .route("/ping", axum::routing::get(server::ping))
        .route("/roadmap-maker", axum::routing::post(routes::roadmap))
        .with_state(state);

    server::serve(app, &server_config, "Roadmap Maker Service")
        .await
        .expect("Server error");
}
