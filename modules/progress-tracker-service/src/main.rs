//! Progress Tracker Service: stores per-user learning progress and offers a
//! short insight on it.
//!
//! Default: http://127.0.0.1:9203/

mod routes;

use agent_common::config::{GcpConfig, ServerConfig, env_or};
use agent_common::documents::SqliteDocumentStore;
use agent_common::genai::GeminiClient;
use agent_common::server;
use routes::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let server_config = ServerConfig::from_env("PROGRESS_TRACKER_PORT", 9203);
    let gcp = GcpConfig::from_env();
    let db_path = env_or("PROGRESS_TRACKER_DB_PATH", "./progress_tracker.db");

    log::info!("Opening document store at: {}", db_path);
    let documents =
        Arc::new(SqliteDocumentStore::open(&db_path).expect("Failed to open document store"));

    let state = Arc::new(AppState {
        documents,
        generator: Arc::new(GeminiClient::new(server::http_client(), &gcp)),
    });

    let app = axum::Router::new()
        .route("/ping", axum::routing::get(server::ping))
        .route("/progress-tracker", axum::routing::post(routes::track))
        .with_state(state);

    server::serve(app, &server_config, "Progress Tracker Service")
        .await
        .expect("Server error");
}
