//! Keep Updated Service: scrapes headlines from a page, summarizes them and
//! keeps the latest digest per user.
//!
//! Default: http://127.0.0.1:9205/

mod routes;
mod scraper;

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

    let server_config = ServerConfig::from_env("KEEP_UPDATED_PORT", 9205);
    let gcp = GcpConfig::from_env();
    let db_path = env_or("KEEP_UPDATED_DB_PATH", "./keep_updated.db");
    let http = server::http_client();

    log::info!("Opening document store at: {}", db_path);
    let documents =
        Arc::new(SqliteDocumentStore::open(&db_path).expect("Failed to open document store"));

    let state = Arc::new(AppState {
        fetcher: Arc::new(scraper::HttpPageFetcher::new(http.clone())),
        documents,
        generator: Arc::new(GeminiClient::new(http, &gcp)),
    });

    let app = axum::Router::new()
        .route("/ping", axum::routing::get(server::ping))
        .route("/keep-updated", axum::routing::post(routes::keep_updated))
        .with_state(state);

    server::serve(app, &server_config, "Keep Updated Service")
        .await
        .expect("Server error");
}
