//! Course Finder Service: finds video courses for a learning goal and
//! summarizes each one.
//!
//! Default: http://127.0.0.1:9201/

mod routes;
mod youtube_api;

use agent_common::config::{GcpConfig, ServerConfig};
use agent_common::genai::GeminiClient;
use agent_common::secrets::secret_store_from_env;
use agent_common::server;
use routes::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let server_config = ServerConfig::from_env("COURSE_FINDER_PORT", 9201);
    let gcp = GcpConfig::from_env();
    let http = server::http_client();

    let state = Arc::new(AppState {
        secrets: secret_store_from_env(http.clone(), &gcp),
        search: Arc::new(youtube_api::YouTubeClient::new(http.clone())),
        generator: Arc::new(GeminiClient::new(http, &gcp)),
    });

    let app = axum::Router::new()
        .route("/ping", axum::routing::get(server::ping))
        .route("/course-finder", axum::routing::post(routes::find_courses))
        .with_state(state);

    server::serve(app, &server_config, "Course Finder Service")
        .await
        .expect("Server error");
}
