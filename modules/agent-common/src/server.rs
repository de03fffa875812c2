//! HTTP bootstrap shared by every service binary.

use crate::config::ServerConfig;
use agent_types::Ping;
use axum::response::Json;
use std::time::Duration;

/// GET /ping
pub async fn ping() -> Json<Ping> {
    Json(Ping { ok: true })
}

/// Outbound client shared by a service's collaborators.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(5)
        .pool_idle_timeout(Duration::from_secs(90))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

/// Bind and serve `app` with a permissive CORS layer until the process exits.
pub async fn serve(app: axum::Router, server: &ServerConfig, name: &str) -> std::io::Result<()> {
    let cors = tower_http::cors::CorsLayer::permissive();
    let app = app.layer(cors);

    let addr = server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("{} listening on http://{}", name, addr);

    axum::serve(listener, app).await
}
