//! Aspira Router: fans one learner prompt out to every registered agent
//! and returns their replies keyed by agent name.
//!
//! Default: http://127.0.0.1:9200/

mod config;
mod fanout;
mod registry;
mod routes;

use agent_common::server;
use config::RouterConfig;
use fanout::Dispatcher;
use registry::AgentRegistry;
use routes::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = RouterConfig::from_env();
    let registry = match &config.agents_file {
        Some(path) => AgentRegistry::load(path),
        None => AgentRegistry::local(),
    }
    .expect("Failed to load agent registry");

    for agent in registry.agents() {
        log::info!("[ROUTER] Registered {} -> {}", agent.name, agent.endpoint);
    }
    log::info!(
        "[ROUTER] {} agents, deadline {:?}",
        registry.len(),
        config.deadline
    );

    let state = Arc::new(AppState {
        dispatcher: Dispatcher::new(server::http_client(), Arc::new(registry), config.deadline),
    });

    let app = axum::Router::new()
        .route("/ping", axum::routing::get(server::ping))
        .route("/execute-prompt", axum::routing::post(routes::execute_prompt))
        .route("/agents", axum::routing::get(routes::list_agents))
        .with_state(state);

    server::serve(app, &config.server, "Router")
        .await
        .expect("Server error");
}
