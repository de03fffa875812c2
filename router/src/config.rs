use agent_common::config::{ServerConfig, env_parse};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub server: ServerConfig,
    /// End-to-end budget for one fan-out
    pub deadline: Duration,
    /// TOML registry; the built-in local registry is used when unset
    pub agents_file: Option<String>,
}

impl RouterConfig {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env("ROUTER_PORT", 9200),
            deadline: Duration::from_secs(env_parse("ROUTER_DEADLINE_SECS", 60u64).max(1)),
            agents_file: env::var("ROUTER_AGENTS_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}
