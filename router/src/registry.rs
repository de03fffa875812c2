//! Static agent registry, fixed at startup.

use agent_common::config::env_or;
use agent_types::PromptRequest;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Built-in registry: name, URL override variable, default endpoint.
const LOCAL_AGENTS: &[(&str, &str, &str)] = &[
    ("course_finder", "COURSE_FINDER_URL", "http://127.0.0.1:9201/course-finder"),
    ("roadmap_maker", "ROADMAP_MAKER_URL", "http://127.0.0.1:9202/roadmap-maker"),
    ("progress_tracker", "PROGRESS_TRACKER_URL", "http://127.0.0.1:9203/progress-tracker"),
    ("networking_agent", "NETWORKING_AGENT_URL", "http://127.0.0.1:9204/networking-agent"),
    ("keep_updated", "KEEP_UPDATED_URL", "http://127.0.0.1:9205/keep-updated"),
];

#[derive(Debug, Clone)]
pub struct AgentRegistration {
    pub name: String,
    pub endpoint: Url,
    /// Static fields sent to this agent in addition to the caller's request
    pub extra: Map<String, Value>,
}

impl AgentRegistration {
    pub fn new(name: &str, endpoint: &str) -> Result<Self, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("agent name must not be empty".to_string());
        }
        let endpoint = Url::parse(endpoint.trim())
            .map_err(|e| format!("agent '{}' has an invalid endpoint: {}", name, e))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(format!(
                "agent '{}' endpoint must be http(s), got '{}'",
                name,
                endpoint.scheme()
            ));
        }
        Ok(Self {
            name: name.to_string(),
            endpoint,
            extra: Map::new(),
        })
    }

    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    /// Body forwarded to the agent. The caller's `user_id` and `prompt`
    /// always override static extras of the same name.
    pub fn request_body(&self, req: &PromptRequest) -> Value {
        let mut body = self.extra.clone();
        body.insert("user_id".to_string(), Value::String(req.user_id.clone()));
        body.insert("prompt".to_string(), Value::String(req.prompt.clone()));
        Value::Object(body)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    agents: Vec<RegistryEntry>,
}

#[derive(Debug, Deserialize)]
struct RegistryEntry {
    name: String,
    endpoint: String,
    #[serde(default)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<AgentRegistration>,
}

impl AgentRegistry {
    pub fn new(agents: Vec<AgentRegistration>) -> Result<Self, String> {
        if agents.is_empty() {
            return Err("registry must list at least one agent".to_string());
        }
        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.name.as_str()) {
                return Err(format!("agent '{}' is registered twice", agent.name));
            }
        }
        Ok(Self { agents })
    }

    /// Parse a registry file:
    ///
    /// ```toml
    /// [[agents]]
    /// name = "networking_agent"
    /// endpoint = "http://127.0.0.1:9204/networking-agent"
    /// extra = { email = "mentors@example.com" }
    /// ```
    pub fn from_toml(text: &str) -> Result<Self, String> {
        let file: RegistryFile =
            toml::from_str(text).map_err(|e| format!("invalid registry file: {}", e))?;
        let agents = file
            .agents
            .into_iter()
            .map(|entry| {
                AgentRegistration::new(&entry.name, &entry.endpoint)
                    .map(|agent| agent.with_extra(entry.extra))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(agents)
    }

    pub fn load(path: &str) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read registry {}: {}", path, e))?;
        Self::from_toml(&text)
    }

    /// The five agents on localhost, each endpoint overridable via its `*_URL` variable.
    pub fn local() -> Result<Self, String> {
        let agents = LOCAL_AGENTS
            .iter()
            .map(|(name, var, default)| AgentRegistration::new(name, &env_or(var, default)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(agents)
    }

    pub fn agents(&self) -> &[AgentRegistration] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }
}
