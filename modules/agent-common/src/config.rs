use std::env;

/// Read an environment variable, falling back to `default` when unset or blank.
pub fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset or unparsable.
pub fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Google Cloud settings shared by every service.
#[derive(Debug, Clone)]
pub struct GcpConfig {
    pub project: String,
    pub region: String,
    pub vertex_location: String,
    pub model: String,
    /// Bearer token for Google REST APIs. Unset when running behind a proxy
    /// that injects credentials.
    pub access_token: Option<String>,
    /// Overrides the Vertex AI `generateContent` URL.
    pub generate_endpoint: Option<String>,
}

impl GcpConfig {
    pub fn from_env() -> Self {
        Self {
            project: env_or("GCP_PROJECT", "aspira"),
            region: env_or("REGION", "asia-south1"),
            vertex_location: env_or("VERTEX_LOCATION", "us-central1"),
            model: env_or("GEMINI_MODEL", "gemini-1.5-pro"),
            access_token: env::var("GOOGLE_ACCESS_TOKEN")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            generate_endpoint: env::var("GEMINI_ENDPOINT")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn generate_content_url(&self) -> String {
        if let Some(endpoint) = &self.generate_endpoint {
            return endpoint.clone();
        }
        format!(
            "https://{loc}-aiplatform.googleapis.com/v1/projects/{project}/locations/{loc}/publishers/google/models/{model}:generateContent",
            loc = self.vertex_location,
            project = self.project,
            model = self.model,
        )
    }
}

/// Listen address for a single service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env(port_var: &str, default_port: u16) -> Self {
        Self {
            host: env_or("BIND_HOST", "127.0.0.1"),
            port: env_parse(port_var, default_port),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
