//! Shared wire types for the agent services, the router and their callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Nesting limit for progress documents (the top-level object counts as 1).
pub const MAX_PROGRESS_DEPTH: usize = 4;

// =====================================================
// Common Types
// =====================================================

/// The unit of work submitted by a caller and forwarded to every agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptRequest {
    pub user_id: String,
    pub prompt: String,
}

impl PromptRequest {
    pub fn new(user_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            prompt: prompt.into(),
        }
    }

    /// Both fields must carry non-whitespace content.
    pub fn validate(&self) -> Result<(), String> {
        require_non_empty("user_id", &self.user_id)?;
        require_non_empty("prompt", &self.prompt)
    }
}

pub fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} must not be empty", field))
    } else {
        Ok(())
    }
}

/// Error body shared by every service: `{"detail": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Liveness response: `{"ok": true}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ping {
    pub ok: bool,
}

// =====================================================
// Course Finder
// =====================================================

fn default_max_results() -> i64 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseFinderRequest {
    pub user_id: String,
    pub prompt: String,
    #[serde(default = "default_max_results")]
    pub max_results: i64,
}

impl CourseFinderRequest {
    /// Requested result count clamped to the 1..=10 range the search API accepts.
    pub fn clamped_max_results(&self) -> u32 {
        self.max_results.clamp(1, 10) as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub title: String,
    pub url: Option<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseFinderResponse {
    pub courses: Vec<Course>,
}

// =====================================================
// Roadmap Maker
// =====================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoadmapResponse {
    pub roadmap: String,
}

// =====================================================
// Progress Tracker
// =====================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressAction {
    #[default]
    Get,
    Update,
}

/// A user's progress record, validated when it is decoded.
///
/// Keys must be non-empty, `null` values are rejected, and objects may nest
/// at most [`MAX_PROGRESS_DEPTH`] levels deep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ProgressDocument(Map<String, Value>);

impl ProgressDocument {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl TryFrom<Map<String, Value>> for ProgressDocument {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        check_object(&map, "progress", 1)?;
        Ok(Self(map))
    }
}

impl From<ProgressDocument> for Map<String, Value> {
    fn from(doc: ProgressDocument) -> Self {
        doc.0
    }
}

fn check_object(map: &Map<String, Value>, path: &str, depth: usize) -> Result<(), String> {
    if depth > MAX_PROGRESS_DEPTH {
        return Err(format!(
            "{} nests deeper than {} levels",
            path, MAX_PROGRESS_DEPTH
        ));
    }
    for (key, value) in map {
        if key.trim().is_empty() {
            return Err(format!("{} contains an empty key", path));
        }
        let child = format!("{}.{}", path, key);
        check_value(value, &child, depth)?;
    }
    Ok(())
}

fn check_value(value: &Value, path: &str, depth: usize) -> Result<(), String> {
    match value {
        Value::Null => Err(format!("{} must not be null", path)),
        Value::Object(inner) => check_object(inner, path, depth + 1),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| check_value(item, &format!("{}[{}]", path, i), depth)),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRequest {
    pub user_id: String,
    #[serde(default)]
    pub action: ProgressAction,
    #[serde(default)]
    pub progress: Option<ProgressDocument>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Updated,
    Fetched,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub status: ProgressStatus,
    pub progress: Map<String, Value>,
    pub insight: String,
}

// =====================================================
// Networking Agent
// =====================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkingRequest {
    pub user_id: String,
    pub prompt: String,
    /// Required; left optional so a missing address is reported as a
    /// validation error rather than a decode failure.
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkingResponse {
    pub status: DeliveryStatus,
    pub email: String,
    pub message: String,
}

// =====================================================
// Keep Updated
// =====================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeepUpdatedResponse {
    pub headlines: Vec<String>,
    pub summary: String,
}

// =====================================================
// Router
// =====================================================

/// Every registered agent's raw JSON reply, keyed by agent name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub user_id: String,
    pub results: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    pub endpoint: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prompt_request_validation() {
        assert!(PromptRequest::new("u1", "learn rust").validate().is_ok());

        let err = PromptRequest::new("  ", "learn rust").validate().unwrap_err();
        assert_eq!(err, "user_id must not be empty");

        let err = PromptRequest::new("u1", "").validate().unwrap_err();
        assert_eq!(err, "prompt must not be empty");
    }

    #[test]
    fn test_max_results_default_and_clamp() {
        let req: CourseFinderRequest =
            serde_json::from_value(json!({"user_id": "u1", "prompt": "rust"})).unwrap();
        assert_eq!(req.max_results, 5);
        assert_eq!(req.clamped_max_results(), 5);

        let req: CourseFinderRequest =
            serde_json::from_value(json!({"user_id": "u1", "prompt": "rust", "max_results": 50}))
                .unwrap();
        assert_eq!(req.clamped_max_results(), 10);

        let req: CourseFinderRequest =
            serde_json::from_value(json!({"user_id": "u1", "prompt": "rust", "max_results": -3}))
                .unwrap();
        assert_eq!(req.clamped_max_results(), 1);
    }

    #[test]
    fn test_progress_request_defaults_to_get() {
        // The router only forwards user_id and prompt
        let req: ProgressRequest =
            serde_json::from_value(json!({"user_id": "u1", "prompt": "how am I doing"})).unwrap();
        assert_eq!(req.action, ProgressAction::Get);
        assert!(req.progress.is_none());
    }

    #[test]
    fn test_progress_action_rejects_unknown() {
        let result: Result<ProgressRequest, _> =
            serde_json::from_value(json!({"user_id": "u1", "action": "delete"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_progress_document_accepts_nested() {
        let req: ProgressRequest = serde_json::from_value(json!({
            "user_id": "u1",
            "action": "update",
            "progress": {"rust": {"chapter": 3, "done": ["intro", "ownership"]}, "streak": 4}
        }))
        .unwrap();
        let doc = req.progress.unwrap();
        assert_eq!(doc.as_map()["streak"], json!(4));
    }

    #[test]
    fn test_progress_document_rejects_null_and_empty_keys() {
        let err = ProgressDocument::try_from(
            json!({"rust": {"chapter": null}}).as_object().unwrap().clone(),
        )
        .unwrap_err();
        assert_eq!(err, "progress.rust.chapter must not be null");

        let err =
            ProgressDocument::try_from(json!({"": 1}).as_object().unwrap().clone()).unwrap_err();
        assert!(err.contains("empty key"));
    }

    #[test]
    fn test_progress_document_depth_limit() {
        let ok = json!({"a": {"b": {"c": {"d": 1}}}});
        assert!(ProgressDocument::try_from(ok.as_object().unwrap().clone()).is_ok());

        let too_deep = json!({"a": {"b": {"c": {"d": {"e": 1}}}}});
        let err = ProgressDocument::try_from(too_deep.as_object().unwrap().clone()).unwrap_err();
        assert!(err.contains("deeper than 4"));
    }

    #[test]
    fn test_response_shapes() {
        let resp = NetworkingResponse {
            status: DeliveryStatus::Sent,
            email: "a@b.io".to_string(),
            message: "hi".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"status": "sent", "email": "a@b.io", "message": "hi"})
        );

        let resp = ProgressResponse {
            status: ProgressStatus::Fetched,
            progress: Map::new(),
            insight: String::new(),
        };
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"status": "fetched", "progress": {}, "insight": ""})
        );
    }
}
