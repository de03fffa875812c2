//! Axum route handlers for the keep-updated agent.

use crate::scraper::{MAX_HEADLINES, PageFetcher, extract_headlines};
use agent_common::AgentError;
use agent_common::documents::DocumentStore;
use agent_common::genai::{TextGenerator, generate_or_empty};
use agent_types::{KeepUpdatedResponse, PromptRequest};
use axum::extract::State;
use axum::response::Json;
use serde_json::{Map, Value, json};
use std::sync::Arc;

pub const COLLECTION: &str = "updates";

pub struct AppState {
    pub fetcher: Arc<dyn PageFetcher>,
    pub documents: Arc<dyn DocumentStore>,
    pub generator: Arc<dyn TextGenerator>,
}

pub fn summary_prompt(headlines: &[String]) -> String {
    let combined = if headlines.is_empty() {
        "No headlines found.".to_string()
    } else {
        headlines.join("\n")
    };
    format!(
        "Summarize these headlines into exactly three concise bullet points:\n\n{}",
        combined
    )
}

/// The prompt carries the page to watch; only absolute http(s) URLs are accepted.
fn target_url(prompt: &str) -> Result<reqwest::Url, AgentError> {
    let url = reqwest::Url::parse(prompt.trim())
        .map_err(|e| AgentError::invalid(format!("prompt must be a URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AgentError::invalid(format!(
            "unsupported URL scheme '{}'",
            other
        ))),
    }
}

// POST /keep-updated
pub async fn keep_updated(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PromptRequest>,
) -> Result<Json<KeepUpdatedResponse>, AgentError> {
    req.validate().map_err(AgentError::invalid)?;
    let url = target_url(&req.prompt)?;

    let html = state.fetcher.fetch(url.as_str()).await?;
    let headlines = extract_headlines(&html, MAX_HEADLINES);
    log::info!(
        "[KEEP_UPDATED] {} headlines from {} for user {}",
        headlines.len(),
        url,
        req.user_id
    );

    let summary = generate_or_empty(state.generator.as_ref(), &summary_prompt(&headlines)).await;

    let mut document = Map::new();
    document.insert("headlines".to_string(), json!(headlines));
    document.insert("summary".to_string(), Value::String(summary.clone()));
    state
        .documents
        .set(COLLECTION, &req.user_id, document, true)
        .await?;

    Ok(Json(KeepUpdatedResponse { headlines, summary }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_common::documents::SqliteDocumentStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakePage {
        html: Result<String, AgentError>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakePage {
        fn new(html: Result<String, AgentError>) -> Arc<Self> {
            Arc::new(Self {
                html,
                fetched: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PageFetcher for FakePage {
        async fn fetch(&self, url: &str) -> Result<String, AgentError> {
            self.fetched.lock().unwrap().push(url.to_string());
            self.html.clone()
        }
    }

    struct RecordingGenerator {
        reply: Result<String, AgentError>,
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingGenerator {
        fn new(reply: Result<String, AgentError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn seven_headlines() -> String {
        (1..=7).map(|i| format!("<h2>Story {}</h2>", i)).collect()
    }

    #[tokio::test]
    async fn test_first_five_headlines_summarized_and_stored() {
        let documents = Arc::new(SqliteDocumentStore::open(":memory:").unwrap());
        let generator = RecordingGenerator::new(Ok("- a\n- b\n- c".to_string()));
        let state = Arc::new(AppState {
            fetcher: FakePage::new(Ok(seven_headlines())),
            documents: documents.clone(),
            generator: generator.clone(),
        });

        let Json(resp) = keep_updated(
            State(state),
            Json(PromptRequest::new("u1", "https://news.example.com/")),
        )
        .await
        .unwrap();

        assert_eq!(
            resp.headlines,
            vec!["Story 1", "Story 2", "Story 3", "Story 4", "Story 5"]
        );
        assert_eq!(resp.summary, "- a\n- b\n- c");

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].ends_with("Story 1\nStory 2\nStory 3\nStory 4\nStory 5"));

        let stored = documents.get(COLLECTION, "u1").await.unwrap().unwrap();
        assert_eq!(stored["headlines"].as_array().unwrap().len(), 5);
        assert_eq!(stored["summary"], json!("- a\n- b\n- c"));
    }

    #[tokio::test]
    async fn test_summary_soft_fails() {
        let state = Arc::new(AppState {
            fetcher: FakePage::new(Ok("<h2>Only one</h2>".to_string())),
            documents: Arc::new(SqliteDocumentStore::open(":memory:").unwrap()),
            generator: RecordingGenerator::new(Err(AgentError::upstream("generate", "boom"))),
        });

        let Json(resp) = keep_updated(
            State(state),
            Json(PromptRequest::new("u1", "https://news.example.com/")),
        )
        .await
        .unwrap();
        assert_eq!(resp.headlines, vec!["Only one"]);
        assert_eq!(resp.summary, "");
    }

    #[tokio::test]
    async fn test_empty_page_summarizes_placeholder() {
        let generator = RecordingGenerator::new(Ok("- nothing new".to_string()));
        let state = Arc::new(AppState {
            fetcher: FakePage::new(Ok("<p>nothing</p>".to_string())),
            documents: Arc::new(SqliteDocumentStore::open(":memory:").unwrap()),
            generator: generator.clone(),
        });

        let Json(resp) = keep_updated(
            State(state),
            Json(PromptRequest::new("u1", "http://quiet.example.com")),
        )
        .await
        .unwrap();
        assert!(resp.headlines.is_empty());
        assert!(generator.prompts.lock().unwrap()[0].ends_with("No headlines found."));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_hard() {
        let state = Arc::new(AppState {
            fetcher: FakePage::new(Err(AgentError::upstream_status("scrape", 404, "not found"))),
            documents: Arc::new(SqliteDocumentStore::open(":memory:").unwrap()),
            generator: RecordingGenerator::new(Ok("unused".to_string())),
        });

        let err = keep_updated(
            State(state),
            Json(PromptRequest::new("u1", "https://gone.example.com/")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.stage(), "scrape");
    }

    #[tokio::test]
    async fn test_rejects_non_url_prompt() {
        let fetcher = FakePage::new(Ok(String::new()));
        let state = Arc::new(AppState {
            fetcher: fetcher.clone(),
            documents: Arc::new(SqliteDocumentStore::open(":memory:").unwrap()),
            generator: RecordingGenerator::new(Ok("unused".to_string())),
        });

        let err = keep_updated(State(state.clone()), Json(PromptRequest::new("u1", "rust news")))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidRequest { .. }));

        let err = keep_updated(
            State(state),
            Json(PromptRequest::new("u1", "file:///etc/passwd")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AgentError::InvalidRequest { .. }));
        assert!(fetcher.fetched.lock().unwrap().is_empty());
    }
}
