//! YouTube Data API v3 search client.

use agent_common::AgentError;
use agent_common::error::{transport_error, truncate_error};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
pub const STAGE: &str = "youtube_search";

/// One search hit, fields as the API returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoItem {
    pub title: Option<String>,
    pub video_id: Option<String>,
    pub description: Option<String>,
}

impl VideoItem {
    pub fn watch_url(&self) -> Option<String> {
        self.video_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| format!("https://www.youtube.com/watch?v={}", id))
    }
}

#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search(
        &self,
        api_key: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<VideoItem>, AgentError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: Option<SearchItemId>,
    #[serde(default)]
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn parse_search_response(body: &str) -> Result<Vec<VideoItem>, AgentError> {
    let parsed: SearchResponse =
        serde_json::from_str(body).map_err(|e| AgentError::decode(STAGE, e.to_string()))?;
    Ok(parsed
        .items
        .into_iter()
        .map(|item| {
            let snippet = item.snippet;
            VideoItem {
                video_id: item.id.and_then(|id| id.video_id),
                title: snippet.as_ref().and_then(|s| s.title.clone()),
                description: snippet.and_then(|s| s.description),
            }
        })
        .collect())
}

pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: SEARCH_URL.to_string(),
        }
    }
}

#[async_trait]
impl VideoSearch for YouTubeClient {
    async fn search(
        &self,
        api_key: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<VideoItem>, AgentError> {
        let max_results = max_results.to_string();
        let response = self
            .http
            .get(&self.base_url)
            .timeout(Duration::from_secs(20))
            .query(&[
                ("q", query),
                ("part", "snippet"),
                ("maxResults", max_results.as_str()),
                ("type", "video"),
                ("safeSearch", "none"),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|e| transport_error(STAGE, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(STAGE, e))?;

        if !status.is_success() {
            return Err(AgentError::upstream_status(
                STAGE,
                status.as_u16(),
                truncate_error(&body),
            ));
        }

        parse_search_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let body = r#"{
            "kind": "youtube#searchListResponse",
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "abc123"},
                 "snippet": {"title": "Rust in 100 Seconds", "description": "Learn Rust fast"}},
                {"id": {"kind": "youtube#channel"}, "snippet": {"description": ""}}
            ]
        }"#;
        let items = parse_search_response(body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title.as_deref(), Some("Rust in 100 Seconds"));
        assert_eq!(
            items[0].watch_url().as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
        assert_eq!(items[1].title, None);
        assert_eq!(items[1].watch_url(), None);
    }

    #[test]
    fn test_parse_search_response_without_items() {
        assert!(parse_search_response(r#"{"pageInfo": {}}"#).unwrap().is_empty());
        let err = parse_search_response("quota").unwrap_err();
        assert_eq!(err.stage(), STAGE);
    }
}
