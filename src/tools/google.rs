//! Google Custom Search JSON API
//!
//! GET {endpoint}?key=..&cx=..&q=..&num=..；响应 items[] 中取 title / link / snippet。
//! 请求带超时与 User-Agent；没有 items 字段（零结果）时返回空列表。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::tools::{SearchError, SearchHit, SearchTool};

pub const GOOGLE_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

const USER_AGENT: &str = concat!("deep-research/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchHit>,
}

pub struct GoogleSearchTool {
    client: Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
    num_results: u8,
}

impl GoogleSearchTool {
    pub fn new(
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
        timeout_secs: u64,
        num_results: u8,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: GOOGLE_SEARCH_ENDPOINT.to_string(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            // API 限制 num 取值 1..=10
            num_results: num_results.clamp(1, 10),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchTool for GoogleSearchTool {
    fn name(&self) -> &str {
        "google_search"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let num = self.num_results.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Request(e.without_url().to_string()))?;

        if !resp.status().is_success() {
            return Err(SearchError::Status(resp.status().as_u16()));
        }

        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.without_url().to_string()))?;
        Ok(body.items)
    }
}
