//! 搜索能力抽象
//!
//! 所有信息检索后端实现 SearchTool：给定查询串，返回结构化命中列表或错误。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 单条搜索命中
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Search tool received no query.")]
    EmptyQuery,

    #[error("Search tool failed: {0}")]
    Request(String),

    #[error("Search tool failed: HTTP {0}")]
    Status(u16),

    #[error("Search tool failed: could not decode response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait SearchTool: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError>;
}
