//! Mock 搜索（用于测试，无需网络）

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::tools::{SearchError, SearchHit, SearchTool};

type Responder = dyn Fn(&str) -> Result<Vec<SearchHit>, SearchError> + Send + Sync;

/// 闭包脚本化的搜索；记录收到的每个查询
pub struct MockSearchTool {
    responder: Box<Responder>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockSearchTool {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<Vec<SearchHit>, SearchError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 每个查询返回一条以查询命名的命中
    pub fn echo() -> Self {
        Self::new(|query| {
            Ok(vec![SearchHit {
                title: format!("About {query}"),
                link: format!("https://example.org/{}", query.replace(' ', "-")),
                snippet: format!("Background material on {query}."),
            }])
        })
    }

    pub fn failing(err: SearchError) -> Self {
        Self::new(move |_| Err(err.clone()))
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SearchTool for MockSearchTool {
    fn name(&self) -> &str {
        "mock_search"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        (self.responder)(query)
    }
}
