//! 工具执行器
//!
//! 持有搜索后端与结果大小上限，execute(query) 调用搜索并把命中序列化为 JSON 文本；
//! 超过 max_result_chars 时截断并追加 ...[truncated]；每次调用输出结构化审计日志（JSON）。

use std::sync::Arc;
use std::time::Instant;

use crate::tools::{SearchError, SearchHit, SearchTool};

pub struct ToolExecutor {
    search: Arc<dyn SearchTool>,
    max_result_chars: usize,
}

impl ToolExecutor {
    pub fn new(search: Arc<dyn SearchTool>, max_result_chars: usize) -> Self {
        Self {
            search,
            max_result_chars,
        }
    }

    /// 执行一次搜索，返回序列化后的结果文本
    pub async fn execute(&self, query: &str) -> Result<String, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let start = Instant::now();
        let result = self.search.search(query).await;

        let (ok, outcome, hits) = match &result {
            Ok(hits) => (true, "ok", hits.len()),
            Err(_) => (false, "error", 0),
        };
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": self.search.name(),
            "ok": ok,
            "outcome": outcome,
            "hits": hits,
            "duration_ms": start.elapsed().as_millis() as u64,
            "query_preview": preview(query),
        });
        tracing::info!(audit = %audit, "tool");

        let hits = result?;
        Ok(self.render(&hits))
    }

    fn render(&self, hits: &[SearchHit]) -> String {
        let body = serde_json::to_string_pretty(hits).unwrap_or_else(|_| "[]".to_string());
        if body.chars().count() > self.max_result_chars {
            body.chars().take(self.max_result_chars).collect::<String>() + "\n...[truncated]"
        } else {
            body
        }
    }
}

fn preview(query: &str) -> String {
    if query.chars().count() > 200 {
        format!("{}...", query.chars().take(200).collect::<String>())
    } else {
        query.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::MockSearchTool;

    #[tokio::test]
    async fn test_serializes_hits() {
        let executor = ToolExecutor::new(Arc::new(MockSearchTool::echo()), 8000);
        let out = executor.execute("solar cells").await.unwrap();
        let hits: Vec<SearchHit> = serde_json::from_str(&out).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].link, "https://example.org/solar-cells");
    }

    #[tokio::test]
    async fn test_truncates_large_results() {
        let executor = ToolExecutor::new(Arc::new(MockSearchTool::echo()), 20);
        let out = executor.execute("solar cells").await.unwrap();
        assert!(out.ends_with("...[truncated]"));
        assert_eq!(out.chars().count(), 20 + "\n...[truncated]".chars().count());
    }

    #[tokio::test]
    async fn test_empty_query_never_reaches_backend() {
        let search = Arc::new(MockSearchTool::echo());
        let executor = ToolExecutor::new(search.clone(), 8000);
        assert_eq!(executor.execute("  ").await, Err(SearchError::EmptyQuery));
        assert!(search.queries().is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let executor = ToolExecutor::new(Arc::new(MockSearchTool::failing(SearchError::Status(429))), 8000);
        assert_eq!(executor.execute("q").await, Err(SearchError::Status(429)));
    }
}
