//! ToolAdapter：把 search_query 交给搜索能力，结果序列化后写入 search_results
//!
//! 不做任何推理；失败与其它阶段一样走 error 短路。

use async_trait::async_trait;

use crate::agents::Agent;
use crate::core::{ResearchError, SharedState, StateUpdate};
use crate::tools::{SearchError, ToolExecutor};

pub struct ToolAdapter {
    executor: ToolExecutor,
}

impl ToolAdapter {
    pub fn new(executor: ToolExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Agent for ToolAdapter {
    fn name(&self) -> &'static str {
        "ToolAdapter"
    }

    async fn run(&self, state: &SharedState) -> Result<StateUpdate, ResearchError> {
        let query = state
            .search_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or(SearchError::EmptyQuery)?;

        tracing::info!(query, "calling search tool");
        let results = self.executor.execute(query).await?;
        Ok(StateUpdate {
            search_results: Some(results),
            ..Default::default()
        })
    }
}
