//! Searcher：把当前问题改写成一条搜索引擎查询
//!
//! 输出护栏：模型生成的查询若含高级搜索运算符（或为空），丢弃并原样使用问题文本。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;

use crate::agents::{Agent, PromptBuilder};
use crate::core::{ResearchError, SharedState, StateUpdate};
use crate::llm::LlmClient;
use crate::safety::SafetyGuard;

const NAME: &str = "Searcher";

pub struct Searcher {
    llm: Arc<dyn LlmClient>,
    guard: Arc<SafetyGuard>,
    prompt: PromptBuilder,
}

impl Searcher {
    pub fn new(llm: Arc<dyn LlmClient>, guard: Arc<SafetyGuard>, instructions: impl Into<String>) -> Self {
        Self {
            llm,
            guard,
            prompt: PromptBuilder::new(instructions),
        }
    }
}

/// 取第一行非空内容，去掉引号与反引号
fn clean_query(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
        .replace(['"', '`'], "")
        .trim()
        .to_string()
}

#[async_trait]
impl Agent for Searcher {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, state: &SharedState) -> Result<StateUpdate, ResearchError> {
        let question = state
            .current_question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or(ResearchError::MissingState {
                stage: NAME,
                field: "current question",
            })?;
        tracing::info!(question, "searcher: formulating query");

        let year = chrono::Utc::now().year().to_string();
        let messages = self
            .prompt
            .build_with(&[("current_year", year.as_str())], format!("[{question}]"));
        let raw = self
            .llm
            .complete(&messages)
            .await
            .map_err(|e| ResearchError::llm(NAME, e))?;

        let formulated = clean_query(&raw);
        let search_query = if formulated.is_empty() || !self.guard.validate_search_query(&formulated) {
            tracing::warn!(formulated = %formulated, "discarding formulated query, using question verbatim");
            question.to_string()
        } else {
            formulated
        };

        tracing::info!(query = %search_query, "formulated query");
        Ok(StateUpdate {
            search_query: Some(search_query),
            ..Default::default()
        })
    }
}
