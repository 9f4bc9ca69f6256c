//! Analyzer：根据搜索结果写出带引用的单段答案
//!
//! 模型输出必须是只含 question / answer 两个键的 JSON 对象；answer 经 sanitize_text 脱敏后，
//! 序列化的记录追加到 synthesized_answers。

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agents::{extract_json, Agent, PromptBuilder};
use crate::core::{ResearchError, SharedState, StateUpdate};
use crate::llm::LlmClient;
use crate::safety::sanitize_text;

const NAME: &str = "Analyzer";

/// 一条问答记录（synthesized_answers 的元素即其 JSON 编码）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerRecord {
    pub question: String,
    pub answer: String,
}

pub struct Analyzer {
    llm: Arc<dyn LlmClient>,
    prompt: PromptBuilder,
}

impl Analyzer {
    pub fn new(llm: Arc<dyn LlmClient>, instructions: impl Into<String>) -> Self {
        Self {
            llm,
            prompt: PromptBuilder::new(instructions),
        }
    }
}

#[async_trait]
impl Agent for Analyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, state: &SharedState) -> Result<StateUpdate, ResearchError> {
        let question = state.current_question.as_deref().ok_or(ResearchError::MissingState {
            stage: NAME,
            field: "current question",
        })?;
        let results = state
            .search_results
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .ok_or(ResearchError::MissingState {
                stage: NAME,
                field: "search results",
            })?;
        tracing::info!(question, "analyzer: synthesizing answer");

        let payload = format!("**Question:** {question}\n**Search Results:**\n{results}");
        let raw = self
            .llm
            .complete(&self.prompt.build(payload))
            .await
            .map_err(|e| ResearchError::llm(NAME, e))?;

        let json = extract_json(&raw, '{', '}');
        let mut record: AnswerRecord = serde_json::from_str(json)
            .map_err(|e| ResearchError::malformed(NAME, format!("{e}: {json}")))?;
        record.answer = sanitize_text(&record.answer);

        let encoded = serde_json::to_string(&record)
            .map_err(|e| ResearchError::malformed(NAME, e.to_string()))?;
        Ok(StateUpdate {
            new_answer: Some(encoded),
            ..Default::default()
        })
    }
}
