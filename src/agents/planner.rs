//! Planner：把主题拆解成有序的研究问题
//!
//! 先过两级护栏（确定性校验 → LLM 语义分类），再请求分解；解析为 1..=max_questions 个问题，
//! 第一个成为 current_question，其余进入队列。

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::{parse_string_list, Agent, PromptBuilder};
use crate::core::{ResearchError, SharedState, StateUpdate};
use crate::llm::LlmClient;
use crate::safety::SafetyGuard;

const NAME: &str = "Planner";

pub struct Planner {
    llm: Arc<dyn LlmClient>,
    guard: Arc<SafetyGuard>,
    prompt: PromptBuilder,
    max_questions: usize,
}

impl Planner {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        guard: Arc<SafetyGuard>,
        instructions: impl Into<String>,
        max_questions: usize,
    ) -> Self {
        Self {
            llm,
            guard,
            prompt: PromptBuilder::new(instructions),
            max_questions: max_questions.max(1),
        }
    }

    /// 去空白、去重、截断到上限
    fn normalize(&self, plan: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        let questions: Vec<String> = plan
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty() && seen.insert(q.clone()))
            .collect();

        if questions.len() > self.max_questions {
            tracing::warn!(
                got = questions.len(),
                max = self.max_questions,
                "plan too long, truncating"
            );
        }
        questions.into_iter().take(self.max_questions).collect()
    }
}

#[async_trait]
impl Agent for Planner {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, state: &SharedState) -> Result<StateUpdate, ResearchError> {
        tracing::info!("planner: creating research plan");

        let query = state.original_query.as_str();
        if query.trim().is_empty() {
            return Err(ResearchError::MissingState {
                stage: NAME,
                field: "original query",
            });
        }

        if !self.guard.validate_input(query) {
            return Err(ResearchError::InputRejected);
        }
        if !self.guard.check_safety_with_llm(query).await {
            return Err(ResearchError::UnsafeRequest);
        }

        let max = self.max_questions.to_string();
        let messages = self
            .prompt
            .build_with(&[("max_questions", max.as_str())], query);
        let raw = self
            .llm
            .complete(&messages)
            .await
            .map_err(|e| ResearchError::llm(NAME, e))?;

        let plan = self.normalize(parse_string_list(NAME, &raw)?);
        let Some(first) = plan.first().cloned() else {
            return Err(ResearchError::malformed(NAME, "empty plan"));
        };
        if first.to_uppercase().starts_with("ERROR:") {
            tracing::warn!(reply = %first, "planner refused the topic");
            return Err(ResearchError::UnsafeRequest);
        }

        tracing::info!(steps = plan.len(), "plan created");
        Ok(StateUpdate {
            questions_to_answer: Some(plan[1..].to_vec()),
            current_question: Some(first),
            original_plan: Some(plan),
            ..Default::default()
        })
    }
}
