//! Reflector：审视最新答案，决定是否追加关键的后续问题
//!
//! 候选问题仅在不与 original_plan、当前队列（精确文本）重复时入队。loop_count 每次必加一。
//! 这是唯一 FailOpen 的阶段：调用或解析失败视为「没有新问题」。

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::{parse_string_list, Agent, AnswerRecord, PromptBuilder};
use crate::core::{Decision, ErrorPolicy, ResearchError, SharedState, StateUpdate};
use crate::llm::LlmClient;

const NAME: &str = "Reflector";

pub struct Reflector {
    llm: Arc<dyn LlmClient>,
    prompt: PromptBuilder,
}

impl Reflector {
    pub fn new(llm: Arc<dyn LlmClient>, instructions: impl Into<String>) -> Self {
        Self {
            llm,
            prompt: PromptBuilder::new(instructions),
        }
    }

    async fn propose(
        &self,
        latest: &str,
        plan: &[String],
        queue: &[String],
    ) -> Result<Vec<String>, ResearchError> {
        let record: AnswerRecord = serde_json::from_str(latest)
            .map_err(|e| ResearchError::malformed(NAME, e.to_string()))?;
        let to_json = |items: &[String]| serde_json::to_string(items).unwrap_or_else(|_| "[]".into());

        let payload = format!(
            "**Original Plan:** {}\n**Current Queue:** {}\n**Latest Q&A:** Question: \"{}\" Answer: \"{}\"",
            to_json(plan),
            to_json(queue),
            record.question,
            record.answer
        );
        let raw = self
            .llm
            .complete(&self.prompt.build(payload))
            .await
            .map_err(|e| ResearchError::llm(NAME, e))?;
        parse_string_list(NAME, &raw)
    }
}

#[async_trait]
impl Agent for Reflector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn policy(&self) -> ErrorPolicy {
        ErrorPolicy::FailOpen
    }

    async fn run(&self, state: &SharedState) -> Result<StateUpdate, ResearchError> {
        tracing::info!(loop_count = state.loop_count, "reflector: reflecting on answer");

        let latest = state.latest_answer().ok_or(ResearchError::MissingState {
            stage: NAME,
            field: "synthesized answer",
        })?;
        let plan = state.original_plan.as_deref().unwrap_or_default();
        let mut queue = state.questions_to_answer.clone();

        let candidates = self
            .policy()
            .apply(NAME, self.propose(latest, plan, &queue).await)?;

        for candidate in candidates {
            let candidate = candidate.trim();
            if candidate.is_empty() {
                continue;
            }
            if plan.iter().any(|q| q == candidate) || queue.iter().any(|q| q == candidate) {
                tracing::debug!(candidate, "skipping duplicate question");
                continue;
            }
            tracing::info!(candidate, "new question queued");
            queue.push(candidate.to_string());
        }

        let loop_count = state.loop_count + 1;
        if queue.is_empty() {
            return Ok(StateUpdate {
                decision: Some(Decision::Complete),
                loop_count: Some(loop_count),
                ..Default::default()
            });
        }

        let next = queue.remove(0);
        Ok(StateUpdate {
            decision: Some(Decision::Continue),
            questions_to_answer: Some(queue),
            current_question: Some(next),
            loop_count: Some(loop_count),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, MockLlmClient};

    fn reflector(llm: MockLlmClient) -> Reflector {
        Reflector::new(Arc::new(llm), crate::agents::prompts::REFLECTOR_PROMPT)
    }

    fn state(plan: &[&str], queue: &[&str], loop_count: u32) -> SharedState {
        let record = AnswerRecord {
            question: plan[0].to_string(),
            answer: "An answer [https://a.example].".to_string(),
        };
        SharedState {
            original_plan: Some(plan.iter().map(|s| s.to_string()).collect()),
            questions_to_answer: queue.iter().map(|s| s.to_string()).collect(),
            synthesized_answers: vec![serde_json::to_string(&record).unwrap()],
            loop_count,
            ..SharedState::new("topic")
        }
    }

    #[tokio::test]
    async fn test_continue_pops_queue() {
        let update = reflector(MockLlmClient::fixed("[]"))
            .run(&state(&["a", "b", "c"], &["b", "c"], 0))
            .await
            .unwrap();
        assert_eq!(update.decision, Some(Decision::Continue));
        assert_eq!(update.current_question.as_deref(), Some("b"));
        assert_eq!(update.questions_to_answer, Some(vec!["c".to_string()]));
        assert_eq!(update.loop_count, Some(1));
    }

    #[tokio::test]
    async fn test_complete_when_queue_empty() {
        let update = reflector(MockLlmClient::fixed("[]"))
            .run(&state(&["a"], &[], 2))
            .await
            .unwrap();
        assert_eq!(update.decision, Some(Decision::Complete));
        assert_eq!(update.loop_count, Some(3));
        assert!(update.current_question.is_none());
    }

    #[tokio::test]
    async fn test_new_question_appended() {
        let update = reflector(MockLlmClient::fixed(r#"["What are the recycling costs?"]"#))
            .run(&state(&["a", "b"], &["b"], 0))
            .await
            .unwrap();
        assert_eq!(update.current_question.as_deref(), Some("b"));
        assert_eq!(
            update.questions_to_answer,
            Some(vec!["What are the recycling costs?".to_string()])
        );
    }

    #[tokio::test]
    async fn test_question_in_plan_is_ignored() {
        // "a" 已在计划中（且已回答），不能重新入队
        let update = reflector(MockLlmClient::fixed(r#"["a"]"#))
            .run(&state(&["a"], &[], 0))
            .await
            .unwrap();
        assert_eq!(update.decision, Some(Decision::Complete));
        assert!(update.questions_to_answer.is_none());
    }

    #[tokio::test]
    async fn test_duplicates_within_proposal_collapsed() {
        let update = reflector(MockLlmClient::fixed(r#"["x", "x", "b"]"#))
            .run(&state(&["a", "b"], &["b"], 0))
            .await
            .unwrap();
        assert_eq!(update.current_question.as_deref(), Some("b"));
        assert_eq!(update.questions_to_answer, Some(vec!["x".to_string()]));
    }

    #[tokio::test]
    async fn test_llm_failure_degrades_to_no_questions() {
        let update = reflector(MockLlmClient::failing(LlmError::Request("HTTP 503".into())))
            .run(&state(&["a", "b"], &["b"], 4))
            .await
            .unwrap();
        assert_eq!(update.decision, Some(Decision::Continue));
        assert_eq!(update.current_question.as_deref(), Some("b"));
        assert_eq!(update.loop_count, Some(5));
    }

    #[tokio::test]
    async fn test_parse_failure_degrades_to_no_questions() {
        let update = reflector(MockLlmClient::fixed("Nothing else is needed."))
            .run(&state(&["a"], &[], 0))
            .await
            .unwrap();
        assert_eq!(update.decision, Some(Decision::Complete));
        assert_eq!(update.loop_count, Some(1));
    }

    #[tokio::test]
    async fn test_missing_answer_is_an_error() {
        let err = reflector(MockLlmClient::fixed("[]"))
            .run(&SharedState::new("topic"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResearchError::MissingState { stage: "Reflector", .. }));
    }

    #[test]
    fn test_policy_is_fail_open() {
        assert_eq!(
            reflector(MockLlmClient::fixed("[]")).policy(),
            ErrorPolicy::FailOpen
        );
    }
}
