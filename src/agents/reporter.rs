//! Reporter：终止阶段，总是产出 final_report
//!
//! - 出错路径：已有拒绝报告则保留，否则把 error 渲染成面向用户的文字
//! - 无数据：固定的「无数据」报告
//! - 正常：按主题组织全部问答，保留引用；模型无可用内容或调用失败时写入失败说明而不是抛错

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::agents::{Agent, PromptBuilder};
use crate::core::{ResearchError, SharedState, StateUpdate};
use crate::llm::LlmClient;

pub const NO_DATA_REPORT: &str = "No research data available to report.";
pub const EMPTY_RESPONSE_REPORT: &str =
    "Reporter failed: model returned an empty response or was blocked.";

pub struct Reporter {
    llm: Arc<dyn LlmClient>,
    prompt: PromptBuilder,
}

impl Reporter {
    pub fn new(llm: Arc<dyn LlmClient>, instructions: impl Into<String>) -> Self {
        Self {
            llm,
            prompt: PromptBuilder::new(instructions),
        }
    }
}

/// 把 JSON 编码的问答记录还原为对象，解析失败的保留原字符串
fn research_data(answers: &[String]) -> String {
    let records: Vec<Value> = answers
        .iter()
        .map(|a| serde_json::from_str(a).unwrap_or_else(|_| Value::String(a.clone())))
        .collect();
    serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string())
}

#[async_trait]
impl Agent for Reporter {
    fn name(&self) -> &'static str {
        "Reporter"
    }

    async fn run(&self, state: &SharedState) -> Result<StateUpdate, ResearchError> {
        if let Some(error) = &state.error {
            if state.final_report.is_some() {
                return Ok(StateUpdate::default());
            }
            tracing::warn!(error = %error, "reporter: rendering error report");
            return Ok(StateUpdate::report(format!(
                "Research could not be completed: {error}"
            )));
        }

        if state.synthesized_answers.is_empty() {
            return Ok(StateUpdate::report(NO_DATA_REPORT));
        }

        tracing::info!(
            answers = state.synthesized_answers.len(),
            "reporter: compiling final report"
        );
        let payload = format!(
            "**Research Data:**\n{}",
            research_data(&state.synthesized_answers)
        );

        let report = match self.llm.complete(&self.prompt.build(payload)).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => EMPTY_RESPONSE_REPORT.to_string(),
            Err(e) if e.is_empty_or_blocked() => {
                tracing::error!(error = %e, "reporter: no usable content");
                EMPTY_RESPONSE_REPORT.to_string()
            }
            Err(e) => {
                tracing::error!(error = %e, "reporter: generation failed");
                format!("Error generating report: {e}")
            }
        };
        Ok(StateUpdate::report(report))
    }
}
