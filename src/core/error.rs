//! 研究流程中的错误类型
//!
//! 分类：缺少密钥、输入校验失败、语义安全拒绝、状态字段缺失、模型输出格式错误、
//! 能力调用失败、空回复/被拦截。各阶段返回的错误由 Orchestrator 折叠进 SharedState.error（Reflector 按 FailOpen 降级）。

use thiserror::Error;

use crate::llm::LlmError;
use crate::tools::SearchError;

pub const SECURITY_REJECTION: &str = "Request rejected due to security policy.";
pub const SAFETY_REJECTION: &str = "Request rejected due to safety policy.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResearchError {
    #[error("Missing API keys.")]
    MissingCredentials,

    #[error("Security Alert: Input contains forbidden patterns or is too long.")]
    InputRejected,

    #[error("Security Alert: Request classified as unsafe.")]
    UnsafeRequest,

    #[error("{stage} failed: no {field} found in state")]
    MissingState {
        stage: &'static str,
        field: &'static str,
    },

    #[error("{stage} failed: malformed model output: {detail}")]
    MalformedOutput { stage: &'static str, detail: String },

    #[error("{stage} failed: {source}")]
    Llm {
        stage: &'static str,
        #[source]
        source: LlmError,
    },

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("Research run produced no output.")]
    NoOutput,
}

impl ResearchError {
    pub fn llm(stage: &'static str, source: LlmError) -> Self {
        ResearchError::Llm { stage, source }
    }

    pub fn malformed(stage: &'static str, detail: impl Into<String>) -> Self {
        ResearchError::MalformedOutput {
            stage,
            detail: detail.into(),
        }
    }

    /// 护栏拒绝时直接给用户看的固定报告；其余错误由 Reporter 渲染
    pub fn rejection_report(&self) -> Option<&'static str> {
        match self {
            ResearchError::InputRejected => Some(SECURITY_REJECTION),
            ResearchError::UnsafeRequest => Some(SAFETY_REJECTION),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_reports() {
        assert_eq!(
            ResearchError::InputRejected.rejection_report(),
            Some("Request rejected due to security policy.")
        );
        assert_eq!(
            ResearchError::UnsafeRequest.rejection_report(),
            Some("Request rejected due to safety policy.")
        );
        assert_eq!(ResearchError::MissingCredentials.rejection_report(), None);
    }

    #[test]
    fn test_messages_name_the_stage() {
        let err = ResearchError::MissingState {
            stage: "Searcher",
            field: "current question",
        };
        assert_eq!(err.to_string(), "Searcher failed: no current question found in state");

        let err = ResearchError::llm("Planner", LlmError::Request("HTTP 503".into()));
        assert_eq!(err.to_string(), "Planner failed: request failed: HTTP 503");
    }
}
