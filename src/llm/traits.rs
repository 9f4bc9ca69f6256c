//! LLM 客户端抽象
//!
//! 所有文本生成后端（OpenAI 兼容 / Gemini / Mock）实现 LlmClient：一次请求、一次完整回复。
//! 各 Agent 通过 Arc<dyn LlmClient> 依赖注入，不存在全局模型单例。

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::Message;

/// 文本生成能力的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// 后端未配置或不可用
    #[error("text-generation capability unavailable: {0}")]
    Unavailable(String),

    #[error("request failed: {0}")]
    Request(String),

    /// 回复为空（无候选或 content 为空）
    #[error("model returned an empty response")]
    EmptyResponse,

    /// 回复被内容过滤器拦截
    #[error("model response was blocked by the content filter")]
    Blocked,
}

impl LlmError {
    /// 空回复与拦截同属「无可用内容」，Reporter 据此给出固定失败文案
    pub fn is_empty_or_blocked(&self) -> bool {
        matches!(self, LlmError::EmptyResponse | LlmError::Blocked)
    }
}

/// LLM 客户端 trait：messages 中第一条可为 System，其余为本轮任务
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
