//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 由调用方提供一个闭包，根据收到的消息决定回复；同时记录每次请求，便于断言「调用了几次、发了什么」。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError, Message, Role};

type Responder = dyn Fn(&[Message]) -> Result<String, LlmError> + Send + Sync;

/// Mock 客户端：闭包脚本化回复
pub struct MockLlmClient {
    responder: Box<Responder>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockLlmClient {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&[Message]) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 对任何请求都返回同一段文本
    pub fn fixed(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self::new(move |_| Ok(reply.clone()))
    }

    /// 对任何请求都返回同一个错误
    pub fn failing(err: LlmError) -> Self {
        Self::new(move |_| Err(err.clone()))
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// 所有请求的副本（按时间顺序）
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// 取消息列表中的 system 与最后一条 user 内容，供闭包做路由
    pub fn split(messages: &[Message]) -> (&str, &str) {
        let system = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .unwrap_or("");
        let user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");
        (system, user)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }
        (self.responder)(messages)
    }
}
