//! Gemini 客户端（走 Google 的 OpenAI 兼容端点）
//!
//! - Base URL: https://generativelanguage.googleapis.com/v1beta/openai/
//! - 默认模型: gemini-2.5-flash

use crate::llm::{GenerationSettings, OpenAiClient};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
pub const GEMINI_FLASH: &str = "gemini-2.5-flash";

/// 创建 Gemini 客户端；base_url 为 None 时使用官方兼容端点
pub fn create_gemini_client(
    api_key: &str,
    model: Option<&str>,
    base_url: Option<&str>,
    settings: GenerationSettings,
) -> OpenAiClient {
    let model = model.unwrap_or(GEMINI_FLASH);
    OpenAiClient::new(
        Some(base_url.unwrap_or(GEMINI_BASE_URL)),
        model,
        api_key,
        settings,
    )
}
