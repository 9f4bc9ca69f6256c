//! Deep Research - 多智能体深度研究编排
//!
//! 模块划分：
//! - **agents**: Planner、Searcher、ToolAdapter、Analyzer、Reflector、Reporter 六个阶段
//! - **config**: 应用配置加载（TOML + 环境变量）与密钥读取
//! - **core**: SharedState、错误与错误策略、状态机编排器
//! - **llm**: 文本生成客户端抽象与实现（OpenAI 兼容 / Gemini / Mock）
//! - **observability**: 日志初始化
//! - **safety**: 输入护栏、语义安全分类、PII 脱敏、安全宪章
//! - **tools**: 搜索能力抽象、Google Custom Search、执行器

pub mod agents;
pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod safety;
pub mod tools;

pub use crate::core::{run, Orchestrator, ResearchResult, SharedState};
