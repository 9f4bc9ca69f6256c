//! 研究阶段（Agent）：Planner、Searcher、ToolAdapter、Analyzer、Reflector、Reporter
//!
//! 每个 Agent 只读 SharedState，返回 StateUpdate；失败以 ResearchError 返回，由 Orchestrator 折叠进 error。

pub mod analyzer;
pub mod parse;
pub mod planner;
pub mod prompt;
pub mod prompts;
pub mod reflector;
pub mod reporter;
pub mod searcher;
pub mod tool_adapter;

use async_trait::async_trait;

use crate::core::{ErrorPolicy, ResearchError, SharedState, StateUpdate};

pub use analyzer::{Analyzer, AnswerRecord};
pub use parse::{extract_json, parse_string_list};
pub use planner::Planner;
pub use prompt::PromptBuilder;
pub use prompts::RolePrompts;
pub use reflector::Reflector;
pub use reporter::Reporter;
pub use searcher::Searcher;
pub use tool_adapter::ToolAdapter;

/// 研究阶段 trait
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &'static str;

    /// 内部失败的处理方式；默认失败即终止
    fn policy(&self) -> ErrorPolicy {
        ErrorPolicy::FailClosed
    }

    async fn run(&self, state: &SharedState) -> Result<StateUpdate, ResearchError>;
}
