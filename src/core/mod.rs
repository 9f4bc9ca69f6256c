//! 核心编排层：共享状态、错误与错误策略、状态机主控循环

pub mod error;
pub mod orchestrator;
pub mod policy;
pub mod state;

pub use error::{ResearchError, SAFETY_REJECTION, SECURITY_REJECTION};
pub use orchestrator::{next_phase, run, Orchestrator, Phase, ResearchResult};
pub use policy::ErrorPolicy;
pub use state::{Decision, SharedState, StateUpdate};
