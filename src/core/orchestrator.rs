//! 研究编排器：状态机主控循环
//!
//! Planning → Searching → ToolExecution → Analyzing → Reflecting → {Reporting | Searching}，Reporting 为终态。
//! 每一步：当前阶段读 SharedState → 返回 StateUpdate（失败折叠为 error）→ 合并 → 查转移表。
//! 单次研究严格串行；Orchestrator 本身只读，可被多个并发研究共享，每次 run 各持一份 SharedState。

use std::sync::Arc;

use serde::Serialize;
use tracing::Instrument;

use crate::agents::{
    Agent, Analyzer, Planner, Reflector, Reporter, RolePrompts, Searcher, ToolAdapter,
};
use crate::config::{AppConfig, Credentials};
use crate::core::{Decision, ResearchError, SharedState, StateUpdate};
use crate::llm::{create_gemini_client, GenerationSettings, LlmClient, OpenAiClient};
use crate::safety::SafetyGuard;
use crate::tools::{GoogleSearchTool, SearchTool, ToolExecutor};

/// 状态机的状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Planning,
    Searching,
    ToolExecution,
    Analyzing,
    Reflecting,
    Reporting,
    Done,
}

/// 转移表，按优先级：error → Reporting；Reflecting 达到循环上限 → Reporting；
/// 再按 decision；其余为固定后继。Reporting 之后无条件终止。
pub fn next_phase(from: Phase, state: &SharedState, max_loops: u32) -> Phase {
    match from {
        Phase::Reporting | Phase::Done => Phase::Done,
        _ if state.is_failed() => Phase::Reporting,
        Phase::Planning => Phase::Searching,
        Phase::Searching => Phase::ToolExecution,
        Phase::ToolExecution => Phase::Analyzing,
        Phase::Analyzing => Phase::Reflecting,
        Phase::Reflecting if state.loop_count >= max_loops => {
            tracing::warn!(max_loops, "hit loop limit, forcing report");
            Phase::Reporting
        }
        Phase::Reflecting => match state.decision {
            Some(Decision::Continue) => Phase::Searching,
            Some(Decision::Complete) | None => Phase::Reporting,
        },
    }
}

/// run 的返回：最终状态记录，或 {error}
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResearchResult {
    Completed(SharedState),
    Failed { error: String },
}

impl ResearchResult {
    pub fn failed(err: &ResearchError) -> Self {
        ResearchResult::Failed {
            error: err.to_string(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ResearchResult::Completed(state) => state.error.as_deref(),
            ResearchResult::Failed { error } => Some(error),
        }
    }

    pub fn final_report(&self) -> Option<&str> {
        match self {
            ResearchResult::Completed(state) => state.final_report.as_deref(),
            ResearchResult::Failed { .. } => None,
        }
    }

    pub fn state(&self) -> Option<&SharedState> {
        match self {
            ResearchResult::Completed(state) => Some(state),
            ResearchResult::Failed { .. } => None,
        }
    }
}

/// 根据配置选择 LLM 后端（Gemini / OpenAI 兼容）
pub(crate) fn create_llm_from_config(cfg: &AppConfig, creds: &Credentials) -> Arc<dyn LlmClient> {
    let settings = GenerationSettings::from(&cfg.llm);
    let base = cfg.llm.base_url.as_deref();
    match cfg.llm.provider.to_lowercase().as_str() {
        "openai" => {
            tracing::info!("Using OpenAI-compatible LLM ({})", cfg.llm.model);
            Arc::new(OpenAiClient::new(base, &cfg.llm.model, &creds.llm_api_key, settings))
        }
        other => {
            if other != "gemini" {
                tracing::warn!(provider = other, "unknown LLM provider, falling back to Gemini");
            }
            tracing::info!("Using Gemini LLM ({})", cfg.llm.model);
            Arc::new(create_gemini_client(
                &creds.llm_api_key,
                Some(&cfg.llm.model),
                base,
                settings,
            ))
        }
    }
}

pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    planner: Planner,
    searcher: Searcher,
    tool_adapter: ToolAdapter,
    analyzer: Analyzer,
    reflector: Reflector,
    reporter: Reporter,
    max_loops: u32,
}

impl Orchestrator {
    /// 注入两项能力并按配置组装所有阶段
    pub fn new(llm: Arc<dyn LlmClient>, search: Arc<dyn SearchTool>, cfg: &AppConfig) -> Self {
        let prompts = RolePrompts::load(cfg.research.prompts_dir.as_deref());
        let guard = Arc::new(
            SafetyGuard::new(llm.clone()).with_max_input_chars(cfg.research.max_input_chars),
        );
        let executor = ToolExecutor::new(search, cfg.search.max_result_chars);

        Self {
            planner: Planner::new(
                llm.clone(),
                guard.clone(),
                prompts.planner,
                cfg.research.max_plan_questions,
            ),
            searcher: Searcher::new(llm.clone(), guard, prompts.searcher),
            tool_adapter: ToolAdapter::new(executor),
            analyzer: Analyzer::new(llm.clone(), prompts.analyzer),
            reflector: Reflector::new(llm.clone(), prompts.reflector),
            reporter: Reporter::new(llm.clone(), prompts.reporter),
            llm,
            max_loops: cfg.research.max_loops,
        }
    }

    /// 用真实后端（Gemini / OpenAI + Google Custom Search）组装
    pub fn from_credentials(cfg: &AppConfig, creds: &Credentials) -> Self {
        let llm = create_llm_from_config(cfg, creds);
        let search = GoogleSearchTool::new(
            creds.search_api_key.clone(),
            creds.search_engine_id.clone(),
            cfg.search.timeout_secs,
            cfg.search.num_results,
        )
        .with_endpoint(cfg.search.endpoint.clone());
        Self::new(llm, Arc::new(search), cfg)
    }

    /// 从环境读取密钥后组装；缺少任一密钥返回 MissingCredentials
    pub fn from_env(cfg: &AppConfig) -> Result<Self, ResearchError> {
        let creds = Credentials::from_env(cfg)?;
        Ok(Self::from_credentials(cfg, &creds))
    }

    pub fn max_loops(&self) -> u32 {
        self.max_loops
    }

    fn agent(&self, phase: Phase) -> Option<&dyn Agent> {
        match phase {
            Phase::Planning => Some(&self.planner),
            Phase::Searching => Some(&self.searcher),
            Phase::ToolExecution => Some(&self.tool_adapter),
            Phase::Analyzing => Some(&self.analyzer),
            Phase::Reflecting => Some(&self.reflector),
            Phase::Reporting => Some(&self.reporter),
            Phase::Done => None,
        }
    }

    /// 执行一次完整研究
    pub async fn run(&self, topic: &str) -> ResearchResult {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("research", %run_id);
        async {
            tracing::info!(topic, "starting deep research");
            let state = self.drive(topic).await;

            let (prompt, completion, total) = self.llm.token_usage();
            tracing::info!(
                loop_count = state.loop_count,
                answers = state.synthesized_answers.len(),
                failed = state.is_failed(),
                prompt_tokens = prompt,
                completion_tokens = completion,
                total_tokens = total,
                "research finished"
            );

            if state.final_report.is_none() {
                tracing::error!("run reached terminal state without a report");
                return ResearchResult::failed(&ResearchError::NoOutput);
            }
            ResearchResult::Completed(state)
        }
        .instrument(span)
        .await
    }

    /// 驱动状态机直到终态，返回最终 SharedState
    pub async fn drive(&self, topic: &str) -> SharedState {
        let mut state = SharedState::new(topic);
        let mut phase = Phase::Planning;

        while let Some(agent) = self.agent(phase) {
            let update = match agent.run(&state).await {
                Ok(update) => update,
                Err(e) => {
                    tracing::error!(stage = agent.name(), policy = ?agent.policy(), error = %e, "stage failed");
                    StateUpdate::failed(&e)
                }
            };
            tracing::debug!(stage = agent.name(), update = ?update, "stage output");
            state.apply(update);

            let next = next_phase(phase, &state, self.max_loops);
            tracing::info!(from = ?phase, to = ?next, loop_count = state.loop_count, "transition");
            phase = next;
        }

        state
    }
}

/// 顶层入口：读取密钥、组装真实后端并执行一次研究；缺少密钥时不执行任何阶段
pub async fn run(cfg: &AppConfig, topic: &str) -> ResearchResult {
    match Orchestrator::from_env(cfg) {
        Ok(orchestrator) => orchestrator.run(topic).await,
        Err(e) => {
            tracing::error!(error = %e, "cannot start research");
            ResearchResult::failed(&e)
        }
    }
}
