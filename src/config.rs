//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `DEEP_RESEARCH__*` 覆盖（双下划线表示嵌套，如 `DEEP_RESEARCH__LLM__MODEL=gemini-2.5-pro`）。
//! 密钥不进配置文件，只从环境变量读取（见 Credentials）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::ResearchError;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSection,
    pub search: SearchSection,
    pub research: ResearchSection,
    pub server: ServerSection,
}

/// [llm] 段：后端、模型与采样参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：gemini / openai
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: crate::llm::GEMINI_FLASH.to_string(),
            base_url: None,
            temperature: 0.8,
            top_p: 1.0,
            max_output_tokens: 2048,
        }
    }
}

/// [search] 段：Google Custom Search 端点、每次结果条数、超时、结果最大字符数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub endpoint: String,
    pub num_results: u8,
    pub timeout_secs: u64,
    pub max_result_chars: usize,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            endpoint: crate::tools::GOOGLE_SEARCH_ENDPOINT.to_string(),
            num_results: 5,
            timeout_secs: 15,
            max_result_chars: 8000,
        }
    }
}

/// [research] 段：循环上限、计划问题数上限、输入长度上限、Prompt 覆盖目录
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResearchSection {
    pub max_loops: u32,
    pub max_plan_questions: usize,
    pub max_input_chars: usize,
    /// 目录下的 planner.txt / searcher.txt / ... 会替换内置角色 Prompt
    pub prompts_dir: Option<PathBuf>,
}

impl Default for ResearchSection {
    fn default() -> Self {
        Self {
            max_loops: 10,
            max_plan_questions: 7,
            max_input_chars: crate::safety::MAX_INPUT_LENGTH,
            prompts_dir: None,
        }
    }
}

/// [server] 段：HTTP 监听地址（deep-research-web）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 DEEP_RESEARCH__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 DEEP_RESEARCH__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("DEEP_RESEARCH")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

/// 文本生成与搜索两项能力所需的密钥
#[derive(Clone)]
pub struct Credentials {
    pub llm_api_key: String,
    pub search_api_key: String,
    pub search_engine_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("search_engine_id", &self.search_engine_id)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// 从进程环境读取密钥
    pub fn from_env(cfg: &AppConfig) -> Result<Self, ResearchError> {
        Self::from_lookup(cfg, |key| std::env::var(key).ok())
    }

    /// 按 provider 决定 LLM 密钥来源：gemini 用 GOOGLE_API_KEY，openai 用 OPENAI_API_KEY；
    /// 搜索固定使用 GOOGLE_API_KEY + GOOGLE_CSE_ID。任一缺失即 MissingCredentials。
    pub fn from_lookup<F>(cfg: &AppConfig, lookup: F) -> Result<Self, ResearchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let llm_key_name = match cfg.llm.provider.to_lowercase().as_str() {
            "openai" => "OPENAI_API_KEY",
            _ => "GOOGLE_API_KEY",
        };

        let mut missing = Vec::new();
        let llm_api_key = get(llm_key_name);
        if llm_api_key.is_none() {
            missing.push(llm_key_name);
        }
        let search_api_key = get("GOOGLE_API_KEY");
        if search_api_key.is_none() && llm_key_name != "GOOGLE_API_KEY" {
            missing.push("GOOGLE_API_KEY");
        }
        let search_engine_id = get("GOOGLE_CSE_ID");
        if search_engine_id.is_none() {
            missing.push("GOOGLE_CSE_ID");
        }

        match (llm_api_key, search_api_key, search_engine_id) {
            (Some(llm_api_key), Some(search_api_key), Some(search_engine_id)) => Ok(Self {
                llm_api_key,
                search_api_key,
                search_engine_id,
            }),
            _ => {
                tracing::error!(missing = ?missing, "required credentials are not set");
                Err(ResearchError::MissingCredentials)
            }
        }
    }
}
