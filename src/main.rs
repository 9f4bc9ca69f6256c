//! Deep Research 命令行入口
//!
//! 用法: deep-research [--json] <topic...>
//! 默认打印最终报告（Markdown）；--json 打印完整的最终状态记录。

use anyhow::{bail, Context};
use deep_research::{config::load_config, observability, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 中的 GOOGLE_API_KEY / GOOGLE_CSE_ID 等
    let _ = dotenvy::dotenv();
    observability::init();

    let mut json = false;
    let mut words = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => {
                println!("Usage: deep-research [--json] <topic...>");
                return Ok(());
            }
            _ => words.push(arg),
        }
    }
    let topic = words.join(" ");
    if topic.trim().is_empty() {
        bail!("Usage: deep-research [--json] <topic...>");
    }

    let cfg = load_config(None).context("Failed to load config")?;
    let result = run(&cfg, &topic).await;

    if json {
        let out = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
        println!("{out}");
    } else if let Some(report) = result.final_report() {
        println!("{report}");
    }

    match result.error() {
        Some(error) => bail!("{error}"),
        None => Ok(()),
    }
}
