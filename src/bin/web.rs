//! Deep Research HTTP 服务
//!
//! 启动: cargo run --bin deep-research-web --features web
//! - GET  /api/             健康检查
//! - POST /api/do-research  {"topic": "..."} → 最终状态记录；出错时 500 + {"detail": "..."}

#![cfg(feature = "web")]

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use deep_research::config::{load_config, AppConfig};
use deep_research::{observability, Orchestrator, ResearchResult};

struct AppState {
    cfg: AppConfig,
    /// 启动时密钥齐全则预先组装；否则每次请求都返回缺少密钥的错误
    orchestrator: Option<Orchestrator>,
}

#[derive(Deserialize)]
struct ResearchRequest {
    topic: String,
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "API is running" }))
}

async fn do_research(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResearchRequest>,
) -> Response {
    tracing::info!(topic = %req.topic, "research request");
    let result = match &state.orchestrator {
        Some(orchestrator) => orchestrator.run(&req.topic).await,
        None => deep_research::run(&state.cfg, &req.topic).await,
    };

    match result {
        ResearchResult::Completed(final_state) if final_state.error.is_none() => {
            Json(final_state).into_response()
        }
        failed => {
            let detail = failed.error().unwrap_or("Research failed.").to_string();
            tracing::warn!(%detail, "research request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": detail })),
            )
                .into_response()
        }
    }
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/", get(health))
        .route("/api/do-research", post(do_research))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    observability::init();

    let cfg = load_config(None).context("Failed to load config")?;
    let orchestrator = match Orchestrator::from_env(&cfg) {
        Ok(o) => Some(o),
        Err(e) => {
            tracing::warn!(error = %e, "starting without credentials; research requests will fail");
            None
        }
    };

    let bind = cfg.server.bind.clone();
    let app = router(Arc::new(AppState { cfg, orchestrator }));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!("Deep Research API listening on http://{}", bind);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
