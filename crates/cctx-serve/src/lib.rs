use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use cctx_core::transcript::{parse_jsonl, Message};
use cctx_core::{Context, CoreError};
use cctx_graph::{hit_test, render_svg, GraphDescription, NodeHit};
use cctx_store::query::Stats;
use cctx_store::{CctxConfig, CctxPaths, Dataset};

// ── Config ──

pub struct ServeConfig {
    pub bind: String,
    pub port: u16,
}

// ── App State ──

struct AppState {
    repo_root: PathBuf,
}

impl AppState {
    fn paths(&self) -> CctxPaths {
        CctxPaths::discover(&self.repo_root)
    }

    fn load(&self) -> anyhow::Result<(Dataset, CctxConfig)> {
        let paths = self.paths();
        Ok((Dataset::load(&paths)?, CctxConfig::load(&paths)?))
    }
}

// ── Error Handling ──

struct AppError {
    status: StatusCode,
    err: anyhow::Error,
}

impl AppError {
    fn not_found(what: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            err: anyhow::anyhow!("{what} not found"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.err.to_string() });
        (self.status, Json(body)).into_response()
    }
}

/// Bad records in the dataset are reported as 422, everything else as 500.
impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        let err = err.into();
        let status = match err.downcast_ref::<CoreError>() {
            Some(CoreError::InvalidTimestamp { .. } | CoreError::MalformedTranscript { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, err }
    }
}

// ── Entrypoint ──

pub async fn serve(repo_root: &Path, config: ServeConfig) -> anyhow::Result<()> {
    let paths = CctxPaths::discover(repo_root);
    if !paths.is_initialized() {
        anyhow::bail!("not a cctx workspace (run `cctx init` first)");
    }

    let app = router(repo_root);
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "cctx HTTP server listening");
    eprintln!("cctx HTTP server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router (for testing without binding to a port).
pub fn router(repo_root: &Path) -> Router {
    let state = Arc::new(AppState {
        repo_root: repo_root.to_path_buf(),
    });
    Router::new()
        .route("/api/health", get(health))
        .route("/api/stats", get(get_stats))
        .route("/api/contexts", get(get_contexts))
        .route("/api/contexts/{session_id}", get(get_context))
        .route("/api/commits/{sha}", get(get_commit))
        .route("/api/graph", get(get_graph))
        .route("/api/graph.svg", get(get_graph_svg))
        .route("/api/graph/hit", get(get_graph_hit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

// ── GET /api/stats ──

async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<Stats>, AppError> {
    let (ds, _) = state.load()?;
    Ok(Json(ds.stats()?))
}

// ── GET /api/contexts ──

#[derive(Deserialize)]
struct ContextsQuery {
    limit: Option<usize>,
    author: Option<String>,
    repository: Option<String>,
    with_conversation: Option<bool>,
}

/// Card-sized view of a context (no transcript).
#[derive(Serialize)]
struct ContextSummary {
    session_id: String,
    commit_sha: String,
    short_sha: String,
    created_at: String,
    author_email: String,
    total_messages: u32,
    session_count: u32,
    new_session: bool,
    repository_name: Option<String>,
}

impl ContextSummary {
    fn new(c: &Context, ds: &Dataset) -> Self {
        Self {
            session_id: c.session_id.clone(),
            commit_sha: c.commit_sha.clone(),
            short_sha: c.short_sha().to_string(),
            created_at: c.created_at.clone(),
            author_email: c.author_email.clone(),
            total_messages: c.total_messages,
            session_count: c.session_count,
            new_session: c.new_session,
            repository_name: ds.repository_by_id(&c.repository_id).map(|r| r.name.clone()),
        }
    }
}

#[derive(Serialize)]
struct ContextsResponse {
    contexts: Vec<ContextSummary>,
}

async fn get_contexts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContextsQuery>,
) -> Result<Json<ContextsResponse>, AppError> {
    let (ds, cfg) = state.load()?;
    let limit = params.limit.unwrap_or(cfg.recent_limit);

    let contexts: Vec<ContextSummary> = ds
        .recent_contexts(0)?
        .into_iter()
        .filter(|c| {
            if let Some(ref author) = params.author {
                if c.author_email != *author {
                    return false;
                }
            }
            if let Some(ref repo) = params.repository {
                if c.repository_id != *repo {
                    return false;
                }
            }
            if let Some(with) = params.with_conversation {
                if c.has_context() != with {
                    return false;
                }
            }
            true
        })
        .take(if limit == 0 { usize::MAX } else { limit })
        .map(|c| ContextSummary::new(c, &ds))
        .collect();

    Ok(Json(ContextsResponse { contexts }))
}

// ── GET /api/contexts/{session_id}, /api/commits/{sha} ──

#[derive(Serialize)]
struct ContextDetail {
    #[serde(flatten)]
    context: Context,
    short_sha: String,
    author_initials: String,
    repository_name: Option<String>,
    messages: Vec<Message>,
}

impl ContextDetail {
    fn new(c: &Context, ds: &Dataset) -> Self {
        Self {
            short_sha: c.short_sha().to_string(),
            author_initials: c.author_initials(),
            repository_name: ds.repository_by_id(&c.repository_id).map(|r| r.name.clone()),
            messages: parse_jsonl(&c.jsonl_data),
            context: c.clone(),
        }
    }
}

async fn get_context(
    State(state): State<Arc<AppState>>,
    UrlPath(session_id): UrlPath<String>,
) -> Result<Json<ContextDetail>, AppError> {
    let (ds, _) = state.load()?;
    let c = ds
        .context_by_session_id(&session_id)
        .ok_or_else(|| AppError::not_found(format!("context '{session_id}'")))?;
    Ok(Json(ContextDetail::new(c, &ds)))
}

async fn get_commit(
    State(state): State<Arc<AppState>>,
    UrlPath(sha): UrlPath<String>,
) -> Result<Json<ContextDetail>, AppError> {
    let (ds, _) = state.load()?;
    let c = ds
        .context_by_commit_sha(&sha)
        .ok_or_else(|| AppError::not_found(format!("commit '{sha}'")))?;
    Ok(Json(ContextDetail::new(c, &ds)))
}

// ── GET /api/graph, /api/graph.svg ──

async fn get_graph(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GraphDescription>, AppError> {
    let (ds, cfg) = state.load()?;
    Ok(Json(ds.graph(&cfg.layout)?))
}

async fn get_graph_svg(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let (ds, cfg) = state.load()?;
    let graph = ds.graph(&cfg.layout)?;
    let svg = render_svg(&graph, &cfg.layout);
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

// ── GET /api/graph/hit ──

#[derive(Deserialize)]
struct HitQuery {
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct HitResponse {
    #[serde(flatten)]
    hit: NodeHit,
    context: ContextDetail,
}

async fn get_graph_hit(
    State(state): State<Arc<AppState>>,
    Query(q): Query<HitQuery>,
) -> Result<Json<HitResponse>, AppError> {
    let (ds, cfg) = state.load()?;
    let graph = ds.graph(&cfg.layout)?;
    let hit = hit_test(&graph, q.x, q.y, cfg.layout.node_radius)
        .ok_or_else(|| AppError::not_found(format!("node at ({}, {})", q.x, q.y)))?;
    let c = ds
        .context_by_commit_sha(&hit.record_id)
        .ok_or_else(|| AppError::not_found(format!("commit '{}'", hit.record_id)))?;
    let context = ContextDetail::new(c, &ds);
    Ok(Json(HitResponse { hit, context }))
}

// ── Tests ──
