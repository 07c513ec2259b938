//! HTTP server for the graph viewer

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use sng_core::{
    FriendshipView, GraphQueries, GraphViewProjector, ProjectionResult, SeedScript, UserView,
};
use sng_storage::{operations, ConnectionPool};
use tokio::sync::Mutex;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::assets;
use crate::error::AppError;

/// Maximum request body size (64KB)
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Shared handler state
pub struct AppState {
    pool: ConnectionPool,
    seed_file: PathBuf,
    queries: GraphQueries,
    projector: GraphViewProjector,
    /// Held for the whole clear-and-reseed of a page load
    reset_lock: Mutex<()>,
}

impl AppState {
    pub fn new(pool: ConnectionPool, seed_file: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            seed_file: seed_file.into(),
            queries: GraphQueries::default(),
            projector: GraphViewProjector::new(),
            reset_lock: Mutex::new(()),
        }
    }

    pub fn with_queries(mut self, queries: GraphQueries) -> Self {
        self.queries = queries;
        self
    }

    pub fn with_projector(mut self, projector: GraphViewProjector) -> Self {
        self.projector = projector;
        self
    }
}

/// Create the viewer router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index", get(index_handler))
        .route("/query", get(query_handler))
        .route("/get-graph", post(graph_handler))
        .route("/get-users", post(users_handler))
        .route("/get-relationships", post(relationships_handler))
        .route("/health", get(health_handler))
        .route("/static/js/graph.js", get(graph_js))
        .route("/static/js/query.js", get(query_js))
        .route("/static/css/style.css", get(style_css))
        .with_state(Arc::new(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
}

/// Reset the database from the seed file, then serve the graph page
async fn index_handler(State(state): State<Arc<AppState>>) -> Result<Html<&'static str>, AppError> {
    let script = SeedScript::load(&state.seed_file)?;
    let _reset = state.reset_lock.lock().await;
    let conn = state.pool.acquire().await?;
    let applied = operations::reset(&conn, &script).await?;
    tracing::debug!(
        "Reset database from {} ({} statements)",
        state.seed_file.display(),
        applied
    );
    Ok(Html(assets::INDEX_HTML))
}

async fn query_handler() -> Html<&'static str> {
    Html(assets::QUERY_HTML)
}

async fn graph_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProjectionResult>, AppError> {
    let conn = state.pool.acquire().await?;
    let graph = operations::get_graph(&conn, &state.queries, &state.projector).await?;
    tracing::debug!(
        "get-graph: {} nodes, {} links",
        graph.nodes.len(),
        graph.edges.len()
    );
    Ok(Json(graph))
}

async fn users_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserView>>, AppError> {
    let conn = state.pool.acquire().await?;
    let users = operations::get_users(&conn, &state.queries).await?;
    tracing::debug!("get-users: {} users", users.len());
    Ok(Json(users))
}

async fn relationships_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FriendshipView>>, AppError> {
    let conn = state.pool.acquire().await?;
    let pairs = operations::get_relationships(&conn, &state.queries).await?;
    tracing::debug!("get-relationships: {} pairs", pairs.len());
    Ok(Json(pairs))
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let conn = state.pool.acquire().await?;
    let (status, code) = if conn.health_check().await? {
        ("ok", StatusCode::OK)
    } else {
        ("unavailable", StatusCode::SERVICE_UNAVAILABLE)
    };
    Ok((
        code,
        Json(serde_json::json!({
            "status": status,
            "server": "sng",
            "backend": state.pool.backend_name(),
            "version": env!("CARGO_PKG_VERSION")
        })),
    ))
}

async fn graph_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript")], assets::GRAPH_JS)
}

async fn query_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript")], assets::QUERY_JS)
}

async fn style_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], assets::STYLE_CSS)
}

/// Run the HTTP server
pub async fn run_server(state: AppState, addr: &str) -> anyhow::Result<()> {
    let backend = state.pool.backend_name();
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Graph viewer listening on {} ({} backend)", addr, backend);
    tracing::info!("  Graph page: http://{}/", addr);
    tracing::info!("  Query page: http://{}/query", addr);
    tracing::info!("  Health check: http://{}/health", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
