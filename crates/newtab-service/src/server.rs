//! HTTP server for the new-tab page
//!
//! Provides /, /onboarding, /health and /preferences endpoints.

use crate::newtab::{apply_preferences, open_new_tab, NewTabContext, NewTabTasks};
use crate::page::{render_html, render_onboarding_html};
use crate::render::PageRenderer;
use crate::error::Result;
use crate::types::HealthResponse;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use image_cache_db::ImageStore;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinError;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};
use unsplash_source::Preferences;

/// Shared state for the HTTP server
pub struct ServerState {
    pub ctx: NewTabContext,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(ctx: NewTabContext) -> Self {
        Self {
            ctx,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(new_tab))
        .route("/onboarding", get(onboarding))
        .route("/health", get(health))
        .route("/preferences", get(get_preferences).put(put_preferences))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// A new tab: render a background now, prefetch and prune in the background
async fn new_tab(State(state): State<SharedState>) -> Html<String> {
    let page = Arc::new(PageRenderer::new());
    let NewTabTasks {
        render,
        populate,
        prune,
    } = open_new_tab(&state.ctx, page.clone());

    match render.await {
        Ok(Ok(selection)) => debug!(?selection, "Background selected"),
        Ok(Err(e)) => warn!(error = %e, "No background for this tab"),
        Err(e) => error!(error = %e, "Render task failed"),
    }

    // Prefetch and prune finish on their own
    tokio::spawn(async move {
        if let Some(report) = log_task_outcome("populate", populate.await) {
            debug!(inserted = report.inserted(), "Prefetch finished");
        }
        if let Some(report) = log_task_outcome("prune", prune.await) {
            debug!(deleted = report.outcome.deleted, "Prune finished");
        }
    });

    Html(render_html(&page.view().await))
}

/// Log how a detached new-tab task ended
fn log_task_outcome<T>(
    task: &'static str,
    joined: std::result::Result<Result<T>, JoinError>,
) -> Option<T> {
    match joined {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            warn!(task, error = %e, "New-tab task failed");
            None
        }
        Err(e) => {
            error!(task, error = %e, "New-tab task panicked or was cancelled");
            None
        }
    }
}

async fn onboarding(State(state): State<SharedState>) -> Html<String> {
    let url = {
        let mut rng = rand::thread_rng();
        state.ctx.config.source.onboarding(&mut rng)
    };
    Html(render_onboarding_html(&url))
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Response {
    let stats = match ImageStore::open(&state.ctx.config.db_path).await {
        Ok(store) => store.stats().await,
        Err(e) => Err(e),
    };

    match stats {
        Ok(cache) => {
            let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;
            Json(HealthResponse {
                status: "ok".to_string(),
                uptime_secs,
                cache,
            })
            .into_response()
        }
        Err(e) => {
            error!(error = %e, "Image cache unavailable");
            error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    }
}

async fn get_preferences(State(state): State<SharedState>) -> Response {
    match state.ctx.preferences.get().await {
        Ok(prefs) => Json(prefs).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn put_preferences(
    State(state): State<SharedState>,
    Json(prefs): Json<Preferences>,
) -> Response {
    match apply_preferences(&state.ctx, prefs).await {
        Ok(update) => Json(update).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to save preferences");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
