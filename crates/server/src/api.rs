//! JSON read API over the dashboard snapshots and scheduler counters.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use teamboard_core::{CrawlResult, Site};
use teamboard_scheduler::SchedulerStats;

use crate::state::AppState;

// ── Health ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ── Results ───────────────────────────────────────────────────────

/// `null` until the first result for the site has been published.
pub async fn tasks(State(state): State<Arc<AppState>>) -> Json<Option<CrawlResult>> {
    Json(state.dashboard.snapshot(Site::Task).await.as_deref().cloned())
}

pub async fn vacations(State(state): State<Arc<AppState>>) -> Json<Option<CrawlResult>> {
    Json(state.dashboard.snapshot(Site::Vacation).await.as_deref().cloned())
}

// ── Scheduler status ──────────────────────────────────────────────

pub async fn status(State(state): State<Arc<AppState>>) -> Json<Vec<SchedulerStats>> {
    Json(state.schedulers.iter().map(|s| s.stats()).collect())
}
