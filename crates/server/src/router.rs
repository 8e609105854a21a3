//! HTTP router construction.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::state::AppState;
use crate::{api, live};

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, cors_origin: &str) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/tasks", get(api::tasks))
        .route("/api/vacations", get(api::vacations))
        .route("/api/status", get(api::status))
        .route("/ws", get(live::ws_upgrade))
        .layer(cors_layer(cors_origin))
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(e) => {
            warn!(origin, error = %e, "invalid CORS origin, allowing any");
            CorsLayer::permissive()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use teamboard_core::{CrawlJob, CrawlResult, CycleStatus, Publisher, Site};
    use teamboard_scheduler::SiteScheduler;

    use super::*;
    use crate::publisher::LivePublisher;
    use crate::state::Dashboard;

    struct IdleJob;

    #[async_trait::async_trait]
    impl CrawlJob for IdleJob {
        fn site(&self) -> Site {
            Site::Vacation
        }

        async fn run_cycle(&self) -> CrawlResult {
            CrawlResult::empty("idle")
        }
    }

    fn state() -> Arc<AppState> {
        let dashboard = Arc::new(Dashboard::default());
        let publisher: Arc<dyn Publisher> = Arc::new(LivePublisher::new(Arc::clone(&dashboard)));
        let scheduler = SiteScheduler::new(Arc::new(IdleJob), publisher, "0 8,13 * * *", None).unwrap();
        Arc::new(AppState { dashboard, schedulers: vec![Arc::new(scheduler)] })
    }

    async fn get_json(state: &Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
        let app = build_router(Arc::clone(state), "*");
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = get_json(&state(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn results_are_null_before_first_publish() {
        let state = state();
        let (_, tasks) = get_json(&state, "/api/tasks").await;
        let (_, vacations) = get_json(&state, "/api/vacations").await;
        assert!(tasks.is_null());
        assert!(vacations.is_null());
    }

    #[tokio::test]
    async fn published_result_is_served() {
        let state = state();
        let mut result = CrawlResult::empty("x");
        result.status = CycleStatus::Partial { failed_members: vec!["Lee".into()] };
        result.members.insert("Lee".into(), Vec::new());
        LivePublisher::new(Arc::clone(&state.dashboard))
            .publish(Site::Task, Arc::new(result))
            .await;

        let (status, body) = get_json(&state, "/api/tasks").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["members"]["Lee"], serde_json::json!([]));
        assert_eq!(body["status"]["state"], "partial");
        assert!(body["lastUpdated"].is_string());
    }

    #[tokio::test]
    async fn status_lists_scheduler_counters() {
        let state = state();
        state.schedulers[0].fire_now().await;

        let (_, body) = get_json(&state, "/api/status").await;

        assert_eq!(body[0]["site"], "vacation");
        assert_eq!(body[0]["fired"], 1);
        assert_eq!(body[0]["failed"], 1);
        assert_eq!(body[0]["gated"], false);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = build_router(state(), "https://dashboard.internal");
        let response = app
            .oneshot(Request::builder().uri("/api/payroll").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
