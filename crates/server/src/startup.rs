//! Server startup: crawler wiring, scheduler spawning and the HTTP listener.

use std::sync::Arc;

use tracing::info;

use teamboard_core::{Config, CredentialSource, EnvCredentials, Publisher, Site};
use teamboard_crawler::{ChromiumLauncher, SessionLauncher, SessionManager, TaskCrawler, VacationCrawler};
use teamboard_scheduler::SiteScheduler;

use crate::publisher::LivePublisher;
use crate::router::build_router;
use crate::state::{AppState, Dashboard};

/// Both site crawlers over one browser launcher and credential source.
pub struct Crawlers {
    pub task: Arc<TaskCrawler>,
    /// Kept so shutdown can close the long-lived task-portal browser.
    pub task_session: Arc<SessionManager>,
    pub vacation: Arc<VacationCrawler>,
}

pub fn build_crawlers(config: &Config) -> Crawlers {
    let launcher: Arc<dyn SessionLauncher> = Arc::new(ChromiumLauncher::new(config.browser.clone()));
    let credentials: Arc<dyn CredentialSource> = Arc::new(EnvCredentials::new(&config.profile));

    let task_session = Arc::new(SessionManager::new(
        Site::Task,
        Arc::clone(&launcher),
        Arc::clone(&credentials),
        config.task.login.clone(),
        config.browser.navigation_timeout,
    ));
    let task = Arc::new(TaskCrawler::new(
        Arc::clone(&task_session),
        Arc::clone(&credentials),
        config.task.clone(),
    ));
    let vacation = Arc::new(VacationCrawler::new(
        launcher,
        credentials,
        config.vacation.clone(),
        config.browser.navigation_timeout,
    ));

    Crawlers { task, task_session, vacation }
}

pub async fn serve(config: &Config) -> anyhow::Result<()> {
    config.log_summary();

    let dashboard = Arc::new(Dashboard::default());
    let publisher: Arc<dyn Publisher> = Arc::new(LivePublisher::new(Arc::clone(&dashboard)));
    let crawlers = build_crawlers(config);

    let task_scheduler = Arc::new(SiteScheduler::new(
        crawlers.task.clone(),
        Arc::clone(&publisher),
        &config.task.cron,
        Some(config.task.business_hours),
    )?);
    let vacation_scheduler = Arc::new(SiteScheduler::new(
        crawlers.vacation.clone(),
        publisher,
        &config.vacation.cron,
        None,
    )?);

    let schedulers = vec![task_scheduler, vacation_scheduler];
    for scheduler in &schedulers {
        tokio::spawn(Arc::clone(scheduler).run());
    }

    let state = Arc::new(AppState { dashboard, schedulers });
    let app = build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    crawlers.task_session.reset().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
