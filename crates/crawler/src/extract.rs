//! One query-and-read cycle against the task portal's work-list grid.

use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use teamboard_core::config::TaskSiteConfig;
use teamboard_core::{CrawlError, QueryKind, QuerySpec, RawRecord};

use crate::page::{eval, PageHandle};
use crate::scripts;

/// Runs queries on an already authenticated task-portal page.
///
/// Strict order per call: wait for the grid frame, set the search
/// parameters and click search, sleep the settle time of the query kind,
/// read every row.
#[derive(Debug, Clone)]
pub struct TaskExtractor {
    config: TaskSiteConfig,
}

impl TaskExtractor {
    pub fn new(config: TaskSiteConfig) -> Self {
        Self { config }
    }

    pub async fn extract(&self, page: &dyn PageHandle, query: &QuerySpec) -> Result<Vec<RawRecord>, CrawlError> {
        self.wait_ready(page).await?;
        self.search(page, query).await?;

        // Fixed settle time: the portal gives no completion signal to observe.
        sleep(self.settle_for(query.kind)).await;

        let rows = self.read_rows(page).await?;
        info!(query = %query.label(), rows = rows.len(), "rows extracted");
        Ok(rows)
    }

    pub fn settle_for(&self, kind: QueryKind) -> Duration {
        match kind {
            QueryKind::TeamWide => self.config.settle_team,
            QueryKind::Member => self.config.settle_member,
        }
    }

    /// Poll until the work-list frame exposes `UNIUX` and `grid`.
    async fn wait_ready(&self, page: &dyn PageHandle) -> Result<(), CrawlError> {
        let started = Instant::now();
        let args = json!({ "nav": self.config.nav_selector });
        loop {
            match eval::<bool>(page, scripts::TASK_READY, args.clone()).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                // A page mid-navigation rejects evaluation; keep polling.
                Err(e) => debug!(error = %e, "readiness probe failed"),
            }
            let waited = started.elapsed();
            if waited >= self.config.ready_timeout {
                return Err(CrawlError::SystemNotReady { waited });
            }
            sleep(self.config.ready_poll).await;
        }
    }

    async fn search(&self, page: &dyn PageHandle, query: &QuerySpec) -> Result<(), CrawlError> {
        let kind_code = match query.kind {
            QueryKind::TeamWide => &self.config.team_kind_code,
            QueryKind::Member => &self.config.member_kind_code,
        };
        let since = query.since.format(&self.config.date_format).to_string();
        let params: Vec<Value> = vec![
            json!([self.config.kind_param, kind_code]),
            json!([self.config.filter_param, query.filter]),
            json!([self.config.start_date_param, since]),
        ];
        let args = json!({
            "nav": self.config.nav_selector,
            "button": self.config.search_button,
            "params": params,
        });
        eval::<Value>(page, scripts::TASK_SEARCH, args)
            .await
            .map_err(CrawlError::extraction)?;
        Ok(())
    }

    async fn read_rows(&self, page: &dyn PageHandle) -> Result<Vec<RawRecord>, CrawlError> {
        let args = json!({ "nav": self.config.nav_selector });
        let rows: Option<Vec<RawRecord>> = eval(page, scripts::TASK_ROWS, args)
            .await
            .map_err(CrawlError::extraction)?;
        Ok(rows.unwrap_or_default())
    }
}
