//! Task-portal cycle: one team-wide query, then one query per member.

use std::sync::Arc;

use chrono::Local;
use indexmap::IndexMap;
use tracing::{error, info, warn};

use teamboard_core::config::TaskSiteConfig;
use teamboard_core::{
    CrawlError, CrawlJob, CrawlResult, CredentialSource, CycleStatus, Projection, QuerySpec,
    RawRecord, Site,
};

use crate::extract::TaskExtractor;
use crate::page::PageHandle;
use crate::retry::RetryPolicy;
use crate::session::SessionManager;

/// Drives the long-lived task-portal session through full cycles.
///
/// All queries of a cycle share one page and run strictly one after the
/// other: team-wide first, then members in configured order.
pub struct TaskCrawler {
    session: Arc<SessionManager>,
    credentials: Arc<dyn CredentialSource>,
    extractor: TaskExtractor,
    retry: RetryPolicy,
    projection: Projection,
}

impl TaskCrawler {
    pub fn new(
        session: Arc<SessionManager>,
        credentials: Arc<dyn CredentialSource>,
        config: TaskSiteConfig,
    ) -> Self {
        Self {
            session,
            credentials,
            retry: RetryPolicy::new(config.max_retries),
            projection: Projection::new(config.display_fields.iter().cloned()),
            extractor: TaskExtractor::new(config),
        }
    }

    /// Run one cycle. Never fails: a broken session or an exhausted
    /// team-wide query yields [`CrawlResult::empty`].
    pub async fn crawl(&self) -> CrawlResult {
        let page = match self.session.ensure_session(false).await {
            Ok(page) => page,
            Err(e) => {
                error!(site = %Site::Task, error = %e, "session unavailable, skipping cycle");
                return CrawlResult::empty(e);
            }
        };

        let today = Local::now().date_naive();
        let team = match self.query(&page, &QuerySpec::team_wide(today)).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(site = %Site::Task, error = %e, "team-wide extraction failed");
                // Start the next cycle from a fresh login.
                self.session.reset().await;
                return CrawlResult::empty(e);
            }
        };

        let mut members: IndexMap<String, Vec<RawRecord>> = IndexMap::new();
        let mut failed_members = Vec::new();
        for name in self.credentials.team_members() {
            let rows = match self.query(&page, &QuerySpec::member(&name, today)).await {
                Ok(rows) => rows,
                Err(e) => {
                    let e = CrawlError::MemberExtraction { member: name.clone(), source: Box::new(e) };
                    warn!(site = %Site::Task, error = %e, "member recorded as empty");
                    failed_members.push(name.clone());
                    Vec::new()
                }
            };
            members.insert(name, rows);
        }

        let result = CrawlResult {
            team: self.projection.project_all(&team),
            members: members
                .iter()
                .map(|(name, rows)| (name.clone(), self.projection.project_all(rows)))
                .collect(),
            last_updated: chrono::Utc::now(),
            status: if failed_members.is_empty() {
                CycleStatus::Complete
            } else {
                CycleStatus::Partial { failed_members }
            },
        };
        info!(
            site = %Site::Task,
            team = result.team.len(),
            members = result.members.len(),
            "cycle assembled"
        );
        result
    }

    async fn query(&self, page: &Arc<dyn PageHandle>, query: &QuerySpec) -> Result<Vec<RawRecord>, CrawlError> {
        let page: &dyn PageHandle = page.as_ref();
        let extractor = &self.extractor;
        let session = self.session.as_ref();
        self.retry
            .run(
                &query.label(),
                move || extractor.extract(page, query),
                move || session.recover(page),
            )
            .await
    }
}

#[async_trait::async_trait]
impl CrawlJob for TaskCrawler {
    fn site(&self) -> Site {
        Site::Task
    }

    async fn run_cycle(&self) -> CrawlResult {
        self.crawl().await
    }
}
