//! Vacation-portal cycle: a fresh session per run, one report request.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::sleep;
use tracing::{error, info};

use teamboard_core::config::VacationSiteConfig;
use teamboard_core::{
    CrawlError, CrawlJob, CrawlResult, CredentialSource, CycleStatus, Projection, QuerySpec,
    RawRecord, Site,
};

use crate::page::{eval, PageHandle, SessionLauncher};
use crate::retry::RetryPolicy;
use crate::scripts;
use crate::session::SessionManager;

#[derive(Debug, Deserialize)]
struct ReportReply {
    response: Vec<RawRecord>,
}

/// Opens a session, pulls the vacation report, and closes the session again
/// on every path. Nothing survives between cycles.
pub struct VacationCrawler {
    launcher: Arc<dyn SessionLauncher>,
    credentials: Arc<dyn CredentialSource>,
    config: VacationSiteConfig,
    navigation_timeout: Duration,
    retry: RetryPolicy,
    projection: Projection,
}

impl VacationCrawler {
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        credentials: Arc<dyn CredentialSource>,
        config: VacationSiteConfig,
        navigation_timeout: Duration,
    ) -> Self {
        Self {
            launcher,
            credentials,
            retry: RetryPolicy::new(config.max_retries),
            projection: Projection::new(config.display_fields.iter().cloned()),
            config,
            navigation_timeout,
        }
    }

    pub async fn crawl(&self) -> CrawlResult {
        let session = SessionManager::new(
            Site::Vacation,
            Arc::clone(&self.launcher),
            Arc::clone(&self.credentials),
            self.config.login.clone(),
            self.navigation_timeout,
        );

        let outcome = match session.ensure_session(false).await {
            Ok(page) => self.collect(&session, page.as_ref()).await,
            Err(e) => Err(e),
        };
        session.reset().await;

        match outcome {
            Ok(records) => self.assemble(records),
            Err(e) => {
                error!(site = %Site::Vacation, error = %e, "vacation cycle failed");
                CrawlResult::empty(e)
            }
        }
    }

    async fn collect(&self, session: &SessionManager, page: &dyn PageHandle) -> Result<Vec<RawRecord>, CrawlError> {
        eval::<Value>(page, scripts::CLICK, json!({ "selector": self.config.nav_selector }))
            .await
            .map_err(CrawlError::extraction)?;
        sleep(self.config.nav_settle).await;

        let today = Local::now().date_naive();
        let until = today
            .checked_add_days(Days::new(self.config.window_days.into()))
            .unwrap_or(today);
        let query = QuerySpec::range(today, until);
        let args = self.request_args(&query);

        let reply = self
            .retry
            .run(
                &query.label(),
                move || {
                    let args = args.clone();
                    async move {
                        eval::<ReportReply>(page, scripts::POST_JSON, args)
                            .await
                            .map_err(CrawlError::extraction)
                    }
                },
                move || session.recover(page),
            )
            .await?;

        info!(site = %Site::Vacation, records = reply.response.len(), "vacation report fetched");
        Ok(reply.response)
    }

    fn request_args(&self, query: &QuerySpec) -> Value {
        let fmt = self.config.date_format.as_str();
        let until = query.until.unwrap_or(query.since);
        json!({
            "endpoint": self.config.endpoint,
            "body": {
                "startDate": query.since.format(fmt).to_string(),
                "endDate": until.format(fmt).to_string(),
                "itemIds": self.config.item_ids,
                "orgCode": self.config.org_code,
                "deptCode": self.config.dept_code,
            },
        })
    }

    /// Every record goes to the team list; each configured member gets the
    /// records whose member field equals their name.
    fn assemble(&self, records: Vec<RawRecord>) -> CrawlResult {
        let mut members: IndexMap<String, Vec<_>> = IndexMap::new();
        for name in self.credentials.team_members() {
            let own: Vec<_> = records
                .iter()
                .filter(|r| r.get(&self.config.member_field).and_then(Value::as_str) == Some(name.as_str()))
                .map(|r| self.projection.project(r))
                .collect();
            members.insert(name, own);
        }

        CrawlResult {
            team: self.projection.project_all(&records),
            members,
            last_updated: chrono::Utc::now(),
            status: CycleStatus::Complete,
        }
    }
}

#[async_trait::async_trait]
impl CrawlJob for VacationCrawler {
    fn site(&self) -> Site {
        Site::Vacation
    }

    async fn run_cycle(&self) -> CrawlResult {
        self.crawl().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::testing::{static_credentials, vacation_config, FakeLauncher, FakePortal};

    fn crawler(launcher: Arc<FakeLauncher>, members: &[&str]) -> VacationCrawler {
        VacationCrawler::new(launcher, static_credentials(members), vacation_config(), Duration::ZERO)
    }

    #[tokio::test]
    async fn groups_report_rows_by_member_and_closes_session() {
        let portal = FakePortal::vacation();
        portal.set_vacation_reply(json!({
            "response": [
                { "empNm": "Kim", "vacItemNm": "Annual", "startDt": "2026-10-20", "seq": 1 },
                { "empNm": "Lee", "vacItemNm": "Half", "startDt": "2026-10-21", "seq": 2 },
                { "empNm": "Kim", "vacItemNm": "Annual", "startDt": "2026-10-22", "seq": 3 },
                { "empNm": "Park", "vacItemNm": "Annual", "startDt": "2026-10-23", "seq": 4 },
            ]
        }));
        let launcher = FakeLauncher::new(Arc::clone(&portal));

        let result = crawler(Arc::clone(&launcher), &["Kim", "Lee", "Choi"]).crawl().await;

        assert_eq!(result.status, CycleStatus::Complete);
        assert_eq!(result.team.len(), 4);
        assert_eq!(result.member("Kim").unwrap().len(), 2);
        assert_eq!(result.member("Lee").unwrap().len(), 1);
        assert!(result.member("Choi").unwrap().is_empty());
        assert!(result.team.iter().all(|r| !r.contains_key("seq")));
        assert!(portal.is_closed());
        assert_eq!(launcher.launches(), 1);
    }

    #[tokio::test]
    async fn posts_fixed_body_after_navigation_click() {
        let portal = FakePortal::vacation();
        portal.set_vacation_reply(json!({ "response": [] }));
        let launcher = FakeLauncher::new(Arc::clone(&portal));

        crawler(launcher, &[]).crawl().await;

        let log = portal.log();
        let click = log.iter().position(|e| e.starts_with("click:")).unwrap();
        let post = log.iter().position(|e| e == "post").unwrap();
        assert!(click < post);

        let body = portal.last_post_body().unwrap();
        assert_eq!(body["itemIds"], json!(["ANNUAL", "HALF_AM", "HALF_PM", "SPECIAL"]));
        assert_eq!(body["orgCode"], json!("1000"));
        assert!(body["startDate"].as_str().unwrap() <= body["endDate"].as_str().unwrap());
    }

    #[tokio::test]
    async fn fresh_session_every_cycle() {
        let portal = FakePortal::vacation();
        portal.set_vacation_reply(json!({ "response": [] }));
        let launcher = FakeLauncher::new(Arc::clone(&portal));
        let crawler = crawler(Arc::clone(&launcher), &[]);

        crawler.crawl().await;
        crawler.crawl().await;

        assert_eq!(launcher.launches(), 2);
        assert!(portal.is_closed());
    }

    #[tokio::test]
    async fn exhausted_retries_fail_the_cycle_and_still_close() {
        let portal = FakePortal::vacation();
        portal.fail_posts(3);
        portal.set_vacation_reply(json!({ "response": [{ "empNm": "Kim" }] }));
        let launcher = FakeLauncher::new(Arc::clone(&portal));

        let result = crawler(launcher, &["Kim"]).crawl().await;

        assert!(result.status.is_failed());
        assert!(result.team.is_empty());
        assert_eq!(portal.reloads(), 3);
        assert!(portal.is_closed());
    }

    #[tokio::test]
    async fn reply_without_response_array_is_an_error() {
        let portal = FakePortal::vacation();
        portal.set_vacation_reply(json!({ "result": "ok" }));
        let launcher = FakeLauncher::new(Arc::clone(&portal));

        let result = crawler(launcher, &[]).crawl().await;

        assert!(result.status.is_failed());
        assert!(portal.is_closed());
    }

    #[tokio::test]
    async fn launch_failure_yields_empty_failed_result() {
        let portal = FakePortal::vacation();
        let launcher = FakeLauncher::failing(Arc::clone(&portal));

        let result = crawler(launcher, &["Kim"]).crawl().await;

        assert!(result.status.is_failed());
        assert!(result.members.is_empty());
    }
}
