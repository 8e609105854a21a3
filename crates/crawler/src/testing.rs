//! In-memory stand-ins for the portals, shared by the crawler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use teamboard_core::config::{TaskSiteConfig, VacationSiteConfig};
use teamboard_core::{Config, CredentialSource, Credentials, RawRecord, StaticCredentials};

use crate::page::{PageError, PageHandle, SessionLauncher};
use crate::scripts;

pub(crate) fn row(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("row must be an object, got {}", other),
    }
}

pub(crate) fn rows(n: usize, prefix: &str) -> Vec<RawRecord> {
    (0..n)
        .map(|i| {
            row(serde_json::json!({
                "REQ_NO": format!("{}-{}", prefix, i),
                "REQ_TITLE": format!("{} task {}", prefix, i),
                "STATUS_NM": "Open",
                "INTERNAL_SEQ": i,
            }))
        })
        .collect()
}

/// Default task settings with every wait set to zero.
pub(crate) fn task_config() -> TaskSiteConfig {
    let mut config = Config::for_profile("TEAMBOARD_CRAWLER_TEST").task;
    config.settle_team = Duration::ZERO;
    config.settle_member = Duration::ZERO;
    config.ready_timeout = Duration::ZERO;
    config.ready_poll = Duration::ZERO;
    config.max_retries = 2;
    config
}

pub(crate) fn vacation_config() -> VacationSiteConfig {
    let mut config = Config::for_profile("TEAMBOARD_CRAWLER_TEST").vacation;
    config.nav_settle = Duration::ZERO;
    config.max_retries = 2;
    config
}

pub(crate) fn static_credentials(members: &[&str]) -> Arc<dyn CredentialSource> {
    Arc::new(StaticCredentials {
        credentials: Credentials {
            url: "https://portal.test/".into(),
            id: "dashboard".into(),
            password: "secret".into(),
        },
        members: members.iter().map(|m| m.to_string()).collect(),
    })
}

#[derive(Default)]
struct PortalState {
    login_form: bool,
    login_after_reload: bool,
    navigation_fails: bool,
    ready: bool,
    filter_param: String,
    rows: HashMap<String, Vec<RawRecord>>,
    search_failures: HashMap<String, usize>,
    current_filter: Option<String>,
    last_search_params: Option<Value>,
    post_failures: usize,
    vacation_reply: Option<Value>,
    last_post_body: Option<Value>,
    log: Vec<String>,
    logins: usize,
    reloads: usize,
    closed: bool,
}

/// A scripted portal page. Scripts are recognised by identity with the
/// constants in [`crate::scripts`]; every call is appended to a log.
pub(crate) struct FakePortal {
    state: Mutex<PortalState>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakePortal {
    pub(crate) fn task() -> Arc<Self> {
        Arc::new(Self::with_state(PortalState {
            ready: true,
            filter_param: task_config().filter_param,
            ..PortalState::default()
        }))
    }

    pub(crate) fn vacation() -> Arc<Self> {
        Arc::new(Self::with_state(PortalState { ready: true, ..PortalState::default() }))
    }

    fn with_state(state: PortalState) -> Self {
        Self {
            state: Mutex::new(state),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut PortalState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub(crate) fn set_rows(&self, filter: &str, rows: Vec<RawRecord>) {
        self.with(|s| s.rows.insert(filter.to_string(), rows));
    }

    pub(crate) fn fail_searches(&self, filter: &str, times: usize) {
        self.with(|s| s.search_failures.insert(filter.to_string(), times));
    }

    pub(crate) fn set_ready(&self, ready: bool) {
        self.with(|s| s.ready = ready);
    }

    pub(crate) fn show_login_form(&self, on_reload_too: bool) {
        self.with(|s| {
            s.login_form = true;
            s.login_after_reload = on_reload_too;
        });
    }

    pub(crate) fn fail_navigation(&self) {
        self.with(|s| s.navigation_fails = true);
    }

    pub(crate) fn fail_posts(&self, times: usize) {
        self.with(|s| s.post_failures = times);
    }

    pub(crate) fn set_vacation_reply(&self, reply: Value) {
        self.with(|s| s.vacation_reply = Some(reply));
    }

    pub(crate) fn log(&self) -> Vec<String> {
        self.with(|s| s.log.clone())
    }

    pub(crate) fn logins(&self) -> usize {
        self.with(|s| s.logins)
    }

    pub(crate) fn reloads(&self) -> usize {
        self.with(|s| s.reloads)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.with(|s| s.closed)
    }

    pub(crate) fn last_search_params(&self) -> Option<Value> {
        self.with(|s| s.last_search_params.clone())
    }

    pub(crate) fn last_post_body(&self) -> Option<Value> {
        self.with(|s| s.last_post_body.clone())
    }

    /// Highest number of scripts that were ever evaluating at the same time.
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn reopen(&self) {
        self.with(|s| s.closed = false);
    }

    fn evaluate(&self, script: &str, args: &Value) -> Result<Value, PageError> {
        let mut s = self.state.lock().unwrap();
        if script == scripts::LOGIN {
            if !s.login_form {
                return Ok(Value::Bool(false));
            }
            s.login_form = false;
            s.logins += 1;
            s.log.push("login".into());
            Ok(Value::Bool(true))
        } else if script == scripts::TASK_READY {
            s.log.push("ready".into());
            Ok(Value::Bool(s.ready && !s.login_form))
        } else if script == scripts::TASK_SEARCH {
            let params = args["params"].clone();
            let filter = params
                .as_array()
                .and_then(|pairs| pairs.iter().find(|p| p[0] == Value::String(s.filter_param.clone())))
                .and_then(|p| p[1].as_str())
                .unwrap_or_default()
                .to_string();
            s.log.push(format!("search:{}", filter));
            s.last_search_params = Some(params);
            if let Some(left) = s.search_failures.get_mut(&filter) {
                if *left > 0 {
                    *left -= 1;
                    return Err(PageError::Script(format!("search for '{}' blew up", filter)));
                }
            }
            s.current_filter = Some(filter);
            Ok(Value::Bool(true))
        } else if script == scripts::TASK_ROWS {
            let filter = s.current_filter.clone().unwrap_or_default();
            s.log.push(format!("rows:{}", filter));
            match s.rows.get(&filter) {
                Some(rows) => Ok(Value::Array(rows.iter().cloned().map(Value::Object).collect())),
                None => Ok(Value::Null),
            }
        } else if script == scripts::CLICK {
            s.log.push(format!("click:{}", args["selector"].as_str().unwrap_or_default()));
            Ok(Value::Bool(true))
        } else if script == scripts::POST_JSON {
            s.log.push("post".into());
            s.last_post_body = Some(args["body"].clone());
            if s.post_failures > 0 {
                s.post_failures -= 1;
                return Err(PageError::Script("report endpoint returned 500".into()));
            }
            s.vacation_reply
                .clone()
                .ok_or_else(|| PageError::Script("no reply scripted".into()))
        } else {
            Err(PageError::Script("unknown script".into()))
        }
    }
}

#[async_trait::async_trait]
impl PageHandle for FakePortal {
    async fn run_in_page(&self, script: &str, args: Value) -> Result<Value, PageError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let result = self.evaluate(script, &args);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn wait_for_navigation(&self) -> Result<(), PageError> {
        if self.with(|s| s.navigation_fails) {
            return Err(PageError::Timeout { operation: "navigation", after: Duration::ZERO });
        }
        Ok(())
    }

    async fn reload(&self) -> Result<(), PageError> {
        self.with(|s| {
            s.reloads += 1;
            s.log.push("reload".into());
            s.current_filter = None;
            if s.login_after_reload {
                s.login_form = true;
            }
        });
        Ok(())
    }

    async fn close(&self) -> Result<(), PageError> {
        self.with(|s| s.closed = true);
        Ok(())
    }
}

/// Hands out the same [`FakePortal`] on every launch.
pub(crate) struct FakeLauncher {
    portal: Arc<FakePortal>,
    fail: bool,
    launches: AtomicUsize,
}

impl FakeLauncher {
    pub(crate) fn new(portal: Arc<FakePortal>) -> Arc<Self> {
        Arc::new(Self { portal, fail: false, launches: AtomicUsize::new(0) })
    }

    pub(crate) fn failing(portal: Arc<FakePortal>) -> Arc<Self> {
        Arc::new(Self { portal, fail: true, launches: AtomicUsize::new(0) })
    }

    pub(crate) fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SessionLauncher for FakeLauncher {
    async fn launch(&self, _url: &str) -> Result<Arc<dyn PageHandle>, PageError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PageError::Launch("chrome not found".into()));
        }
        self.portal.reopen();
        Ok(Arc::clone(&self.portal) as Arc<dyn PageHandle>)
    }
}
