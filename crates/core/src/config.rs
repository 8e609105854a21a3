use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
pub(crate) fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key).as_deref() {
        Some("true") | Some("1") | Some("yes") => true,
        Some("false") | Some("0") | Some("no") => false,
        _ => default,
    }
}

/// Durations are configured in milliseconds.
fn profiled_env_millis(profile: &str, key: &str, default_ms: u64) -> Duration {
    let ms = profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}

/// Comma-separated list; blank entries are dropped, order is preserved.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn profiled_env_list(profile: &str, key: &str, default: &[&str]) -> Vec<String> {
    match profiled_env_opt(profile, key) {
        Some(raw) => split_list(&raw),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub browser: BrowserConfig,
    pub task: TaskSiteConfig,
    pub vacation: VacationSiteConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TEAMBOARD_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("TEAMBOARD_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            browser: BrowserConfig::from_env_profiled(p),
            task: TaskSiteConfig::from_env_profiled(p),
            vacation: VacationSiteConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs. Credentials live in
    /// [`crate::credentials`] and are never part of this struct.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:    {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  browser:   headless={}, executable={}",
            self.browser.headless,
            self.browser.executable.as_deref().unwrap_or("(auto)")
        );
        tracing::info!(
            "  task:      cron='{}', hours={:02}-{:02}, settle={:?}/{:?}, retries={}",
            self.task.cron,
            self.task.business_hours.start_hour,
            self.task.business_hours.end_hour,
            self.task.settle_team,
            self.task.settle_member,
            self.task.max_retries,
        );
        tracing::info!(
            "  vacation:  cron='{}', endpoint={}, window={}d",
            self.vacation.cron,
            self.vacation.endpoint,
            self.vacation.window_days,
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 3001),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

// ── Browser ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub headless: bool,
    /// Explicit Chrome/Chromium binary; autodetected when unset.
    pub executable: Option<String>,
    /// Upper bound for any navigation (initial load, login submit, reload).
    pub navigation_timeout: Duration,
    /// Upper bound for a single in-page script evaluation.
    pub script_timeout: Duration,
}

impl BrowserConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            headless: profiled_env_bool(p, "BROWSER_HEADLESS", true),
            executable: profiled_env_opt(p, "BROWSER_EXECUTABLE"),
            navigation_timeout: profiled_env_millis(p, "BROWSER_NAVIGATION_TIMEOUT_MS", 30_000),
            script_timeout: profiled_env_millis(p, "BROWSER_SCRIPT_TIMEOUT_MS", 30_000),
        }
    }
}

// ── Login form ────────────────────────────────────────────────

/// CSS selectors of a site's login form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSelectors {
    /// Element whose presence means "not logged in".
    pub marker: String,
    pub identity: String,
    pub secret: String,
    pub submit: String,
}

impl LoginSelectors {
    fn from_env_profiled(p: &str, prefix: &str) -> Self {
        let key = |k: &str| format!("{}_LOGIN_{}", prefix, k);
        Self {
            marker: profiled_env_or(p, &key("MARKER"), "form#loginForm"),
            identity: profiled_env_or(p, &key("IDENTITY"), "#userId"),
            secret: profiled_env_or(p, &key("SECRET"), "#userPw"),
            submit: profiled_env_or(p, &key("SUBMIT"), "#btnLogin"),
        }
    }
}

// ── Business hours ────────────────────────────────────────────

/// Local-time window (Monday to Friday) in which a gated site may be crawled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    /// First hour inside the window (inclusive).
    pub start_hour: u32,
    /// First hour outside the window (exclusive).
    pub end_hour: u32,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self { start_hour: 8, end_hour: 20 }
    }
}

// ── Task portal ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSiteConfig {
    pub login: LoginSelectors,
    /// Navigation item whose `aria-controls` names the work-list iframe.
    pub nav_selector: String,
    /// Search trigger inside the iframe.
    pub search_button: String,
    /// `UNIUX.SVC` keys for the query kind, filter text and start date.
    pub kind_param: String,
    pub filter_param: String,
    pub start_date_param: String,
    /// Remote codes for the two query kinds.
    pub team_kind_code: String,
    pub member_kind_code: String,
    /// `chrono` format of the lookback start date.
    pub date_format: String,
    /// Raw fields kept in display records, in display order.
    pub display_fields: Vec<String>,
    pub settle_team: Duration,
    pub settle_member: Duration,
    pub ready_timeout: Duration,
    pub ready_poll: Duration,
    pub max_retries: u32,
    pub cron: String,
    pub business_hours: BusinessHours,
}

impl TaskSiteConfig {
    fn from_env_profiled(p: &str) -> Self {
        let defaults = BusinessHours::default();
        Self {
            login: LoginSelectors::from_env_profiled(p, "TASK"),
            nav_selector: profiled_env_or(p, "TASK_NAV_SELECTOR", "#mainTab li.nav-item > a[aria-controls]"),
            search_button: profiled_env_or(p, "TASK_SEARCH_BUTTON", "#doSearch"),
            kind_param: profiled_env_or(p, "TASK_KIND_PARAM", "SEARCH_GB"),
            filter_param: profiled_env_or(p, "TASK_FILTER_PARAM", "SEARCH_TXT"),
            start_date_param: profiled_env_or(p, "TASK_START_DATE_PARAM", "FROM_DT"),
            team_kind_code: profiled_env_or(p, "TASK_TEAM_KIND_CODE", "TEAM"),
            member_kind_code: profiled_env_or(p, "TASK_MEMBER_KIND_CODE", "USER"),
            date_format: profiled_env_or(p, "TASK_DATE_FORMAT", "%Y-%m-%d"),
            display_fields: profiled_env_list(
                p,
                "TASK_DISPLAY_FIELDS",
                &["REQ_NO", "REQ_TITLE", "STATUS_NM", "REQ_USER_NM", "CHARGE_USER_NM", "REQ_DT", "DUE_DT"],
            ),
            settle_team: profiled_env_millis(p, "TASK_SETTLE_TEAM_MS", 10_000),
            settle_member: profiled_env_millis(p, "TASK_SETTLE_MEMBER_MS", 3_000),
            ready_timeout: profiled_env_millis(p, "TASK_READY_TIMEOUT_MS", 15_000),
            ready_poll: profiled_env_millis(p, "TASK_READY_POLL_MS", 500),
            max_retries: profiled_env_u32(p, "TASK_MAX_RETRIES", 2),
            cron: profiled_env_or(p, "TASK_CRON", "* * * * *"),
            business_hours: BusinessHours {
                start_hour: profiled_env_u32(p, "TASK_HOURS_START", defaults.start_hour),
                end_hour: profiled_env_u32(p, "TASK_HOURS_END", defaults.end_hour),
            },
        }
    }
}

// ── Vacation portal ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacationSiteConfig {
    pub login: LoginSelectors,
    /// Menu entry clicked before the report endpoint is queried.
    pub nav_selector: String,
    pub nav_settle: Duration,
    /// Report endpoint, resolved against the portal origin by the page.
    pub endpoint: String,
    pub item_ids: Vec<String>,
    pub org_code: String,
    pub dept_code: String,
    /// Days after today covered by the report, today included.
    pub window_days: u32,
    pub date_format: String,
    /// Raw field carrying the employee display name.
    pub member_field: String,
    pub display_fields: Vec<String>,
    pub max_retries: u32,
    pub cron: String,
}

impl VacationSiteConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            login: LoginSelectors::from_env_profiled(p, "VACATION"),
            nav_selector: profiled_env_or(p, "VACATION_NAV_SELECTOR", "#gnb a[data-menu='vacation']"),
            nav_settle: profiled_env_millis(p, "VACATION_NAV_SETTLE_MS", 2_000),
            endpoint: profiled_env_or(p, "VACATION_ENDPOINT", "/api/vacation/status/list"),
            item_ids: profiled_env_list(p, "VACATION_ITEM_IDS", &["ANNUAL", "HALF_AM", "HALF_PM", "SPECIAL"]),
            org_code: profiled_env_or(p, "VACATION_ORG_CODE", "1000"),
            dept_code: profiled_env_or(p, "VACATION_DEPT_CODE", ""),
            window_days: profiled_env_u32(p, "VACATION_WINDOW_DAYS", 30),
            date_format: profiled_env_or(p, "VACATION_DATE_FORMAT", "%Y-%m-%d"),
            member_field: profiled_env_or(p, "VACATION_MEMBER_FIELD", "empNm"),
            display_fields: profiled_env_list(
                p,
                "VACATION_DISPLAY_FIELDS",
                &["empNm", "vacItemNm", "startDt", "endDt", "useDays", "reason"],
            ),
            max_retries: profiled_env_u32(p, "VACATION_MAX_RETRIES", 2),
            cron: profiled_env_or(p, "VACATION_CRON", "0 8,13 * * *"),
        }
    }
}
