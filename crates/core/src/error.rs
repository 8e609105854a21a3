use std::time::Duration;

use thiserror::Error;

use crate::site::Site;

/// Failures of one crawl cycle.
///
/// `SystemNotReady` and `Extraction` are retryable; the retry wrapper absorbs
/// them up to its bound. `SessionInit` ends the cycle. `MemberExtraction`
/// only ever reaches the log: the member gets an empty list.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("session init failed for {site}: {reason}")]
    SessionInit { site: Site, reason: String },

    #[error("remote page not ready after {waited:?}")]
    SystemNotReady { waited: Duration },

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("extraction for member '{member}' failed: {source}")]
    MemberExtraction {
        member: String,
        #[source]
        source: Box<CrawlError>,
    },
}

impl CrawlError {
    pub fn session(site: Site, reason: impl ToString) -> Self {
        CrawlError::SessionInit { site, reason: reason.to_string() }
    }

    pub fn extraction(reason: impl ToString) -> Self {
        CrawlError::Extraction(reason.to_string())
    }

    /// Whether the retry wrapper may reload and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CrawlError::SystemNotReady { .. } | CrawlError::Extraction(_))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown site '{0}' (expected 'task' or 'vacation')")]
    UnknownSite(String),

    #[error("missing credential {key} for {site}")]
    MissingCredential { site: Site, key: String },

    #[error("invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },
}
