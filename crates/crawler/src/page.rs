//! The narrow browser seam the crawlers are written against.
//!
//! Everything above this module talks to a page only through
//! [`PageHandle::run_in_page`] plus a handful of navigation calls, so the
//! orchestration logic never names the automation library.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("script failed: {0}")]
    Script(String),

    #[error("unexpected script result: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: std::time::Duration,
    },

    #[error("page already closed")]
    Closed,
}

/// One open page inside its own browser context.
#[async_trait::async_trait]
pub trait PageHandle: Send + Sync {
    /// Evaluate `script`, a JavaScript function expression, called with
    /// `args`. Promises are awaited; the return value comes back as JSON.
    async fn run_in_page(&self, script: &str, args: Value) -> Result<Value, PageError>;

    /// Wait for the navigation triggered by the last action to settle.
    async fn wait_for_navigation(&self) -> Result<(), PageError>;

    /// Full reload, discarding all in-page state.
    async fn reload(&self) -> Result<(), PageError>;

    /// Tear down the page and its browser context. Idempotent.
    async fn close(&self) -> Result<(), PageError>;
}

/// Opens a fresh browser context with one page already navigated to `url`.
#[async_trait::async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self, url: &str) -> Result<Arc<dyn PageHandle>, PageError>;
}

/// [`PageHandle::run_in_page`] with the result decoded into `T`.
///
/// `undefined` results arrive as JSON `null`, so `Option<T>` targets decode
/// to `None`.
pub async fn eval<T: DeserializeOwned>(
    page: &dyn PageHandle,
    script: &str,
    args: Value,
) -> Result<T, PageError> {
    let value = page.run_in_page(script, args).await?;
    Ok(serde_json::from_value(value)?)
}

/// Wrap a function expression into a self-invoking call with JSON arguments.
pub(crate) fn invocation(script: &str, args: &Value) -> String {
    format!("({})({})", script.trim(), args)
}
