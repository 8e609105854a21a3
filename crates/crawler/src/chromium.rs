//! [`SessionLauncher`] backed by a local Chromium over CDP.

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use teamboard_core::config::BrowserConfig;

use crate::page::{invocation, PageError, PageHandle, SessionLauncher};

/// Launches one browser process per session.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    config: BrowserConfig,
}

impl ChromiumLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    fn cdp_config(&self) -> Result<CdpConfig, PageError> {
        let mut builder = CdpConfig::builder().request_timeout(self.config.navigation_timeout);
        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(exe) = &self.config.executable {
            builder = builder.chrome_executable(exe);
        }
        builder.build().map_err(PageError::Launch)
    }
}

#[async_trait::async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self, url: &str) -> Result<Arc<dyn PageHandle>, PageError> {
        let (mut browser, mut handler) = Browser::launch(self.cdp_config()?)
            .await
            .map_err(|e| PageError::Launch(e.to_string()))?;

        // The CDP connection only makes progress while its handler is polled.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "cdp handler event error");
                }
            }
        });

        let opened = timeout(self.config.navigation_timeout, browser.new_page(url)).await;
        let page = match opened {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                shutdown(&mut browser, &handler_task).await;
                return Err(PageError::Navigation(e.to_string()));
            }
            Err(_) => {
                shutdown(&mut browser, &handler_task).await;
                return Err(PageError::Timeout {
                    operation: "initial navigation",
                    after: self.config.navigation_timeout,
                });
            }
        };

        info!(url, "browser session opened");
        Ok(Arc::new(ChromiumPage {
            page,
            browser: Mutex::new(Some(browser)),
            handler: handler_task,
            navigation_timeout: self.config.navigation_timeout,
            script_timeout: self.config.script_timeout,
        }))
    }
}

async fn shutdown(browser: &mut Browser, handler: &JoinHandle<()>) {
    if let Err(e) = browser.close().await {
        warn!(error = %e, "browser close failed");
    }
    if let Err(e) = browser.wait().await {
        warn!(error = %e, "browser process wait failed");
    }
    handler.abort();
}

struct ChromiumPage {
    page: Page,
    browser: Mutex<Option<Browser>>,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
    script_timeout: Duration,
}

impl ChromiumPage {
    async fn ensure_open(&self) -> Result<(), PageError> {
        if self.browser.lock().await.is_none() {
            return Err(PageError::Closed);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PageHandle for ChromiumPage {
    async fn run_in_page(&self, script: &str, args: Value) -> Result<Value, PageError> {
        self.ensure_open().await?;
        let params = EvaluateParams::builder()
            .expression(invocation(script, &args))
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(PageError::Script)?;

        let result = timeout(self.script_timeout, self.page.evaluate_expression(params))
            .await
            .map_err(|_| PageError::Timeout {
                operation: "script evaluation",
                after: self.script_timeout,
            })?
            .map_err(|e| PageError::Script(e.to_string()))?;

        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn wait_for_navigation(&self) -> Result<(), PageError> {
        self.ensure_open().await?;
        timeout(self.navigation_timeout, self.page.wait_for_navigation())
            .await
            .map_err(|_| PageError::Timeout {
                operation: "navigation",
                after: self.navigation_timeout,
            })?
            .map_err(|e| PageError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn reload(&self) -> Result<(), PageError> {
        self.ensure_open().await?;
        timeout(self.navigation_timeout, self.page.reload())
            .await
            .map_err(|_| PageError::Timeout {
                operation: "reload",
                after: self.navigation_timeout,
            })?
            .map_err(|e| PageError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), PageError> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };
        shutdown(&mut browser, &self.handler).await;
        info!("browser session closed");
        Ok(())
    }
}
