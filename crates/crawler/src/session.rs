//! [`SessionManager`]: the single authenticated page of one site.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use teamboard_core::config::LoginSelectors;
use teamboard_core::{CrawlError, CredentialSource, Credentials, Site};

use crate::page::{eval, PageHandle, SessionLauncher};
use crate::scripts;

struct Session {
    page: Arc<dyn PageHandle>,
    logged_in: bool,
}

/// Owns at most one live session for a site and hands out its page.
///
/// A live, logged-in session is reused as-is; the manager never navigates
/// or reloads on its own. Reload-based recovery belongs to the retry
/// wrapper, which calls [`SessionManager::recover`].
pub struct SessionManager {
    site: Site,
    launcher: Arc<dyn SessionLauncher>,
    credentials: Arc<dyn CredentialSource>,
    login: LoginSelectors,
    navigation_timeout: Duration,
    session: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(
        site: Site,
        launcher: Arc<dyn SessionLauncher>,
        credentials: Arc<dyn CredentialSource>,
        login: LoginSelectors,
        navigation_timeout: Duration,
    ) -> Self {
        Self {
            site,
            launcher,
            credentials,
            login,
            navigation_timeout,
            session: Mutex::new(None),
        }
    }

    pub fn site(&self) -> Site {
        self.site
    }

    /// Return the site's authenticated page, launching and logging in first
    /// if there is no session yet, the last login attempt failed, or
    /// `restart` is set.
    pub async fn ensure_session(&self, restart: bool) -> Result<Arc<dyn PageHandle>, CrawlError> {
        let mut slot = self.session.lock().await;

        if restart {
            if let Some(old) = slot.take() {
                info!(site = %self.site, "restarting session");
                close_quietly(self.site, old.page.as_ref()).await;
            }
        }

        if let Some(session) = slot.as_mut() {
            if session.logged_in {
                return Ok(Arc::clone(&session.page));
            }
            let creds = self.load_credentials()?;
            self.ensure_login(session.page.as_ref(), &creds).await?;
            session.logged_in = true;
            return Ok(Arc::clone(&session.page));
        }

        let creds = self.load_credentials()?;
        let page = self
            .launcher
            .launch(&creds.url)
            .await
            .map_err(|e| CrawlError::session(self.site, e))?;

        // Kept even when login fails so the next cycle retries login on the same page.
        let session = slot.insert(Session { page: Arc::clone(&page), logged_in: false });
        self.ensure_login(page.as_ref(), &creds).await?;
        session.logged_in = true;
        info!(site = %self.site, "session ready");
        Ok(page)
    }

    /// Submit credentials if the login form is showing, then wait for the
    /// resulting navigation. No marker means already authenticated.
    pub async fn ensure_login(&self, page: &dyn PageHandle, creds: &Credentials) -> Result<(), CrawlError> {
        let args = json!({
            "marker": self.login.marker,
            "identity": self.login.identity,
            "secret": self.login.secret,
            "submit": self.login.submit,
            "id": creds.id,
            "password": creds.password,
        });
        let submitted: bool = eval(page, scripts::LOGIN, args)
            .await
            .map_err(|e| CrawlError::session(self.site, e))?;

        if !submitted {
            debug!(site = %self.site, "no login form, session already authenticated");
            return Ok(());
        }

        info!(site = %self.site, "login form submitted, waiting for navigation");
        match tokio::time::timeout(self.navigation_timeout, page.wait_for_navigation()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(CrawlError::session(self.site, e)),
            Err(_) => Err(CrawlError::session(
                self.site,
                format!("login navigation did not settle within {:?}", self.navigation_timeout),
            )),
        }
    }

    /// Reload `page`, then run login detection again.
    pub async fn recover(&self, page: &dyn PageHandle) -> Result<(), CrawlError> {
        let reloaded = page.reload().await;
        if let Err(e) = &reloaded {
            warn!(site = %self.site, error = %e, "page reload failed");
        }
        let creds = self.load_credentials()?;
        let login = self.ensure_login(page, &creds).await;
        self.mark_logged_in(page, login.is_ok()).await;
        reloaded.map_err(|e| CrawlError::session(self.site, e))?;
        login
    }

    /// Close the live session, if any. The next `ensure_session` relaunches.
    pub async fn reset(&self) {
        if let Some(old) = self.session.lock().await.take() {
            close_quietly(self.site, old.page.as_ref()).await;
        }
    }

    pub async fn is_live(&self) -> bool {
        self.session.lock().await.is_some()
    }

    async fn mark_logged_in(&self, page: &dyn PageHandle, logged_in: bool) {
        if let Some(session) = self.session.lock().await.as_mut() {
            if std::ptr::addr_eq(Arc::as_ptr(&session.page), page as *const dyn PageHandle) {
                session.logged_in = logged_in;
            }
        }
    }

    fn load_credentials(&self) -> Result<Credentials, CrawlError> {
        self.credentials
            .load(self.site)
            .map_err(|e| CrawlError::session(self.site, e))
    }
}

async fn close_quietly(site: Site, page: &dyn PageHandle) {
    if let Err(e) = page.close().await {
        warn!(site = %site, error = %e, "session close failed");
    }
}
