use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use teamboard_core::{CrawlResult, Site};
use teamboard_scheduler::SiteScheduler;

/// Last published result per site plus the live-push channel.
///
/// Each slot is replaced wholesale, so readers see either the previous or
/// the new result and never a partial one.
pub struct Dashboard {
    tasks: RwLock<Option<Arc<CrawlResult>>>,
    vacations: RwLock<Option<Arc<CrawlResult>>>,
    pub broadcast: broadcast::Sender<String>,
}

impl Default for Dashboard {
    fn default() -> Self {
        let (broadcast, _) = broadcast::channel::<String>(64);
        Self {
            tasks: RwLock::new(None),
            vacations: RwLock::new(None),
            broadcast,
        }
    }
}

impl Dashboard {
    fn slot(&self, site: Site) -> &RwLock<Option<Arc<CrawlResult>>> {
        match site {
            Site::Task => &self.tasks,
            Site::Vacation => &self.vacations,
        }
    }

    pub async fn snapshot(&self, site: Site) -> Option<Arc<CrawlResult>> {
        self.slot(site).read().await.clone()
    }

    pub async fn store(&self, site: Site, result: Arc<CrawlResult>) {
        *self.slot(site).write().await = Some(result);
    }
}

pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub schedulers: Vec<Arc<SiteScheduler>>,
}
