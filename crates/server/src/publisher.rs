use std::sync::Arc;

use tracing::{debug, info};

use teamboard_core::{CrawlResult, Publisher, Site};

use crate::live::{topic, ws_json};
use crate::state::Dashboard;

/// Stores each result as the site's snapshot and pushes it to every
/// connected WebSocket client.
pub struct LivePublisher {
    dashboard: Arc<Dashboard>,
}

impl LivePublisher {
    pub fn new(dashboard: Arc<Dashboard>) -> Self {
        Self { dashboard }
    }
}

#[async_trait::async_trait]
impl Publisher for LivePublisher {
    async fn publish(&self, site: Site, result: Arc<CrawlResult>) {
        let message = ws_json(topic(site), &*result);
        self.dashboard.store(site, result).await;
        match self.dashboard.broadcast.send(message) {
            Ok(clients) => info!(site = %site, clients, "result pushed"),
            Err(_) => debug!(site = %site, "no connected clients"),
        }
    }
}
