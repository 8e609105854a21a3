//! Seams between the crawlers, the schedulers and the push layer.

use std::sync::Arc;

use crate::result::CrawlResult;
use crate::site::Site;

/// Receives each published cycle result and fans it out to clients.
///
/// Fire-and-forget: delivery problems are the publisher's to log.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, site: Site, result: Arc<CrawlResult>);
}

/// One full crawl cycle for a site, as driven by a scheduler.
///
/// Implementations never fail outright: a cycle that could not extract
/// anything returns [`CrawlResult::empty`] with a failed status.
#[async_trait::async_trait]
pub trait CrawlJob: Send + Sync {
    fn site(&self) -> Site;

    async fn run_cycle(&self) -> CrawlResult;
}
