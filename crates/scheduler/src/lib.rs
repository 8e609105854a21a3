//! Per-site crawl scheduling.
//!
//! Each site gets one [`SiteScheduler`]: a cron timer, a single "cycle in
//! progress" flag, and (for the task portal) a business-hours gate. The
//! scheduler owns no crawl logic; it drives a [`teamboard_core::CrawlJob`]
//! and hands non-failed results to a [`teamboard_core::Publisher`].

pub mod cron;
pub mod gate;
mod runner;
mod stats;

pub use self::gate::within_business_hours;
pub use self::runner::{FireOutcome, SiteScheduler};
pub use self::stats::SchedulerStats;
