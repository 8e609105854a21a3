use chrono::{DateTime, Utc};
use serde::Serialize;

use teamboard_core::{CycleStatus, Site};

/// Scheduler counters exposed to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStats {
    pub site: Site,
    /// Cron expression as configured.
    pub schedule: String,
    pub gated: bool,
    /// Whether a cycle is in progress right now.
    pub running: bool,
    /// Timer and manual fires, skipped or not.
    pub fired: u64,
    pub skipped_busy: u64,
    pub skipped_off_hours: u64,
    /// Cycles whose result was published.
    pub completed: u64,
    /// Cycles that ended with a failed status or panicked.
    pub failed: u64,
    pub last_completed: Option<DateTime<Utc>>,
    pub last_status: Option<CycleStatus>,
}

impl SchedulerStats {
    pub(crate) fn new(site: Site, schedule: &str, gated: bool) -> Self {
        Self {
            site,
            schedule: schedule.to_string(),
            gated,
            running: false,
            fired: 0,
            skipped_busy: 0,
            skipped_off_hours: 0,
            completed: 0,
            failed: 0,
            last_completed: None,
            last_status: None,
        }
    }
}
