//! [`SiteScheduler`]: the idle/running state machine and its timer loop.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{Local, NaiveDateTime, Utc};
use cron::Schedule;
use futures::FutureExt;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use teamboard_core::config::BusinessHours;
use teamboard_core::{ConfigError, CrawlJob, Publisher, Site};

use crate::cron::{next_fire, parse_schedule};
use crate::gate::within_business_hours;
use crate::stats::SchedulerStats;

/// What a single fire did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// A previous cycle still held the flag.
    SkippedBusy,
    SkippedOffHours,
    Published,
    /// The cycle ran but its result was failed (or it panicked); nothing
    /// was published.
    Withheld,
}

/// Clears the running flag however the cycle ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Periodic trigger for one site.
///
/// At most one cycle is in flight per scheduler. Fires that arrive while a
/// cycle runs, or outside business hours when a gate is set, return without
/// touching the job.
pub struct SiteScheduler {
    job: Arc<dyn CrawlJob>,
    publisher: Arc<dyn Publisher>,
    schedule: Schedule,
    hours: Option<BusinessHours>,
    running: AtomicBool,
    stats: RwLock<SchedulerStats>,
}

impl SiteScheduler {
    pub fn new(
        job: Arc<dyn CrawlJob>,
        publisher: Arc<dyn Publisher>,
        cron_expr: &str,
        hours: Option<BusinessHours>,
    ) -> Result<Self, ConfigError> {
        let schedule = parse_schedule(cron_expr)?;
        let stats = SchedulerStats::new(job.site(), cron_expr, hours.is_some());
        Ok(Self {
            job,
            publisher,
            schedule,
            hours,
            running: AtomicBool::new(false),
            stats: RwLock::new(stats),
        })
    }

    pub fn site(&self) -> Site {
        self.job.site()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> SchedulerStats {
        let mut stats = match self.stats.read() {
            Ok(s) => s.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        stats.running = self.is_running();
        stats
    }

    fn record(&self, update: impl FnOnce(&mut SchedulerStats)) {
        if let Ok(mut stats) = self.stats.write() {
            update(&mut stats);
        }
    }

    /// Fire at the current local time.
    pub async fn fire_now(&self) -> FireOutcome {
        self.fire(Local::now().naive_local()).await
    }

    /// Handle one timer tick as if the local wall clock read `now`.
    pub async fn fire(&self, now: NaiveDateTime) -> FireOutcome {
        let site = self.site();
        self.record(|s| s.fired += 1);

        if self.is_running() {
            info!(site = %site, "previous cycle still running, skipping");
            self.record(|s| s.skipped_busy += 1);
            return FireOutcome::SkippedBusy;
        }

        if let Some(hours) = self.hours {
            if !within_business_hours(hours, now) {
                debug!(site = %site, at = %now, "outside business hours, skipping");
                self.record(|s| s.skipped_off_hours += 1);
                return FireOutcome::SkippedOffHours;
            }
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!(site = %site, "previous cycle still running, skipping");
            self.record(|s| s.skipped_busy += 1);
            return FireOutcome::SkippedBusy;
        }
        let _guard = RunningGuard(&self.running);

        info!(site = %site, "cycle starting");
        let result = match AssertUnwindSafe(self.job.run_cycle()).catch_unwind().await {
            Ok(result) => result,
            Err(_) => {
                error!(site = %site, "cycle panicked");
                self.record(|s| s.failed += 1);
                return FireOutcome::Withheld;
            }
        };

        let status = result.status.clone();
        if status.is_failed() {
            warn!(site = %site, status = ?status, "cycle failed, keeping last published result");
            self.record(|s| {
                s.failed += 1;
                s.last_status = Some(status);
            });
            return FireOutcome::Withheld;
        }

        let records = result.record_count();
        self.publisher.publish(site, Arc::new(result)).await;
        self.record(|s| {
            s.completed += 1;
            s.last_completed = Some(Utc::now());
            s.last_status = Some(status);
        });
        info!(site = %site, records, "cycle published");
        FireOutcome::Published
    }

    /// Run the initial cycle, then fire on every cron tick. Never returns
    /// unless the schedule runs out of ticks.
    ///
    /// Each fire runs on its own task so a long cycle never delays the
    /// timer; overlapping ticks are absorbed by the running flag.
    pub async fn run(self: Arc<Self>) {
        let site = self.site();
        info!(site = %site, "scheduler started, running initial cycle");
        self.spawn_fire();

        loop {
            let now = Local::now();
            let Some(next) = next_fire(&self.schedule, &now) else {
                warn!(site = %site, "schedule has no further ticks, timer stopped");
                return;
            };
            debug!(site = %site, next = %next, "timer armed");
            sleep((next - now).to_std().unwrap_or_default()).await;
            self.spawn_fire();
        }
    }

    fn spawn_fire(self: &Arc<Self>) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.fire_now().await;
        });
    }
}
