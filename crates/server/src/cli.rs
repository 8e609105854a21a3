//! CLI argument parsing and the one-shot crawl subcommand.

use clap::{Parser, Subcommand};
use tracing::info;

use teamboard_core::{Config, CrawlJob, Site};

use crate::startup::build_crawlers;

/// Team dashboard: scheduled portal crawls pushed to the browser over WebSocket.
#[derive(Parser, Debug)]
#[command(name = "teamboard", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run both schedulers and the HTTP/WebSocket server (default).
    Serve,
    /// Run exactly one cycle for a site, ignoring schedule and business
    /// hours, and print the result as JSON.
    Crawl {
        /// `task` or `vacation`.
        site: Site,
    },
}

pub async fn crawl_once(config: &Config, site: Site) -> anyhow::Result<()> {
    config.log_summary();
    let crawlers = build_crawlers(config);
    info!(site = %site, "running single cycle");

    let result = match site {
        Site::Task => {
            let result = crawlers.task.run_cycle().await;
            crawlers.task_session.reset().await;
            result
        }
        Site::Vacation => crawlers.vacation.run_cycle().await,
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    if result.status.is_failed() {
        anyhow::bail!("{} cycle failed", site);
    }
    Ok(())
}
