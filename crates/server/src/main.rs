mod api;
mod cli;
mod live;
mod publisher;
mod router;
mod startup;
mod state;

use clap::Parser;

use cli::{Cli, Command};

fn load_config() -> teamboard_core::Config {
    teamboard_core::config::load_dotenv();
    teamboard_core::Config::from_env()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => startup::serve(&config).await,
        Command::Crawl { site } => cli::crawl_once(&config, site).await,
    }
}
