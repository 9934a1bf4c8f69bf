mod app;
mod cli;
mod config;
mod report;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crawl_client::{FixedDelayScheduler, HttpTransitionClient};
use crawl_core::AppState;
use crawl_logging::crawl_info;
use log::LevelFilter;

use crate::app::{run_command, Session};
use crate::cli::Cli;
use crate::config::AppConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(log) = cli.log {
        config.log = log.into();
    }

    let level = if config.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    crawl_logging::initialize(config.log, level, &config.log_file);
    crawl_info!("Talking to {}", config.base_url);

    let client = HttpTransitionClient::new(&config.client_settings())
        .context("building the HTTP client")?;
    let state = AppState::with_settings(config.stage_schedule(), config.items_per_page);
    let mut session = Session::new(
        state,
        Arc::new(client),
        Arc::new(FixedDelayScheduler),
        config.idle_timeout(),
    )
    .context("starting the effect runner")?;

    run_command(&mut session, cli.command)?;
    println!("{}", report::render(&session.state().view()));
    Ok(())
}
