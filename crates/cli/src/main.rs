//! Newsdesk entry point.
//!
//! This binary is the composition root. It:
//!
//! 1. parses configuration from flags and environment ([`config::Config`]);
//! 2. installs the tracing subscriber, with OTLP export when configured;
//! 3. builds the infrastructure (OpenAI provider, HTTP source fetcher, file
//!    click log) and injects it into the [`nodes::Newsdesk`] controller;
//! 4. serves the web UI until Ctrl-C, then cancels in-flight generations.

mod config;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use llm::{HttpSourceFetcher, OpenAiProvider};
use nodes::{EditorialPipeline, Newsdesk};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use web::FileClickLog;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    let telemetry = telemetry::init(config.log_format, config.otlp_endpoint.as_deref())?;

    let result = run(config).await;
    if let Err(err) = &result {
        error!(error = %format!("{err:#}"), "newsdesk stopped with an error");
    }

    telemetry.shutdown();
    result
}

async fn run(config: Config) -> anyhow::Result<()> {
    let api_key = config.api_key()?;
    let model = config.model_name()?;

    let checker = config.credentials();
    if !checker.is_configured() {
        warn!("APP_USERNAME or PASSWORD is not set; every login will be rejected");
    }

    let mut provider = OpenAiProvider::new(api_key).context("could not create the OpenAI client")?;
    if let Some(base_url) = &config.openai_base_url {
        provider = provider.with_base_url(base_url.as_str());
    }
    let fetcher = HttpSourceFetcher::new().context("could not create the reference fetcher")?;
    let pipeline = EditorialPipeline::new(Arc::new(provider), Arc::new(fetcher), model.clone());

    let click_log = FileClickLog::new(&config.click_log);
    info!(
        model = %model,
        click_log = %click_log.path().display(),
        "newsdesk configured"
    );

    let desk = Newsdesk::new(checker, Arc::new(pipeline), Arc::new(click_log));
    let listener = web::bind(config.listen).await?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "could not listen for Ctrl-C; stop the process to exit");
                return;
            }
            info!("shutdown requested");
            shutdown.cancel();
        }
    });

    web::serve(listener, desk.clone(), shutdown).await?;
    desk.shutdown();
    Ok(())
}
