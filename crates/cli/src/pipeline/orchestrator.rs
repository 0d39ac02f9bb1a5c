//! Builds the HTTP clients and dispatcher from settings and drives one run.

use std::sync::Arc;
use std::time::Duration;

use api_clients::{AgifyClient, JokeApiClient, PostmanEchoClient};
use contracts::Settings;
use dispatcher::{BatchPreloader, Chunk, DispatchCache, TaskDispatcher};
use ingestion::{JsonProcessor, ProcessorConfig, ScanResult};
use tracing::{info, instrument};

use crate::error::{CliError, Result};
use crate::pipeline::stats::RunStats;

/// Dispatcher wired to the real services
pub type HttpDispatcher = TaskDispatcher<AgifyClient, JokeApiClient, PostmanEchoClient>;

/// Create the dispatcher described by `settings`
pub fn build_dispatcher(settings: &Settings) -> Result<HttpDispatcher> {
    let timeout = Duration::from_secs(settings.http.timeout_secs);
    let endpoints = &settings.endpoints;

    let lookup = AgifyClient::new(&endpoints.lookup_url, timeout)
        .map_err(|e| CliError::client_setup("lookup", e))?;
    let joke = JokeApiClient::new(&endpoints.joke_url, timeout)
        .map_err(|e| CliError::client_setup("joke", e))?;
    let echo = PostmanEchoClient::new(&endpoints.echo_url, timeout)
        .map_err(|e| CliError::client_setup("echo", e))?;

    Ok(TaskDispatcher::new(lookup, joke, echo).with_batch_size(settings.preload.batch_size))
}

/// Process the input tree once
#[instrument(name = "pipeline_run_once", skip(settings), fields(input = %settings.input.dir.display()))]
pub async fn run_once(settings: &Settings) -> Result<RunStats> {
    let dispatcher = Arc::new(build_dispatcher(settings)?);
    let processor = JsonProcessor::new(ProcessorConfig::from_settings(&settings.input));

    info!("Starting processing run");
    let report = processor.process_all(Arc::clone(&dispatcher)).await?;

    Ok(RunStats {
        report,
        dispatch: dispatcher.metrics(),
    })
}

/// What a run would do, without any network call
#[derive(Debug)]
pub struct RunPlan {
    pub scan: ScanResult,
    pub chunks: Vec<Chunk>,
}

/// Scan inputs and plan the preload batches
pub async fn plan_run(settings: &Settings) -> Result<RunPlan> {
    let processor = JsonProcessor::new(ProcessorConfig::from_settings(&settings.input));
    let scan = processor.scan().await?;
    let chunks =
        BatchPreloader::new(settings.preload.batch_size).plan(scan.age_keys(), &DispatchCache::new());
    Ok(RunPlan { scan, chunks })
}
