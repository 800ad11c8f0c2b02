//! `m4db-worker` -- runs a single M4DB model.
//!
//! Launched by the batch scheduler as `m4db-worker <model-unique-id>`. The
//! process exits 0 when the attempt ended cleanly (finished, marked re-run
//! or deferred), 1 when it failed and 2 on bad usage or configuration.
//! See [`WorkerConfig::from_env`] for the environment variables.

use std::process::ExitCode;
use std::sync::Arc;

use m4db_client::CoordinatorClient;
use m4db_core::types::UniqueId;
use m4db_pipeline::{JobOutcome, JobRunner};
use m4db_worker::config::WorkerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "m4db_worker=info,m4db_pipeline=info,m4db_client=info".into()
            }),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    let Some(raw_id) = std::env::args().nth(1) else {
        tracing::error!("Usage: m4db-worker <model-unique-id>");
        return ExitCode::from(2);
    };
    let unique_id: UniqueId = match raw_id.parse() {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(unique_id = %raw_id, error = %e, "Model unique id is not a UUID");
            return ExitCode::from(2);
        }
    };

    let config = match WorkerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid worker configuration");
            return ExitCode::from(2);
        }
    };
    tracing::info!(
        unique_id = %unique_id,
        coordinator = %config.coordinator_url,
        file_root = %config.file_root.display(),
        working_root = %config.working_root.display(),
        "Starting m4db-worker",
    );

    let client = match CoordinatorClient::new(
        &config.coordinator_url,
        config.retry.clone(),
        config.request_timeout,
    ) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build coordinator client");
            return ExitCode::FAILURE;
        }
    };

    if !client.is_alive().await {
        tracing::warn!(
            coordinator = %config.coordinator_url,
            "Coordinator not answering yet, relying on request retries",
        );
    }

    let runner = JobRunner::new(Arc::new(client), config.runner_config());
    match runner.run(&unique_id).await {
        Ok(JobOutcome::Finished(job)) => {
            tracing::info!(
                unique_id = %unique_id,
                archive = %job.archive_path.display(),
                solver_secs = job.solver_duration.as_secs_f64(),
                quants = job.quants.populated_count(),
                "Model finished",
            );
            ExitCode::SUCCESS
        }
        Ok(JobOutcome::ReRun) | Ok(JobOutcome::Deferred(_)) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
