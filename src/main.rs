mod api;
mod cli;
mod config;
mod generation;
mod ui;

use anyhow::{Result, bail};
use clap::Parser;

use api::{GenerateOptions, JobBuddyClient};
use cli::{Cli, Command};
use config::JobBuddyConfig;
use generation::{GenerationSession, JobHandle, PollerOptions, SessionState, StatusFetch, classify};
use ui::GenerationProgress;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = JobBuddyConfig::load()?;
    // Command-line flags override the file.
    if let Some(interval) = cli.interval_ms {
        config.poll_interval_ms = interval;
    }
    if let Some(max) = cli.max_attempts {
        config.max_attempts = Some(max);
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let token = (!config.api_token.is_empty()).then(|| config.api_token.clone());
    let client = JobBuddyClient::new(config.base_url.clone(), token);

    match cli.command {
        Command::Generate {
            id,
            export_format,
            poll_only,
        } => generate(&client, &config, id, export_format, poll_only, cli.verbose).await,
        Command::Status { id } => status(&client, id).await,
    }
}

/// Submit a generation request (unless `poll_only`) and poll it to its
/// terminal state, printing the document on success.
async fn generate(
    client: &JobBuddyClient,
    config: &JobBuddyConfig,
    id: String,
    export_format: Option<String>,
    poll_only: bool,
    verbose: bool,
) -> Result<()> {
    let job = JobHandle::new(id);

    if !poll_only {
        let options = GenerateOptions {
            mode: Some("poll".to_string()),
            export_format,
            ..Default::default()
        };
        let receipt = client.submit_generation(&job, &options).await?;
        if verbose {
            eprintln!(
                "submitted job {job}, initial status: {}",
                receipt.initial_status.as_deref().unwrap_or("unknown")
            );
        }
    }

    let progress = GenerationProgress::start(&job.job_id);
    let mut session = GenerationSession::new(
        job,
        PollerOptions {
            interval_ms: config.poll_interval_ms,
            max_attempts: config.max_attempts,
        },
    );
    if verbose {
        eprintln!("session {} for cover letter {}", session.id(), session.job());
    }

    // Ctrl-C abandons the session; the backend job keeps running unobserved.
    let cancel = session.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    session.run(client).await;
    progress.complete(session.state(), session.attempts());

    match session.state() {
        SessionState::Succeeded { document } => {
            progress.print_document(document);
            Ok(())
        }
        SessionState::Failed { kind, message } => {
            bail!("generation failed ({kind}): {message}")
        }
        _ => bail!("polling stopped before a terminal state"),
    }
}

/// Probe the job status once and print its classification.
async fn status(client: &JobBuddyClient, id: String) -> Result<()> {
    let job = JobHandle::new(id);
    let outcome = classify(&client.fetch_status(&job).await);
    ui::print_poll_outcome(&outcome);
    Ok(())
}
