use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Parser;

use courier::channel::ChannelEvent;
use courier::config::Config;
use courier::logging::init_logging;
use courier::runner::JobRunner;
use courier::types::JobRequest;
use courier::view::RunStatus;

/// Environment variable consulted when --credential is not given.
const CREDENTIAL_ENV: &str = "COURIER_CREDENTIAL";

/// Width of the progress bar in characters.
const BAR_WIDTH: usize = 20;

#[derive(Parser)]
#[command(
    name = "courier",
    version,
    about = "Submit an automation job and follow its progress step by step"
)]
struct Cli {
    /// Path to a courier.toml config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long)]
    backend_url: Option<String>,

    /// Account identifier to run the job as
    #[arg(long)]
    account: String,

    /// Credential for the account (falls back to $COURIER_CREDENTIAL)
    #[arg(long)]
    credential: Option<String>,

    /// Recipient of the automated action
    #[arg(long)]
    recipient: String,

    /// What the automation should do
    #[arg(long)]
    task: String,

    /// Save step screenshots into this directory after the run
    #[arg(long)]
    save_screenshots: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(backend_url) = &cli.backend_url {
        config.backend.base_url = backend_url.clone();
    }

    let _logging = init_logging(&config, cli.debug)?;

    let credential = match cli
        .credential
        .or_else(|| std::env::var(CREDENTIAL_ENV).ok())
    {
        Some(credential) => credential,
        None => bail!("no credential given: pass --credential or set {CREDENTIAL_ENV}"),
    };

    let request = JobRequest {
        account_id: cli.account,
        credential,
        recipient: cli.recipient,
        task_descriptor: cli.task,
    };

    let expected_steps = config.progress.expected_steps;
    let mut runner = JobRunner::new(&config)?;

    println!("Submitting job...");
    runner.submit(&request).await;

    // Anything delivered synchronously (snapshot) is already in the
    // timeline; print it before draining the live channel.
    let mut printed = print_new_steps(&runner, 0, expected_steps);

    while let Some(event) = runner.pump().await {
        match event {
            ChannelEvent::Opened => println!("Live progress channel open."),
            ChannelEvent::Frame(_) => {
                printed = print_new_steps(&runner, printed, expected_steps);
            }
            ChannelEvent::Closed => println!("Progress channel closed."),
        }
    }

    print_summary(&runner);

    if let Some(dir) = &cli.save_screenshots {
        save_screenshots(&runner, dir).await?;
    }

    if runner.view().status == RunStatus::Failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Print timeline entries not yet shown; returns the new printed count.
fn print_new_steps(runner: &JobRunner, printed: usize, expected_steps: usize) -> usize {
    let view = runner.view();
    let events = view.timeline.events();
    for (index, event) in events.iter().enumerate().skip(printed) {
        let done = index + 1;
        let percent = (((done as f32 / expected_steps.max(1) as f32) * 100.0).round() as u8).min(100);
        let label = if event.description.is_empty() {
            courier::progress::humanize_step(&event.step)
        } else {
            event.description.clone()
        };
        println!(
            "  [{bar}] {percent:>3}% ({done}/{expected_steps}) {label}",
            bar = render_bar(percent),
        );
    }
    events.len()
}

fn render_bar(percent: u8) -> String {
    let filled = (usize::from(percent) * BAR_WIDTH) / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn print_summary(runner: &JobRunner) {
    let view = runner.view();
    println!();
    match view.status {
        RunStatus::Demo => {
            println!("Demo run complete (no real action was performed).");
        }
        RunStatus::Success => {
            println!("Job completed successfully.");
        }
        RunStatus::Failed => {
            println!("Job failed.");
        }
        RunStatus::Idle | RunStatus::Submitting => {
            println!("Job did not reach a terminal state.");
        }
    }
    if !view.message.is_empty() {
        println!("  {}", view.message);
    }
    if let Some(error) = &view.error {
        eprintln!("  {error}");
    }
    if let Some(content) = &view.generated_content {
        println!("  Generated content:");
        let rendered = serde_json::to_string_pretty(content).unwrap_or_default();
        for line in rendered.lines() {
            println!("    {line}");
        }
    }
    let progress = runner.progress();
    match progress.current_step {
        Some(step) => println!(
            "  {} step(s) recorded, last: {step} ({}%).",
            view.timeline.len(),
            progress.percent
        ),
        None => println!("  No steps recorded."),
    }
}

/// Fetch each step's screenshot into `dir`. Failures are per-file and
/// non-fatal, matching the inert-image contract.
async fn save_screenshots(runner: &JobRunner, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    for event in runner.view().timeline.events() {
        match runner.fetch_screenshot(&event.image_ref).await {
            Some(bytes) => {
                let path = dir.join(&event.filename);
                std::fs::write(&path, bytes)?;
                println!("  saved {}", path.display());
            }
            None => println!("  screenshot not available: {}", event.filename),
        }
    }
    Ok(())
}
