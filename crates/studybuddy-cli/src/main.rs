//! Study Buddy CLI: upload syllabi and inspect saved schedules.
//!
//! Set STUDYBUDDY_API_URL to point at the API (defaults to http://localhost:4000).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use studybuddy_cli::{init_tracing, render_schedule_table};
use studybuddy_client::{
    format_file_size, CandidateFile, ClientConfig, HttpGateways, Panel, StudyBuddyApp,
    UploadStage, UploadStatus,
};
use studybuddy_core::Schedule;

#[derive(Parser)]
#[command(name = "studybuddy", about = "Study Buddy syllabus CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload syllabus files and save their schedules
    Upload {
        /// Paths to the syllabus files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output format: json or table
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show the schedule saved for a session
    Show {
        /// Session user id printed by `upload`
        user_id: String,
        /// Output format: json or table
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List the sidebar panels
    Panels,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn print_schedule(schedule: &Schedule, format: &str) -> anyhow::Result<()> {
    match format {
        "json" => print_json(schedule),
        "table" => {
            print!("{}", render_schedule_table(schedule));
            Ok(())
        }
        other => Err(anyhow::anyhow!(
            "Invalid format '{}'. Must be: json or table",
            other
        )),
    }
}

fn describe(stage: &UploadStage) -> Option<&'static str> {
    match stage {
        UploadStage::Extracting => Some("Extracting text..."),
        UploadStage::Formatting => Some("Formatting schedule..."),
        UploadStage::Persisting => Some("Saving schedule..."),
        _ => None,
    }
}

async fn upload(config: ClientConfig, files: Vec<PathBuf>, format: &str) -> anyhow::Result<()> {
    let app = StudyBuddyApp::from_config(config)?;
    app.navigation().select(Panel::UploadSyllabus);
    eprintln!("{}", app.intake().limits().summary());

    let mut candidates = Vec::with_capacity(files.len());
    for path in &files {
        candidates.push(CandidateFile::from_path(path).await?);
    }

    let report = app.intake().select_files(candidates);
    if !report.is_accepted() {
        for error in &report.errors {
            eprintln!("error: {}", error);
        }
        return Err(anyhow::anyhow!("No files were selected"));
    }
    for file in app.intake().files() {
        eprintln!("  {} ({})", file.name, format_file_size(file.size));
    }

    let mut stages = app.orchestrator().subscribe();
    let progress = tokio::spawn(async move {
        while stages.changed().await.is_ok() {
            if let Some(line) = describe(&stages.borrow_and_update()) {
                eprintln!("{}", line);
            }
        }
    });

    let status = tokio::select! {
        status = app.submit() => status?,
        _ = tokio::signal::ctrl_c() => {
            app.orchestrator().cancel_current();
            progress.abort();
            return Err(anyhow::anyhow!("Upload cancelled"));
        }
    };
    progress.abort();

    for outcome in app.orchestrator().take_completed() {
        eprintln!(
            "Saved {} weeks from {} as session {}",
            outcome.schedule.len(),
            outcome.file_name,
            outcome.user_id
        );
        print_schedule(&outcome.schedule, format)?;
    }

    if status == UploadStatus::Error {
        if let UploadStage::Error { message, .. } = app.orchestrator().stage() {
            eprintln!("error: {}", message);
        }
        for error in app.intake().errors() {
            eprintln!("{}", error);
        }
        return Err(anyhow::anyhow!("Upload failed"));
    }
    Ok(())
}

fn load_config() -> anyhow::Result<ClientConfig> {
    ClientConfig::from_env().context("Invalid client configuration")
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Upload { files, format } => upload(load_config()?, files, &format).await?,
        Commands::Show { user_id, format } => {
            let gateways = HttpGateways::from_config(&load_config()?)?;
            let stored = gateways
                .fetch_schedule(&user_id)
                .await
                .with_context(|| format!("Failed to load schedule for session {}", user_id))?;
            print_schedule(&Schedule::new(stored.syllabus), &format)?;
        }
        Commands::Panels => {
            let default = Panel::default();
            for panel in Panel::ALL {
                let marker = if panel == default { "*" } else { " " };
                println!("{} {}", marker, panel);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    run(Cli::parse()).await
}
