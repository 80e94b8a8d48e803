//! tdash-client - Trade-History Dashboard Workflow Client
//!
//! Command-line front end for the processing service: uploads the
//! reference-rate and trade-history files, triggers processing runs, and
//! lists or cleans up server-side files. All workflow state lives in a
//! single in-process session; rendering happens here, the rules live in
//! the library.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tdash_client::models::{
    LocalFileHandle, ProcessConfig, ProcessOutcome, SelectFor, StepStatus, UploadKind,
    UploadReport,
};
use tdash_client::services::{HttpTransferClient, SelectionStore, TransferApi, WorkflowController};
use tdash_common::api::RemoteFileRecord;
use tdash_common::config::resolve_service_url;
use tdash_common::format::{format_size, format_timestamp};

#[derive(Parser)]
#[command(name = "tdash-client", version, about = "Trade-history dashboard workflow client")]
struct Cli {
    /// Base URL of the processing service (overrides TDASH_SERVICE_URL
    /// and the TOML config)
    #[arg(long)]
    service_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe service connectivity
    Health,

    /// List uploaded input files
    Files,

    /// List generated output files
    Outputs,

    /// Upload a reference-rate file and one or more trade-history files
    Upload {
        /// Local path of the reference-rate (JISDOR) file
        #[arg(long)]
        reference: PathBuf,

        /// Local path of a trade-history file (repeatable, order kept)
        #[arg(long = "trade", required = true)]
        trades: Vec<PathBuf>,
    },

    /// Run processing against files already stored on the server
    Process {
        /// Server filename to use as the reference-rate file
        #[arg(long)]
        reference: Option<String>,

        /// Server filename to add to the trade history (repeatable)
        #[arg(long = "trade")]
        trades: Vec<String>,

        /// Server filename whose category is inferred from its name
        /// (prefer --reference/--trade to be explicit)
        #[arg(long = "select")]
        selects: Vec<String>,

        #[arg(long)]
        rate_spot: f64,

        #[arg(long)]
        rate_remote: f64,
    },

    /// Upload and process in one run
    Run {
        #[arg(long)]
        reference: PathBuf,

        #[arg(long = "trade", required = true)]
        trades: Vec<PathBuf>,

        #[arg(long)]
        rate_spot: f64,

        #[arg(long)]
        rate_remote: f64,
    },

    /// Delete all uploaded input files
    CleanupInputs {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Delete all generated output files
    CleanupOutputs {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Print the download URL for an output file
    DownloadUrl { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let base_url = resolve_service_url(cli.service_url.as_deref());
    info!("Service: {}", base_url);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let transfer = HttpTransferClient::new(&base_url)?;
    let controller = WorkflowController::new(transfer, SelectionStore::new());

    match cli.command {
        Command::Health => {
            let health = controller.transfer().health().await?;
            println!("{} ({}) at {}", health.status, health.service, health.time);
        }

        Command::Files => {
            let files = controller.refresh_inputs().await?;
            print_listing("Uploaded files", &files);
        }

        Command::Outputs => {
            let files = controller.refresh_outputs().await?;
            print_listing("Output files", &files);
        }

        Command::Upload { reference, trades } => {
            stage_pending(&controller, &reference, &trades).await?;
            let report = controller.upload_all().await?;
            print_report(&report);
            if !report.succeeded() {
                bail!("upload aborted, see report above");
            }
            print_selection(&controller).await;
        }

        Command::Process {
            reference,
            trades,
            selects,
            rate_spot,
            rate_remote,
        } => {
            if let Some(name) = reference {
                controller.select_from_listing(name, SelectFor::Reference).await;
            }
            for name in trades {
                controller
                    .select_from_listing(name, SelectFor::TradeHistory)
                    .await;
            }
            for name in selects {
                let category = SelectFor::infer(&name);
                warn!(
                    file = %name,
                    category = ?category,
                    "Category inferred from filename, pass --reference/--trade to be explicit"
                );
                controller.select_from_listing(name, category).await;
            }

            let outcome = controller
                .request_processing(ProcessConfig {
                    rate_spot,
                    rate_remote,
                })
                .await?;
            print_outcome(&outcome, &controller);
            if !outcome.succeeded {
                bail!("processing failed");
            }
        }

        Command::Run {
            reference,
            trades,
            rate_spot,
            rate_remote,
        } => {
            stage_pending(&controller, &reference, &trades).await?;
            let report = controller.upload_all().await?;
            print_report(&report);
            if !report.succeeded() {
                bail!("upload aborted, processing not attempted");
            }

            let outcome = controller
                .request_processing(ProcessConfig {
                    rate_spot,
                    rate_remote,
                })
                .await?;
            print_outcome(&outcome, &controller);
            if !outcome.succeeded {
                bail!("processing failed");
            }
        }

        Command::CleanupInputs { yes } => {
            let confirm: fn(&str) -> bool = if yes { |_| true } else { confirm_on_stdin };
            let deleted = controller.cleanup_inputs(confirm).await?;
            report_cleanup(deleted);
        }

        Command::CleanupOutputs { yes } => {
            let confirm: fn(&str) -> bool = if yes { |_| true } else { confirm_on_stdin };
            let deleted = controller.cleanup_outputs(confirm).await?;
            report_cleanup(deleted);
        }

        Command::DownloadUrl { name } => {
            println!("{}", controller.transfer().download_link_for(&name));
        }
    }

    Ok(())
}

/// Stage local files as the pending selection
async fn stage_pending(
    controller: &WorkflowController<HttpTransferClient>,
    reference: &Path,
    trades: &[PathBuf],
) -> Result<()> {
    controller.set_pending_reference(handle_for(reference)?).await;
    let handles = trades
        .iter()
        .map(|path| handle_for(path))
        .collect::<Result<Vec<_>>>()?;
    controller.set_pending_trade_history(handles).await;
    Ok(())
}

fn handle_for(path: &Path) -> Result<LocalFileHandle> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("cannot read '{}'", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("'{}' has no usable filename", path.display()))?;
    Ok(LocalFileHandle::new(name, metadata.len(), path))
}

fn confirm_on_stdin(prompt: &str) -> bool {
    use std::io::Write;

    print!("{} [y/N] ", prompt);
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

fn report_cleanup(deleted: Option<u64>) {
    match deleted {
        Some(count) => println!("Deleted {} files", count),
        None => println!("Cleanup cancelled"),
    }
}

fn print_listing(title: &str, files: &[RemoteFileRecord]) {
    println!("{} ({}):", title, files.len());
    if files.is_empty() {
        println!("  (none)");
        return;
    }
    for file in files {
        println!(
            "  {}  {}  {}",
            file.name,
            format_size(file.size),
            format_timestamp(file.timestamp())
        );
    }
}

fn print_report(report: &UploadReport) {
    for step in &report.steps {
        let label = match step.kind {
            UploadKind::Reference => "reference",
            UploadKind::TradeHistory => "trade    ",
        };
        match &step.status {
            StepStatus::Uploaded { server_name } => println!(
                "  uploaded  {} {} ({}) -> {}",
                label,
                step.local_name,
                format_size(step.size),
                server_name
            ),
            StepStatus::Failed { error } => {
                println!("  FAILED    {} {}: {}", label, step.local_name, error)
            }
            StepStatus::Skipped => println!("  skipped   {} {}", label, step.local_name),
        }
    }
}

async fn print_selection(controller: &WorkflowController<HttpTransferClient>) {
    let selection = controller.selection().await;
    println!(
        "Selected reference: {}",
        selection.reference.as_deref().unwrap_or("(none)")
    );
    println!("Selected trade history ({}):", selection.trade_history.len());
    for name in &selection.trade_history {
        println!("  {}", name);
    }
}

fn print_outcome(outcome: &ProcessOutcome, controller: &WorkflowController<HttpTransferClient>) {
    if outcome.succeeded {
        println!("Processing succeeded");
    } else {
        println!(
            "Processing failed: {}",
            outcome.error_message.as_deref().unwrap_or("unknown error")
        );
    }

    // The log accompanies success and failure alike
    for line in &outcome.logs {
        for part in line.lines() {
            println!("  | {}", part);
        }
    }

    if let Some(name) = &outcome.output_file {
        println!("Output: {}", controller.transfer().download_link_for(name));
    }
}
