//! vco-deploy - Entry Point
//!
//! Deploys a plug-in bundle to a VMware Orchestrator server and optionally
//! restarts the Orchestrator service.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use vco_deploy::app::options::DeployOptions;
use vco_deploy::app::run::{load_options, run};
use vco_deploy::logs::{init_logging, LogOptions};
use vco_deploy::utils::{version_info, LONG_VERSION};

/// Deploy a plug-in to VMware Orchestrator
#[derive(Parser)]
#[command(name = "vco-deploy", version, long_version = LONG_VERSION)]
struct Cli {
    /// JSON settings file; command-line flags take precedence
    #[arg(short, long, env = "VCO_DEPLOY_CONFIG")]
    config: Option<PathBuf>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    report_json: bool,

    #[command(flatten)]
    options: DeployOptions,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let options = match load_options(cli.config.as_deref(), cli.options).await {
        Ok(options) => options,
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: options.log_level.unwrap_or_default(),
        json_format: options.log_json.unwrap_or(false),
        ansi: std::io::stderr().is_terminal(),
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!("vco-deploy {}", version_info().version);

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown_signal(cancel.clone()));

    match run(options, cancel).await {
        Ok(report) => {
            if cli.report_json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => warn!("Unable to serialize the run report: {}", e),
                }
            }
            if !report.is_clean() {
                warn!("Deployment finished with {} warning(s)", report.warnings.len());
            }
            ExitCode::from(report.exit_code())
        }
        Err(e) => {
            let local = e.is_local();
            let err = anyhow::Error::new(e);
            error!("{:#}", err);
            if local {
                info!("Nothing was sent to the Orchestrator server.");
            }
            ExitCode::FAILURE
        }
    }
}

async fn cancel_on_shutdown_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("SIGTERM received, cancelling deployment...");
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Ctrl+C received, cancelling deployment...");
                    }
                }
            }
            Err(e) => {
                warn!("Unable to listen for SIGTERM: {}", e);
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                info!("Ctrl+C received, cancelling deployment...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        info!("Ctrl+C received, cancelling deployment...");
    }

    cancel.cancel();
}
