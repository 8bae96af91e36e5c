//! Deployment run entry point

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::app::config::DeploymentConfig;
use crate::app::options::DeployOptions;
use crate::deploy::executor::DeploymentExecutor;
use crate::errors::DeployError;
use crate::filesys::file::File;
use crate::models::report::DeploymentReport;

/// Overlay command-line options on the settings file, when one is given
pub async fn load_options(
    settings_file: Option<&Path>,
    cli: DeployOptions,
) -> Result<DeployOptions, DeployError> {
    match settings_file {
        Some(path) => {
            let from_file = DeployOptions::from_file(&File::new(path)).await?;
            Ok(from_file.overlay(cli))
        }
        None => Ok(cli),
    }
}

/// Validate the options and deploy the plug-in over HTTPS
pub async fn run(
    options: DeployOptions,
    cancel: CancellationToken,
) -> Result<DeploymentReport, DeployError> {
    let config = DeploymentConfig::from_options(options)?;
    let client = config.server_client()?;

    info!(
        "Deploying plug-in '{}' to VMware Orchestrator at {}",
        config.plugin_file, config.server
    );

    DeploymentExecutor::new(&client, &config, cancel).run().await
}
