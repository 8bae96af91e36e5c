//! Error types for the deployer

use std::path::PathBuf;

use thiserror::Error;

use crate::models::outcome::OperationError;

/// Main error type for a deployment run
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid or contradictory input, raised before any network call
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The bundle is not on disk, raised before any network call
    #[error("Plug-in file not found: {}", .0.display())]
    BundleNotFound(PathBuf),

    #[error("Plug-in package deletion has failed")]
    PackageDeletion(#[source] OperationError),

    #[error("Plug-in upload has failed")]
    Upload(#[source] OperationError),

    #[error(
        "Orchestrator service restart has failed. \
         Please restart the Orchestrator service manually for the changes to take effect"
    )]
    Restart(#[source] OperationError),

    #[error(
        "An error occurred while waiting for the configuration changes to be applied: {0}. \
         Please verify your Orchestrator configuration"
    )]
    ConvergenceAborted(String),

    #[error("Deployment was cancelled during {0}")]
    Cancelled(String),

    #[error("Invalid phase transition: {0}")]
    PhaseError(String),
}

impl DeployError {
    /// Whether the failure happened before anything was sent to the server
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            DeployError::ConfigError(_) | DeployError::BundleNotFound(_)
        )
    }
}
