//! Deployment run report

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::utils::VersionInfo;

/// What happened to the service after the upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartOutcome {
    /// No restart was requested; the operator has to restart manually
    NotRequested,
    /// The service came back up
    Running,
    /// The service did not come back after the restart
    Stopped,
    /// The final status could not be determined
    Unknown,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    /// Uploaded bundle
    pub bundle: PathBuf,

    /// Service state after the upload
    pub restart: RestartOutcome,

    /// Non-fatal problems met along the way
    pub warnings: Vec<String>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Deployer build that produced the report
    pub version: VersionInfo,
}

impl DeploymentReport {
    /// Completed without any warning
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Process exit code for this run.
    ///
    /// A stopped service after a requested restart fails the restart phase
    /// only: the plug-in itself was delivered.
    pub fn exit_code(&self) -> u8 {
        match self.restart {
            RestartOutcome::Stopped => 2,
            _ => 0,
        }
    }
}
