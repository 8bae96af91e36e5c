//! Finite State Machine for a plug-in deployment run

use std::fmt;

/// Deployment phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPhase {
    /// Checking the effective configuration
    Validate,

    /// Deleting the previous plug-in package
    DeletePackage,

    /// Uploading the bundle
    Upload,

    /// Letting the server commit the upload before a restart
    SettleDelay,

    /// Requesting the service restart
    Restart,

    /// Waiting for the service to leave the restarting state
    WaitForRestart,

    /// Waiting for pending configuration changes to be applied
    WaitForConvergence,

    /// Reading the service status one last time
    FinalStatus,

    /// Run finished
    Completed,

    /// Run aborted
    Failed,
}

impl DeployPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeployPhase::Completed | DeployPhase::Failed)
    }
}

impl fmt::Display for DeployPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DeployPhase::Validate => "configuration validation",
            DeployPhase::DeletePackage => "package deletion",
            DeployPhase::Upload => "plug-in upload",
            DeployPhase::SettleDelay => "settle delay",
            DeployPhase::Restart => "service restart",
            DeployPhase::WaitForRestart => "restart wait",
            DeployPhase::WaitForConvergence => "configuration convergence wait",
            DeployPhase::FinalStatus => "final status check",
            DeployPhase::Completed => "completed",
            DeployPhase::Failed => "failed",
        };
        f.write_str(text)
    }
}

/// Deployment event
#[derive(Debug, Clone)]
pub enum DeploymentEvent {
    /// Configuration accepted
    Validated { delete_package: bool },

    /// Old package removed (or absent)
    PackageDeleted,

    /// Bundle accepted by the server
    Uploaded { restart: bool },

    /// Settle delay elapsed
    Settled,

    /// Restart accepted by the server
    RestartTriggered,

    /// Restart wait finished, done or not
    RestartWaitOver { wait_for_convergence: bool },

    /// Convergence wait finished, done or not
    ConvergenceWaitOver,

    /// Final status read
    StatusRead,

    /// Current phase failed
    Fail(String),
}

/// Deployment FSM
#[derive(Debug, Clone)]
pub struct DeploymentFsm {
    phase: DeployPhase,
    error: Option<String>,
    failed_phase: Option<DeployPhase>,
}

impl DeploymentFsm {
    /// Create a new FSM in the validation phase
    pub fn new() -> Self {
        Self {
            phase: DeployPhase::Validate,
            error: None,
            failed_phase: None,
        }
    }

    /// Get current phase
    pub fn phase(&self) -> DeployPhase {
        self.phase
    }

    /// Get error message if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Phase that was running when the run failed
    pub fn failed_phase(&self) -> Option<DeployPhase> {
        self.failed_phase
    }

    /// Process an event and transition phase
    pub fn process(&mut self, event: DeploymentEvent) -> Result<DeployPhase, String> {
        let new_phase = match (self.phase, &event) {
            (DeployPhase::Validate, DeploymentEvent::Validated { delete_package: true }) => {
                DeployPhase::DeletePackage
            }
            (DeployPhase::Validate, DeploymentEvent::Validated { delete_package: false }) => {
                DeployPhase::Upload
            }

            (DeployPhase::DeletePackage, DeploymentEvent::PackageDeleted) => DeployPhase::Upload,

            (DeployPhase::Upload, DeploymentEvent::Uploaded { restart: true }) => {
                DeployPhase::SettleDelay
            }
            (DeployPhase::Upload, DeploymentEvent::Uploaded { restart: false }) => {
                DeployPhase::Completed
            }

            (DeployPhase::SettleDelay, DeploymentEvent::Settled) => DeployPhase::Restart,

            (DeployPhase::Restart, DeploymentEvent::RestartTriggered) => DeployPhase::WaitForRestart,

            (
                DeployPhase::WaitForRestart,
                DeploymentEvent::RestartWaitOver {
                    wait_for_convergence: true,
                },
            ) => DeployPhase::WaitForConvergence,
            (
                DeployPhase::WaitForRestart,
                DeploymentEvent::RestartWaitOver {
                    wait_for_convergence: false,
                },
            ) => DeployPhase::FinalStatus,

            (DeployPhase::WaitForConvergence, DeploymentEvent::ConvergenceWaitOver) => {
                DeployPhase::FinalStatus
            }

            (DeployPhase::FinalStatus, DeploymentEvent::StatusRead) => DeployPhase::Completed,

            (phase, DeploymentEvent::Fail(err)) if !phase.is_terminal() => {
                self.error = Some(err.clone());
                self.failed_phase = Some(phase);
                DeployPhase::Failed
            }

            // Invalid transitions
            (phase, event) => {
                return Err(format!("{:?} -> {:?}", phase, event));
            }
        };

        self.phase = new_phase;
        Ok(new_phase)
    }
}

impl Default for DeploymentFsm {
    fn default() -> Self {
        Self::new()
    }
}
