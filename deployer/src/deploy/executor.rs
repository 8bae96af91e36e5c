//! Deployment executor

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::app::config::DeploymentConfig;
use crate::deploy::fsm::{DeployPhase, DeploymentEvent, DeploymentFsm};
use crate::deploy::poll::{poll_until, PollPolicy, PollResult};
use crate::errors::DeployError;
use crate::http::api::ServerApi;
use crate::models::bundle::BundleFile;
use crate::models::report::{DeploymentReport, RestartOutcome};
use crate::models::status::{ConfigFingerprints, ServiceStatus};
use crate::utils::version_info;

/// Delays and polling bounds of a run
#[derive(Debug, Clone)]
pub struct DeployTiming {
    /// Pause between the upload and the restart request
    pub settle_delay: Duration,

    /// Polling while the service restarts
    pub restart_wait: PollPolicy,

    /// Polling while configuration changes are pending
    pub convergence_wait: PollPolicy,
}

impl Default for DeployTiming {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(3),
            restart_wait: PollPolicy::RESTART,
            convergence_wait: PollPolicy::CONVERGENCE,
        }
    }
}

/// Runs one deployment against a server, strictly in sequence
pub struct DeploymentExecutor<'a, A: ServerApi + ?Sized> {
    api: &'a A,
    config: &'a DeploymentConfig,
    timing: DeployTiming,
    cancel: CancellationToken,
    fsm: DeploymentFsm,
    warnings: Vec<String>,
}

impl<'a, A: ServerApi + ?Sized> DeploymentExecutor<'a, A> {
    /// Create a new executor
    pub fn new(api: &'a A, config: &'a DeploymentConfig, cancel: CancellationToken) -> Self {
        Self {
            api,
            config,
            timing: DeployTiming::default(),
            cancel,
            fsm: DeploymentFsm::new(),
            warnings: Vec::new(),
        }
    }

    /// Override delays and polling bounds
    pub fn with_timing(mut self, timing: DeployTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Current phase
    pub fn phase(&self) -> DeployPhase {
        self.fsm.phase()
    }

    /// Run the deployment to completion or to the first fatal error
    pub async fn run(&mut self) -> Result<DeploymentReport, DeployError> {
        let started_at = Utc::now();

        match self.execute().await {
            Ok((bundle, restart)) => Ok(DeploymentReport {
                bundle: bundle.path().to_path_buf(),
                restart,
                warnings: std::mem::take(&mut self.warnings),
                started_at,
                finished_at: Utc::now(),
                version: version_info(),
            }),
            Err(e) => {
                if let Err(invalid) = self.fsm.process(DeploymentEvent::Fail(e.to_string())) {
                    debug!("Failure not recorded: {}", invalid);
                }
                if let Some(phase) = self.fsm.failed_phase() {
                    error!("Deployment failed during {}: {}", phase, e);
                }
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> Result<(BundleFile, RestartOutcome), DeployError> {
        let config = self.config;
        let api = self.api;

        // 1. Validate
        config.validate()?;
        let bundle = BundleFile::locate(&config.plugin_path, &config.plugin_file, config.plugin_type).await?;
        self.advance(DeploymentEvent::Validated {
            delete_package: config.delete_package,
        })?;

        // 2. Delete old packages
        if config.delete_package {
            self.ensure_not_cancelled()?;
            info!("Package deletion was requested.");
            let package_name = config.package_name.as_deref().unwrap_or_default();
            api.delete_package(package_name)
                .await
                .map_err(DeployError::PackageDeletion)?;
            info!("Finished plug-in package deletion.");
            self.advance(DeploymentEvent::PackageDeleted)?;
        }

        // 3. Upload plug-in
        self.ensure_not_cancelled()?;
        api.upload_bundle(&bundle, config.overwrite)
            .await
            .map_err(DeployError::Upload)?;
        info!("Finished plug-in upload.");
        self.advance(DeploymentEvent::Uploaded {
            restart: config.restart,
        })?;

        if !config.restart {
            info!(
                "Orchestrator service restart was not requested. \
                 Please restart the Orchestrator service manually for the changes to take effect."
            );
            return Ok((bundle, RestartOutcome::NotRequested));
        }

        // 4. Let the server commit the upload
        self.sleep(self.timing.settle_delay).await?;
        self.advance(DeploymentEvent::Settled)?;

        // 5. Restart service
        self.ensure_not_cancelled()?;
        info!("Service restart was requested.");
        api.trigger_restart().await.map_err(DeployError::Restart)?;
        self.advance(DeploymentEvent::RestartTriggered)?;

        // 6. Wait for the service to come back
        self.wait_for_restart().await?;
        self.advance(DeploymentEvent::RestartWaitOver {
            wait_for_convergence: config.waits_for_convergence(),
        })?;

        // 7. Wait for the configuration to be applied
        if config.waits_for_convergence() {
            self.wait_for_convergence().await?;
            self.advance(DeploymentEvent::ConvergenceWaitOver)?;
        }

        // 8. Final status
        let restart = self.final_status().await;
        self.advance(DeploymentEvent::StatusRead)?;

        Ok((bundle, restart))
    }

    async fn wait_for_restart(&mut self) -> Result<(), DeployError> {
        let api = self.api;

        let result = poll_until(
            self.timing.restart_wait,
            &self.cancel,
            || api.service_status(),
            |status| *status != ServiceStatus::Restarting,
            tokio::time::sleep,
        )
        .await;

        match result {
            PollResult::Done(status) => {
                debug!("Orchestrator service left the restarting state: {}", status);
            }
            PollResult::TimedOut(_) => {
                self.warn(
                    "Timeout. Orchestrator service is not responding. \
                     Please verify your Orchestrator configuration.",
                );
            }
            PollResult::Aborted(e) => {
                self.warn(&format!(
                    "Unable to read the Orchestrator service status while waiting for the restart: {}",
                    e
                ));
            }
            PollResult::Cancelled => return Err(self.cancelled()),
        }

        Ok(())
    }

    async fn wait_for_convergence(&mut self) -> Result<(), DeployError> {
        info!("Wait for pending changes was requested.");
        let api = self.api;

        let result = poll_until(
            self.timing.convergence_wait,
            &self.cancel,
            || async move {
                match api.config_fingerprints().await {
                    Ok(Some(fingerprints)) => Ok(fingerprints),
                    Ok(None) => Err("no configuration fingerprints were returned".to_string()),
                    Err(e) => Err(e.to_string()),
                }
            },
            |fingerprints: &ConfigFingerprints| {
                let converged = fingerprints.is_converged();
                if !converged {
                    info!("Configuration changes are still pending. Waiting...");
                }
                converged
            },
            tokio::time::sleep,
        )
        .await;

        match result {
            PollResult::Done(_) => {
                info!("Pending configuration changes have been applied.");
                Ok(())
            }
            PollResult::TimedOut(_) => {
                self.warn(
                    "Timeout. Orchestrator configuration was not applied. \
                     Please verify your Orchestrator configuration.",
                );
                Ok(())
            }
            PollResult::Aborted(reason) => Err(DeployError::ConvergenceAborted(reason)),
            PollResult::Cancelled => Err(self.cancelled()),
        }
    }

    async fn final_status(&mut self) -> RestartOutcome {
        match self.api.service_status().await {
            Ok(ServiceStatus::Running) => {
                info!("Finished Orchestrator service restart.");
                info!("Successfully updated plug-in in VMware Orchestrator.");
                RestartOutcome::Running
            }
            Ok(ServiceStatus::Stopped) => {
                self.warn(
                    "Orchestrator service could not be started. \
                     Please verify your Orchestrator configuration.",
                );
                RestartOutcome::Stopped
            }
            Ok(status) => {
                self.warn(&format!(
                    "Orchestrator service returned an unknown status ({}). \
                     Please verify your Orchestrator configuration.",
                    status
                ));
                RestartOutcome::Unknown
            }
            Err(e) => {
                self.warn(&format!("Unable to read the final Orchestrator service status: {}", e));
                RestartOutcome::Unknown
            }
        }
    }

    fn advance(&mut self, event: DeploymentEvent) -> Result<(), DeployError> {
        let phase = self.fsm.process(event).map_err(DeployError::PhaseError)?;
        debug!("Entering phase: {}", phase);
        Ok(())
    }

    fn warn(&mut self, message: &str) {
        warn!("{}", message);
        self.warnings.push(message.to_string());
    }

    fn cancelled(&self) -> DeployError {
        DeployError::Cancelled(self.fsm.phase().to_string())
    }

    fn ensure_not_cancelled(&self) -> Result<(), DeployError> {
        if self.cancel.is_cancelled() {
            return Err(self.cancelled());
        }
        Ok(())
    }

    async fn sleep(&self, duration: Duration) -> Result<(), DeployError> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(self.cancelled()),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

