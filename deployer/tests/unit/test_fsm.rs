//! Phase tracking of the executor

use tokio_util::sync::CancellationToken;

use vco_deploy::deploy::executor::DeploymentExecutor;
use vco_deploy::deploy::fsm::DeployPhase;
use vco_deploy::models::outcome::OperationError;
use vco_deploy::models::status::ServiceStatus;

use crate::mock::{config, options_for, restart_options, MockApi};

#[tokio::test(start_paused = true)]
async fn test_phase_after_successful_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(restart_options(dir.path()));
    let api = MockApi::default().with_statuses(vec![Ok(ServiceStatus::Running)]);

    let mut executor = DeploymentExecutor::new(&api, &config, CancellationToken::new());
    assert_eq!(executor.phase(), DeployPhase::Validate);

    executor.run().await.unwrap();
    assert_eq!(executor.phase(), DeployPhase::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_phase_after_failed_upload() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(options_for(dir.path()));
    let api = MockApi {
        upload_result: Err(OperationError::Transport("connection refused".into())),
        ..Default::default()
    };

    let mut executor = DeploymentExecutor::new(&api, &config, CancellationToken::new());
    assert!(executor.run().await.is_err());
    assert_eq!(executor.phase(), DeployPhase::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_phase_after_cancellation() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(restart_options(dir.path()));
    let api = MockApi::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut executor = DeploymentExecutor::new(&api, &config, cancel);
    assert!(executor.run().await.is_err());
    assert_eq!(executor.phase(), DeployPhase::Failed);
    assert!(executor.phase().is_terminal());
}
