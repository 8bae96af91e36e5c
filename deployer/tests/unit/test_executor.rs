//! Executor tests against a scripted server

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use vco_deploy::app::options::DeployOptions;
use vco_deploy::deploy::executor::{DeployTiming, DeploymentExecutor};
use vco_deploy::errors::DeployError;
use vco_deploy::models::outcome::{OperationError, RejectReason};
use vco_deploy::models::report::RestartOutcome;
use vco_deploy::models::status::ServiceStatus;

use crate::mock::{config, fingerprints, options_for, restart_options, CallCounts, MockApi};

#[tokio::test(start_paused = true)]
async fn test_upload_without_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(options_for(dir.path()));
    let api = MockApi::default();

    let report = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await
        .unwrap();

    assert_eq!(report.restart, RestartOutcome::NotRequested);
    assert!(report.is_clean());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(
        api.calls(),
        CallCounts {
            upload: 1,
            ..Default::default()
        }
    );
    assert_eq!(api.last_overwrite(), Some(true));
}

#[tokio::test(start_paused = true)]
async fn test_overwrite_flag_is_forwarded() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(DeployOptions {
        overwrite: Some(false),
        ..options_for(dir.path())
    });
    let api = MockApi::default();

    DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await
        .unwrap();

    assert_eq!(api.last_overwrite(), Some(false));
}

#[tokio::test(start_paused = true)]
async fn test_restart_until_running() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(restart_options(dir.path()));
    let api = MockApi::default().with_statuses(vec![
        Ok(ServiceStatus::Restarting),
        Ok(ServiceStatus::Restarting),
        Ok(ServiceStatus::Running),
    ]);

    let start = Instant::now();
    let report = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await
        .unwrap();

    assert_eq!(report.restart, RestartOutcome::Running);
    assert!(report.is_clean());
    // Three polls plus the final read
    assert_eq!(
        api.calls(),
        CallCounts {
            upload: 1,
            restart: 1,
            status: 4,
            ..Default::default()
        }
    );
    // Settle delay plus two poll delays
    assert_eq!(start.elapsed(), Duration::from_secs(13));
}

#[tokio::test(start_paused = true)]
async fn test_delete_before_upload() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(DeployOptions {
        delete_package: Some(true),
        package_name: Some("com.example.demo".into()),
        ..options_for(dir.path())
    });
    let api = MockApi::default();

    DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await
        .unwrap();

    assert_eq!(api.calls().delete, 1);
    assert_eq!(api.calls().upload, 1);
    assert_eq!(api.last_package().as_deref(), Some("com.example.demo"));
}

#[tokio::test(start_paused = true)]
async fn test_rejected_deletion_stops_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(DeployOptions {
        delete_package: Some(true),
        package_name: Some("com.example.demo".into()),
        ..options_for(dir.path())
    });
    let api = MockApi {
        delete_result: Err(OperationError::rejected(401)),
        ..Default::default()
    };

    let result = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await;

    match result {
        Err(DeployError::PackageDeletion(e)) => {
            assert_eq!(e.reason(), Some(RejectReason::Unauthenticated))
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(api.calls().upload, 0);
}

#[tokio::test(start_paused = true)]
async fn test_upload_conflict_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(restart_options(dir.path()));
    let api = MockApi {
        upload_result: Err(OperationError::rejected(409)),
        ..Default::default()
    };

    let result = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await;

    match result {
        Err(DeployError::Upload(e)) => assert_eq!(e.reason(), Some(RejectReason::AlreadyExists)),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(api.calls().restart, 0);
    assert_eq!(api.calls().status, 0);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_restart_asks_for_manual_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(restart_options(dir.path()));
    let api = MockApi {
        restart_result: Err(OperationError::rejected(403)),
        ..Default::default()
    };

    let err = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::Restart(_)));
    assert!(err.to_string().contains("manually"));
    assert_eq!(api.calls().upload, 1);
    assert_eq!(api.calls().status, 0);
}

#[tokio::test(start_paused = true)]
async fn test_restart_timeout_is_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(restart_options(dir.path()));
    let api = MockApi::default().with_statuses(vec![Ok(ServiceStatus::Restarting)]);

    let start = Instant::now();
    let report = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await
        .unwrap();

    // Twelve polls plus the final read, which still says RESTARTING
    assert_eq!(api.calls().status, 13);
    assert_eq!(report.restart, RestartOutcome::Unknown);
    assert_eq!(report.exit_code(), 0);
    assert!(report.warnings.iter().any(|w| w.contains("not responding")));
    assert_eq!(start.elapsed(), Duration::from_secs(3 + 55));
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_status_during_restart_continues() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(restart_options(dir.path()));
    let api = MockApi::default().with_statuses(vec![
        Err(OperationError::Transport("connection reset".into())),
        Ok(ServiceStatus::Running),
    ]);

    let report = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await
        .unwrap();

    assert_eq!(api.calls().status, 2);
    assert_eq!(report.restart, RestartOutcome::Running);
    assert_eq!(report.warnings.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_final_status_is_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(restart_options(dir.path()));
    let api = MockApi::default().with_statuses(vec![
        Ok(ServiceStatus::Running),
        Err(OperationError::Transport("connection reset".into())),
    ]);

    let report = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await
        .unwrap();

    assert_eq!(api.calls().status, 2);
    assert_eq!(report.restart, RestartOutcome::Unknown);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("final Orchestrator service status"));
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stopped_service_sets_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(restart_options(dir.path()));
    let api = MockApi::default().with_statuses(vec![Ok(ServiceStatus::Stopped)]);

    let report = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await
        .unwrap();

    assert_eq!(report.restart, RestartOutcome::Stopped);
    assert_eq!(report.exit_code(), 2);
    assert!(!report.is_clean());
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_pending_changes() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(DeployOptions {
        wait_for_pending_changes: Some(true),
        ..restart_options(dir.path())
    });
    let api = MockApi::default().with_fingerprints(vec![
        Ok(Some(fingerprints("a1", "b2"))),
        Ok(Some(fingerprints("a1", "b2"))),
        Ok(Some(fingerprints("b2", "b2"))),
    ]);

    let report = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await
        .unwrap();

    assert_eq!(api.calls().fingerprints, 3);
    assert_eq!(report.restart, RestartOutcome::Running);
    assert!(report.is_clean());
}

#[tokio::test(start_paused = true)]
async fn test_pending_changes_timeout_is_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(DeployOptions {
        wait_for_pending_changes: Some(true),
        ..restart_options(dir.path())
    });
    let api = MockApi::default().with_fingerprints(vec![Ok(Some(fingerprints("a1", "b2")))]);

    let report = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await
        .unwrap();

    assert_eq!(api.calls().fingerprints, 24);
    assert_eq!(report.restart, RestartOutcome::Running);
    assert!(report.warnings.iter().any(|w| w.contains("configuration was not applied")));
}

#[tokio::test(start_paused = true)]
async fn test_missing_fingerprints_abort_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(DeployOptions {
        wait_for_pending_changes: Some(true),
        ..restart_options(dir.path())
    });
    let api = MockApi::default().with_fingerprints(vec![Ok(None)]);

    let result = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await;

    assert!(matches!(result, Err(DeployError::ConvergenceAborted(_))));
    assert_eq!(api.calls().fingerprints, 1);
    // Only the restart poll, no final read
    assert_eq!(api.calls().status, 1);
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_config_service_aborts_convergence_wait() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(DeployOptions {
        wait_for_pending_changes: Some(true),
        ..restart_options(dir.path())
    });
    let api = MockApi::default()
        .with_fingerprints(vec![Err(OperationError::Transport("connection refused".into()))]);

    let result = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await;

    match result {
        Err(DeployError::ConvergenceAborted(reason)) => assert!(reason.contains("connection refused")),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(api.calls().fingerprints, 1);
    // Only the restart poll, no final read
    assert_eq!(api.calls().status, 1);
}

#[tokio::test(start_paused = true)]
async fn test_missing_package_name_makes_no_calls() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(options_for(dir.path()));
    config.delete_package = true;
    config.package_name = None;
    let api = MockApi::default();

    let result = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await;

    assert!(matches!(result, Err(DeployError::ConfigError(_))));
    assert_eq!(api.calls(), CallCounts::default());
}

#[tokio::test(start_paused = true)]
async fn test_missing_bundle_makes_no_calls() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(options_for(dir.path()));
    config.plugin_file = "o11nplugin-absent-1.0".into();
    let api = MockApi::default();

    let result = DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .run()
        .await;

    assert!(matches!(result, Err(DeployError::BundleNotFound(_))));
    assert_eq!(api.calls(), CallCounts::default());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_upload() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(options_for(dir.path()));
    let api = MockApi::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = DeploymentExecutor::new(&api, &config, cancel).run().await;

    assert!(matches!(result, Err(DeployError::Cancelled(_))));
    assert_eq!(api.calls(), CallCounts::default());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_during_restart_wait() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(restart_options(dir.path()));
    let api = MockApi::default().with_statuses(vec![Ok(ServiceStatus::Restarting)]);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let result = DeploymentExecutor::new(&api, &config, cancel).run().await;

    match result {
        Err(DeployError::Cancelled(phase)) => assert_eq!(phase, "restart wait"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(api.calls().restart, 1);
    assert_eq!(start.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_custom_timing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(restart_options(dir.path()));
    let api = MockApi::default().with_statuses(vec![Ok(ServiceStatus::Restarting)]);
    let timing = DeployTiming {
        settle_delay: Duration::ZERO,
        restart_wait: vco_deploy::deploy::poll::PollPolicy {
            max_attempts: 2,
            delay: Duration::from_secs(1),
        },
        ..Default::default()
    };

    let start = Instant::now();
    DeploymentExecutor::new(&api, &config, CancellationToken::new())
        .with_timing(timing)
        .run()
        .await
        .unwrap();

    assert_eq!(api.calls().status, 3);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}
