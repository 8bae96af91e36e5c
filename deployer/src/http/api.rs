//! Remote operations used by the deployment

use async_trait::async_trait;

use crate::http::client::ServerClient;
use crate::models::bundle::BundleFile;
use crate::models::outcome::{OperationError, OperationOutcome};
use crate::models::status::{ConfigFingerprints, ServiceStatus};

/// Server operations trait for testability
#[async_trait]
pub trait ServerApi: Send + Sync {
    /// Delete a plug-in package; a missing package counts as success
    async fn delete_package(&self, package_name: &str) -> OperationOutcome;

    /// Upload the plug-in bundle
    async fn upload_bundle(&self, bundle: &BundleFile, overwrite: bool) -> OperationOutcome;

    /// Trigger a service restart
    async fn trigger_restart(&self) -> OperationOutcome;

    /// Read the service status; errors are transport faults only
    async fn service_status(&self) -> Result<ServiceStatus, OperationError>;

    /// Read the configuration fingerprints; `None` when the server has no data
    async fn config_fingerprints(&self) -> Result<Option<ConfigFingerprints>, OperationError>;
}

#[async_trait]
impl ServerApi for ServerClient {
    async fn delete_package(&self, package_name: &str) -> OperationOutcome {
        ServerClient::delete_package(self, package_name).await
    }

    async fn upload_bundle(&self, bundle: &BundleFile, overwrite: bool) -> OperationOutcome {
        ServerClient::upload_bundle(self, bundle, overwrite).await
    }

    async fn trigger_restart(&self) -> OperationOutcome {
        ServerClient::trigger_restart(self).await
    }

    async fn service_status(&self) -> Result<ServiceStatus, OperationError> {
        ServerClient::service_status(self).await
    }

    async fn config_fingerprints(&self) -> Result<Option<ConfigFingerprints>, OperationError> {
        ServerClient::config_fingerprints(self).await
    }
}
