//! Control center (config service) API client

use reqwest::{header, Response};
use tracing::{debug, info, warn};

use crate::http::client::ServerClient;
use crate::models::outcome::{OperationError, OperationOutcome};
use crate::models::status::{ConfigFingerprints, ConfigVersionResponse, ServiceStatus, StatusResponse};

const SERVER_STATUS: [&str; 4] = ["vco-controlcenter", "api", "server", "status"];

/// Classify the status code of a restart request
pub fn classify_restart(status: u16) -> OperationOutcome {
    match status {
        200 | 201 => {
            debug!("Triggered Orchestrator service restart.");
            Ok(())
        }
        401 => {
            warn!("HTTP 401. Authentication is required to restart the Orchestrator service.");
            Err(OperationError::rejected(status))
        }
        403 => {
            warn!("HTTP 403. The provided user is not authorized to restart the Orchestrator service.");
            Err(OperationError::rejected(status))
        }
        404 => {
            warn!(
                "HTTP 404. The requested resource was not found. Make sure the VMware Orchestrator URL is correct and reachable from this machine."
            );
            Err(OperationError::rejected(status))
        }
        _ => {
            warn!(
                "Unknown status code HTTP {} returned from VMware Orchestrator. Please verify if the Orchestrator service has been restarted.",
                status
            );
            Err(OperationError::unknown(status))
        }
    }
}

/// Log why a non-200 read carries no data
fn warn_unreadable(status: u16, what: &str) {
    match status {
        401 => warn!("HTTP 401. Authentication is required to get the {}.", what),
        403 => warn!("HTTP 403. The provided user is not authorized to get the {}.", what),
        404 => warn!(
            "HTTP 404. The requested resource was not found. Make sure the VMware Orchestrator URL is correct and reachable from this machine."
        ),
        _ => warn!(
            "Unknown status code HTTP {} returned from VMware Orchestrator while reading the {}.",
            status, what
        ),
    }
}

impl ServerClient {
    /// Ask the control center to restart the Orchestrator service
    pub async fn trigger_restart(&self) -> OperationOutcome {
        info!("Restarting Orchestrator service...");

        let endpoint = self.config_service();
        let mut segments = SERVER_STATUS.to_vec();
        segments.push("restart");
        let url = endpoint.url(&segments);
        debug!("POST {}", url);

        let response = self
            .send(endpoint, url, |client, url| {
                client
                    .post(url)
                    .header(header::ACCEPT, "application/json")
                    .json(&serde_json::json!({}))
            })
            .await?;

        let status = response.status().as_u16();
        if matches!(status, 200 | 201) {
            // The body echoes the current status; it is informational only
            if let Ok(body) = response.json::<StatusResponse>().await {
                debug!("Orchestrator service status: {:?}", body.current_status);
            }
        }

        classify_restart(status)
    }

    /// Read the current Orchestrator service status.
    ///
    /// Only transport faults are errors; every definitive answer maps to a
    /// status, with `Undefined` for anything that is not a usable reading.
    pub async fn service_status(&self) -> Result<ServiceStatus, OperationError> {
        debug!("Getting Orchestrator service status...");

        let response = self.get_config_service(&SERVER_STATUS).await?;
        let status = response.status().as_u16();
        if status != 200 {
            warn_unreadable(status, "service status");
            return Ok(ServiceStatus::Undefined);
        }

        let body: StatusResponse = response.json().await?;
        debug!("Orchestrator service status: {:?}", body.current_status);
        Ok(body.service_status())
    }

    /// Read the active and pending configuration fingerprints.
    ///
    /// `Ok(None)` means the server answered without usable data.
    pub async fn config_fingerprints(&self) -> Result<Option<ConfigFingerprints>, OperationError> {
        debug!("Getting Orchestrator configuration fingerprint...");

        let response = self
            .get_config_service(&["vco-controlcenter", "api", "server", "config-version"])
            .await?;
        let status = response.status().as_u16();
        if status != 200 {
            warn_unreadable(status, "configuration fingerprint");
            return Ok(None);
        }

        let body: ConfigVersionResponse = response.json().await?;
        match body.into_fingerprints() {
            Some(fingerprints) => {
                debug!("Orchestrator active configuration fingerprint: '{}'", fingerprints.active);
                debug!("Orchestrator pending configuration fingerprint: '{}'", fingerprints.pending);
                Ok(Some(fingerprints))
            }
            None => {
                warn!("Error while reading configuration fingerprints. The server returned null fingerprints.");
                Ok(None)
            }
        }
    }

    async fn get_config_service(&self, segments: &[&str]) -> Result<Response, OperationError> {
        let endpoint = self.config_service();
        let url = endpoint.url(segments);
        debug!("GET {}", url);

        self.send(endpoint, url, |client, url| {
            client.get(url).header(header::ACCEPT, "application/json")
        })
        .await
    }
}
