//! Plug-in service API client

use reqwest::{header, Body};
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

use crate::http::client::ServerClient;
use crate::models::bundle::BundleFile;
use crate::models::outcome::{OperationError, OperationOutcome};

/// Classify the status code of a plug-in upload
pub fn classify_upload(status: u16) -> OperationOutcome {
    match status {
        201 | 204 => {
            debug!("HTTP {}. Successfully updated plug-in in VMware Orchestrator.", status);
            Ok(())
        }
        401 => {
            warn!("HTTP 401. Authentication is required to upload a plug-in.");
            Err(OperationError::rejected(status))
        }
        403 => {
            warn!("HTTP 403. The provided user is not authorized to upload a plug-in.");
            Err(OperationError::rejected(status))
        }
        404 => {
            warn!(
                "HTTP 404. The requested resource was not found. Make sure the VMware Orchestrator URL is correct and reachable from this machine."
            );
            Err(OperationError::rejected(status))
        }
        409 => {
            warn!(
                "HTTP 409. The provided plug-in already exists and the overwrite flag was not set. The plug-in will not be changed in VMware Orchestrator."
            );
            Err(OperationError::rejected(status))
        }
        _ => {
            warn!(
                "Unknown status code HTTP {} returned from VMware Orchestrator. Please verify if the plug-in has been updated.",
                status
            );
            Err(OperationError::unknown(status))
        }
    }
}

impl ServerClient {
    /// Upload a plug-in bundle as a multipart form
    pub async fn upload_bundle(&self, bundle: &BundleFile, overwrite: bool) -> OperationOutcome {
        info!("Starting plug-in '{}' upload...", bundle.path().display());

        let (content, length) = bundle
            .file()
            .open_read()
            .await
            .map_err(|e| OperationError::Transport(format!("unable to read plug-in file: {}", e)))?;

        // Streamed from disk; the known length keeps the request non-chunked
        let file_part = Part::stream_with_length(Body::from(content), length)
            .file_name(bundle.file().name())
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .part("file", file_part)
            .text("format", bundle.format().extension())
            .text("overwrite", overwrite.to_string());

        let endpoint = self.plugin_service();
        let url = endpoint.url(&["vco", "api", "plugins"]);
        debug!("POST {}", url);

        let response = self
            .send(endpoint, url, |client, url| {
                client.post(url).header(header::ACCEPT, "*/*").multipart(form)
            })
            .await?;

        classify_upload(response.status().as_u16())
    }
}
