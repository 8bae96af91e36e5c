//! Package service API client

use reqwest::header;
use tracing::{debug, info, warn};

use crate::http::client::ServerClient;
use crate::models::outcome::{OperationError, OperationOutcome};

/// Keep elements shared with other packages when deleting a package
const DELETE_OPTION: &str = "deletePackageKeepingShared";

/// Classify the status code of a package deletion.
///
/// 404 counts as success: there is nothing to delete.
pub fn classify_delete(status: u16) -> OperationOutcome {
    match status {
        200 => {
            debug!("HTTP 200. Plug-in package deleted.");
            Ok(())
        }
        204 => {
            debug!("HTTP 204. No plug-in package found for deletion.");
            Ok(())
        }
        404 => {
            warn!("HTTP 404. The plug-in package was not found on the server. Skipping plug-in package deletion.");
            Ok(())
        }
        401 => {
            warn!("HTTP 401. Authentication is required to delete a plug-in package.");
            Err(OperationError::rejected(status))
        }
        403 => {
            warn!("HTTP 403. The provided user is not authorized to delete a plug-in package.");
            Err(OperationError::rejected(status))
        }
        _ => {
            warn!(
                "Unknown status code HTTP {} returned from VMware Orchestrator. Please verify if the plug-in package has been deleted.",
                status
            );
            Err(OperationError::unknown(status))
        }
    }
}

impl ServerClient {
    /// Delete a plug-in package with its content, keeping shared elements.
    ///
    /// `package_name` is sent with a trailing dot so the server only matches
    /// the package itself and not packages sharing its prefix.
    pub async fn delete_package(&self, package_name: &str) -> OperationOutcome {
        let package = format!("{}.", package_name);
        info!("Deleting plug-in package '{}'...", package);

        let endpoint = self.plugin_service();
        let mut url = endpoint.url(&["vco", "api", "packages", &package]);
        url.query_pairs_mut().append_pair("option", DELETE_OPTION);
        debug!("DELETE {}", url);

        let response = self
            .send(endpoint, url, |client, url| {
                client
                    .delete(url)
                    .header(header::ACCEPT, "application/json")
            })
            .await?;

        classify_delete(response.status().as_u16())
    }
}
