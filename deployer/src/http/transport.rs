//! HTTP client construction

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::models::outcome::OperationError;

/// Transport settings shared by every request
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Accept any server certificate chain and any hostname.
    ///
    /// Orchestrator appliances ship with self-signed certificates, so this
    /// defaults to `true`. It disables all server authentication.
    pub insecure_tls: bool,

    /// Per-request timeout, covering the bundle upload
    pub timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            insecure_tls: true,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Create a new HTTP client.
///
/// With rustls, accepting invalid certificates replaces the verifier
/// entirely, so hostname mismatches are accepted as well.
pub fn new_client(options: &TransportOptions) -> Result<Client, OperationError> {
    let mut builder = Client::builder().timeout(options.timeout);

    if options.insecure_tls {
        debug!("TLS certificate and hostname verification disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    Ok(builder.build()?)
}
