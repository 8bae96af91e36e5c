//! HTTP client implementation

use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;
use url::Url;

use crate::http::endpoint::ServiceEndpoint;
use crate::http::transport::{new_client, TransportOptions};
use crate::models::outcome::OperationError;

/// Client for the plug-in service and the config service of one server.
///
/// Every call builds its own connection and releases it when the call
/// returns, whatever the outcome.
#[derive(Debug, Clone)]
pub struct ServerClient {
    plugin_service: ServiceEndpoint,
    config_service: ServiceEndpoint,
    transport: TransportOptions,
}

impl ServerClient {
    /// Create a new server client
    pub fn new(
        plugin_service: ServiceEndpoint,
        config_service: ServiceEndpoint,
        transport: TransportOptions,
    ) -> Self {
        Self {
            plugin_service,
            config_service,
            transport,
        }
    }

    /// Plug-in service (bundle lifecycle)
    pub fn plugin_service(&self) -> &ServiceEndpoint {
        &self.plugin_service
    }

    /// Config service (control center)
    pub fn config_service(&self) -> &ServiceEndpoint {
        &self.config_service
    }

    /// Send an authenticated request built by `build`
    pub(crate) async fn send<F>(
        &self,
        endpoint: &ServiceEndpoint,
        url: Url,
        build: F,
    ) -> Result<Response, OperationError>
    where
        F: FnOnce(&Client, Url) -> RequestBuilder,
    {
        let client = new_client(&self.transport)?;
        let request = endpoint.authorize(build(&client, url));

        let response = request.send().await?;
        debug!("Returned response code: {}", response.status().as_u16());
        Ok(response)
    }
}
