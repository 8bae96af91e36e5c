//! Effective deployment configuration

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::app::options::DeployOptions;
use crate::errors::DeployError;
use crate::http::client::ServerClient;
use crate::http::endpoint::{Credentials, ServiceEndpoint};
use crate::http::transport::TransportOptions;
use crate::models::bundle::BundleFormat;

pub const DEFAULT_SERVER: &str = "localhost";
pub const DEFAULT_PLUGIN_SERVICE_PORT: u16 = 8281;
pub const DEFAULT_CONFIG_SERVICE_PORT: u16 = 8283;
pub const DEFAULT_PLUGIN_SERVICE_USER: &str = "vcoadmin";
pub const DEFAULT_PLUGIN_SERVICE_PASSWORD: &str = "vcoadmin";
pub const DEFAULT_CONFIG_SERVICE_USER: &str = "root";
pub const DEFAULT_PLUGIN_PATH: &str = "target";

/// Port in 1..=65535, anything else (or nothing) resets to `default`
pub fn resolve_port(value: Option<i64>, default: u16) -> u16 {
    match value {
        Some(port) if (1..=65535).contains(&port) => port as u16,
        _ => default,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Validated configuration of one deployment run
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    pub server: String,
    pub plugin_service_port: u16,
    pub config_service_port: u16,
    pub plugin_service_credentials: Credentials,

    /// Required when a restart is requested
    pub config_service_credentials: Option<Credentials>,

    pub plugin_path: PathBuf,
    pub plugin_file: String,
    pub plugin_type: BundleFormat,

    pub overwrite: bool,
    pub restart: bool,
    pub delete_package: bool,

    /// Required when `delete_package` is set
    pub package_name: Option<String>,

    /// Only honored together with `restart`
    pub wait_for_pending_changes: bool,

    pub transport: TransportOptions,
}

impl DeploymentConfig {
    /// Apply defaults to raw options and validate the result
    pub fn from_options(options: DeployOptions) -> Result<Self, DeployError> {
        let restart = options.restart.unwrap_or(false);

        let config_service_user = non_empty(options.config_service_user)
            .unwrap_or_else(|| DEFAULT_CONFIG_SERVICE_USER.to_string());
        let config_service_credentials = non_empty(options.config_service_password)
            .map(|password| Credentials::new(config_service_user, password));

        let plugin_file = non_empty(options.plugin_file).ok_or_else(|| {
            DeployError::ConfigError("No 'plugin_file' was provided.".to_string())
        })?;

        let mut transport = TransportOptions::default();
        if let Some(insecure) = options.insecure_tls {
            transport.insecure_tls = insecure;
        }
        match options.request_timeout_secs {
            Some(0) => {
                return Err(DeployError::ConfigError(
                    "'request_timeout_secs' must be greater than zero.".to_string(),
                ))
            }
            Some(secs) => transport.timeout = Duration::from_secs(secs),
            None => {}
        }

        let config = Self {
            server: non_empty(options.server).unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            plugin_service_port: resolve_port(options.plugin_service_port, DEFAULT_PLUGIN_SERVICE_PORT),
            config_service_port: resolve_port(options.config_service_port, DEFAULT_CONFIG_SERVICE_PORT),
            plugin_service_credentials: Credentials::new(
                non_empty(options.plugin_service_user)
                    .unwrap_or_else(|| DEFAULT_PLUGIN_SERVICE_USER.to_string()),
                non_empty(options.plugin_service_password)
                    .unwrap_or_else(|| DEFAULT_PLUGIN_SERVICE_PASSWORD.to_string()),
            ),
            config_service_credentials,
            plugin_path: options
                .plugin_path
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PLUGIN_PATH)),
            plugin_file,
            plugin_type: options.plugin_type.unwrap_or_default(),
            overwrite: options.overwrite.unwrap_or(true),
            restart,
            delete_package: options.delete_package.unwrap_or(false),
            package_name: non_empty(options.package_name),
            // Waiting for pending changes only makes sense after a restart
            wait_for_pending_changes: restart && options.wait_for_pending_changes.unwrap_or(false),
            transport,
        };

        config.validate()?;
        debug!("Effective configuration: {:?}", config);
        Ok(config)
    }

    /// Check the cross-field rules
    pub fn validate(&self) -> Result<(), DeployError> {
        if self.server.is_empty() {
            return Err(DeployError::ConfigError("No 'server' was provided.".to_string()));
        }

        if self.restart && self.config_service_credentials.is_none() {
            return Err(DeployError::ConfigError(
                "'restart' was set to 'true' but no config service credentials \
                 ('config_service_user' and 'config_service_password') were provided."
                    .to_string(),
            ));
        }

        if self.delete_package && self.package_name.as_deref().unwrap_or_default().is_empty() {
            return Err(DeployError::ConfigError(
                "'delete_package' was set to 'true' but no 'package_name' was provided.".to_string(),
            ));
        }

        Ok(())
    }

    /// Convergence wait is skipped unless the service is restarted
    pub fn waits_for_convergence(&self) -> bool {
        self.restart && self.wait_for_pending_changes
    }

    /// HTTPS client for both services of the configured server
    pub fn server_client(&self) -> Result<ServerClient, DeployError> {
        Ok(ServerClient::new(
            ServiceEndpoint::https(
                &self.server,
                self.plugin_service_port,
                Some(self.plugin_service_credentials.clone()),
            )?,
            ServiceEndpoint::https(
                &self.server,
                self.config_service_port,
                self.config_service_credentials.clone(),
            )?,
            self.transport.clone(),
        ))
    }
}
