//! Inbound deployment options
//!
//! The same set of options is read from an optional JSON settings file and
//! from command-line flags/environment variables. Every field is optional so
//! the two sources can be overlaid; defaults and validation are applied when
//! the options become a [`DeploymentConfig`](crate::app::config::DeploymentConfig).

use std::path::PathBuf;

use clap::Args;
use serde::Deserialize;

use crate::errors::DeployError;
use crate::filesys::file::File;
use crate::logs::LogLevel;
use crate::models::bundle::BundleFormat;

/// Raw deployment options
#[derive(Args, Deserialize, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct DeployOptions {
    /// Orchestrator server hostname or IP address
    #[arg(long, env = "VCO_DEPLOY_SERVER")]
    pub server: Option<String>,

    /// Plug-in service REST API port, usually 8281
    #[arg(long, env = "VCO_DEPLOY_PLUGIN_SERVICE_PORT", allow_negative_numbers = true)]
    pub plugin_service_port: Option<i64>,

    /// Config service REST API port, usually 8283
    #[arg(long, env = "VCO_DEPLOY_CONFIG_SERVICE_PORT", allow_negative_numbers = true)]
    pub config_service_port: Option<i64>,

    /// User allowed to import plug-ins
    #[arg(long, env = "VCO_DEPLOY_PLUGIN_SERVICE_USER")]
    pub plugin_service_user: Option<String>,

    /// Password of the plug-in service user
    #[arg(long, env = "VCO_DEPLOY_PLUGIN_SERVICE_PASSWORD", hide_env_values = true)]
    pub plugin_service_password: Option<String>,

    /// User allowed to restart the Orchestrator service
    #[arg(long, env = "VCO_DEPLOY_CONFIG_SERVICE_USER")]
    pub config_service_user: Option<String>,

    /// Password of the config service user
    #[arg(long, env = "VCO_DEPLOY_CONFIG_SERVICE_PASSWORD", hide_env_values = true)]
    pub config_service_password: Option<String>,

    /// Directory holding the plug-in file
    #[arg(long, env = "VCO_DEPLOY_PLUGIN_PATH")]
    pub plugin_path: Option<PathBuf>,

    /// Plug-in file name without extension
    #[arg(long, env = "VCO_DEPLOY_PLUGIN_FILE")]
    pub plugin_file: Option<String>,

    /// Plug-in bundle format, DAR or VMOAPP (case-sensitive)
    #[arg(long, env = "VCO_DEPLOY_PLUGIN_TYPE")]
    pub plugin_type: Option<BundleFormat>,

    /// Force Orchestrator to reinstall an existing plug-in
    #[arg(long, env = "VCO_DEPLOY_OVERWRITE", num_args = 0..=1, default_missing_value = "true")]
    pub overwrite: Option<bool>,

    /// Restart the Orchestrator service after the upload
    #[arg(long, env = "VCO_DEPLOY_RESTART", num_args = 0..=1, default_missing_value = "true")]
    pub restart: Option<bool>,

    /// Delete the plug-in package before the upload
    #[arg(long, env = "VCO_DEPLOY_DELETE_PACKAGE", num_args = 0..=1, default_missing_value = "true")]
    pub delete_package: Option<bool>,

    /// Package name to delete, as in the `pkg-name` attribute of dunes-meta-inf.xml
    #[arg(long, env = "VCO_DEPLOY_PACKAGE_NAME")]
    pub package_name: Option<String>,

    /// Wait for pending configuration changes after the restart
    #[arg(
        long,
        env = "VCO_DEPLOY_WAIT_FOR_PENDING_CHANGES",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub wait_for_pending_changes: Option<bool>,

    /// Accept self-signed certificates and mismatching hostnames
    #[arg(long, env = "VCO_DEPLOY_INSECURE_TLS", num_args = 0..=1, default_missing_value = "true")]
    pub insecure_tls: Option<bool>,

    /// Per-request timeout in seconds
    #[arg(long, env = "VCO_DEPLOY_REQUEST_TIMEOUT")]
    pub request_timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "VCO_DEPLOY_LOG_LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Emit logs as JSON
    #[arg(long, env = "VCO_DEPLOY_LOG_JSON", num_args = 0..=1, default_missing_value = "true")]
    pub log_json: Option<bool>,
}

impl DeployOptions {
    /// Read options from a JSON settings file
    pub async fn from_file(file: &File) -> Result<Self, DeployError> {
        file.read_json().await.map_err(|e| {
            DeployError::ConfigError(format!(
                "Unable to read settings file '{}': {}",
                file.path().display(),
                e
            ))
        })
    }

    /// Values set in `over` replace the values in `self`
    pub fn overlay(self, over: DeployOptions) -> DeployOptions {
        DeployOptions {
            server: over.server.or(self.server),
            plugin_service_port: over.plugin_service_port.or(self.plugin_service_port),
            config_service_port: over.config_service_port.or(self.config_service_port),
            plugin_service_user: over.plugin_service_user.or(self.plugin_service_user),
            plugin_service_password: over.plugin_service_password.or(self.plugin_service_password),
            config_service_user: over.config_service_user.or(self.config_service_user),
            config_service_password: over.config_service_password.or(self.config_service_password),
            plugin_path: over.plugin_path.or(self.plugin_path),
            plugin_file: over.plugin_file.or(self.plugin_file),
            plugin_type: over.plugin_type.or(self.plugin_type),
            overwrite: over.overwrite.or(self.overwrite),
            restart: over.restart.or(self.restart),
            delete_package: over.delete_package.or(self.delete_package),
            package_name: over.package_name.or(self.package_name),
            wait_for_pending_changes: over.wait_for_pending_changes.or(self.wait_for_pending_changes),
            insecure_tls: over.insecure_tls.or(self.insecure_tls),
            request_timeout_secs: over.request_timeout_secs.or(self.request_timeout_secs),
            log_level: over.log_level.or(self.log_level),
            log_json: over.log_json.or(self.log_json),
        }
    }
}
