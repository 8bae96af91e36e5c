//! Service status and configuration fingerprint snapshots

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Orchestrator service status as reported by the control center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceStatus {
    Running,
    Stopped,
    /// The control center reports no status while the service restarts
    Restarting,
    /// Auth failure, missing resource or an unrecognized payload
    Undefined,
}

impl ServiceStatus {
    /// Interpret the `currentStatus` field of a status response
    pub fn from_current_status(current_status: Option<&str>) -> Self {
        match current_status {
            None => ServiceStatus::Restarting,
            Some(s) if s.eq_ignore_ascii_case("RUNNING") => ServiceStatus::Running,
            Some(s) if s.eq_ignore_ascii_case("STOPPED") => ServiceStatus::Stopped,
            Some(_) => ServiceStatus::Undefined,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ServiceStatus::Running => "RUNNING",
            ServiceStatus::Stopped => "STOPPED",
            ServiceStatus::Restarting => "RESTARTING",
            ServiceStatus::Undefined => "UNDEFINED",
        };
        f.write_str(text)
    }
}

/// Status response body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Outer `None` when the key is absent, inner `None` when it is `null`
    #[serde(default, deserialize_with = "present")]
    pub current_status: Option<Option<String>>,
}

impl StatusResponse {
    /// A body without `currentStatus` is not a status reading
    pub fn service_status(&self) -> ServiceStatus {
        match &self.current_status {
            Some(current_status) => ServiceStatus::from_current_status(current_status.as_deref()),
            None => ServiceStatus::Undefined,
        }
    }
}

// Only called when the key is present, so `null` becomes `Some(None)`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Active and pending configuration fingerprints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFingerprints {
    pub active: String,
    pub pending: String,
}

impl ConfigFingerprints {
    /// Pending changes are applied once both tokens match, ignoring case
    pub fn is_converged(&self) -> bool {
        self.active.eq_ignore_ascii_case(&self.pending)
    }
}

/// Config-version response body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigVersionResponse {
    #[serde(default)]
    pub active_configuration_fingerprint: Option<String>,
    #[serde(default)]
    pub pending_configuration_fingerprint: Option<String>,
}

impl ConfigVersionResponse {
    /// Both fingerprints, or `None` when either one is missing
    pub fn into_fingerprints(self) -> Option<ConfigFingerprints> {
        Some(ConfigFingerprints {
            active: self.active_configuration_fingerprint?,
            pending: self.pending_configuration_fingerprint?,
        })
    }
}
