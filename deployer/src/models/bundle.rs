//! Plug-in bundle models

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::DeployError;
use crate::filesys::file::File;

/// Orchestrator plug-in bundle format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BundleFormat {
    #[default]
    #[serde(rename = "DAR")]
    Dar,
    #[serde(rename = "VMOAPP")]
    Vmoapp,
}

impl BundleFormat {
    /// Lower-case tag, used as file extension and `format` form field
    pub fn extension(&self) -> &'static str {
        match self {
            BundleFormat::Dar => "dar",
            BundleFormat::Vmoapp => "vmoapp",
        }
    }
}

impl fmt::Display for BundleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleFormat::Dar => f.write_str("DAR"),
            BundleFormat::Vmoapp => f.write_str("VMOAPP"),
        }
    }
}

// The tag is case-sensitive
impl FromStr for BundleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DAR" => Ok(BundleFormat::Dar),
            "VMOAPP" => Ok(BundleFormat::Vmoapp),
            _ => Err(format!("Invalid plug-in type: {} (expected DAR or VMOAPP)", s)),
        }
    }
}

/// The bundle to upload, resolved to an absolute path that exists on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    file: File,
    format: BundleFormat,
}

impl BundleFile {
    /// Locate `<dir>/<name>.<extension>` and make sure it exists
    pub async fn locate(dir: &Path, name: &str, format: BundleFormat) -> Result<Self, DeployError> {
        let path = dir.join(format!("{}.{}", name, format.extension()));
        Self::open(File::new(path), format).await
    }

    /// Use an explicit bundle path
    pub async fn open(file: File, format: BundleFormat) -> Result<Self, DeployError> {
        let file = file.absolute()?;
        debug!("Resolved plug-in file: '{}'", file.path().display());

        if !file.exists().await {
            return Err(DeployError::BundleNotFound(file.path().to_path_buf()));
        }

        Ok(Self { file, format })
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn format(&self) -> BundleFormat {
        self.format
    }
}
