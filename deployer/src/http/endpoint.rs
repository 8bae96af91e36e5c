//! Service endpoints and their credentials

use std::fmt;

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::errors::DeployError;

/// Basic-auth credential pair
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// One independently authenticated REST service on the server
#[derive(Debug, Clone)]
pub struct ServiceEndpoint {
    base: Url,
    credentials: Option<Credentials>,
}

impl ServiceEndpoint {
    /// Endpoint at an explicit base URL
    pub fn new(base: Url, credentials: Option<Credentials>) -> Self {
        Self { base, credentials }
    }

    /// `https://<host>:<port>`; IPv6 literals are bracketed
    pub fn https(host: &str, port: u16, credentials: Option<Credentials>) -> Result<Self, DeployError> {
        let authority = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, port)
        } else {
            format!("{}:{}", host, port)
        };
        let base = Url::parse(&format!("https://{}", authority)).map_err(|e| {
            DeployError::ConfigError(format!("Invalid server address '{}:{}': {}", host, port, e))
        })?;
        Ok(Self::new(base, credentials))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Absolute URL for a path made of the given segments.
    /// Segments are percent-encoded, dots are kept as-is.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.clear().extend(segments);
        }
        url
    }

    /// Attach basic-auth credentials when configured
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(creds) => request.basic_auth(&creds.username, Some(creds.password.expose_secret())),
            None => request,
        }
    }
}
