//! Per-call outcome of a remote operation

use std::fmt;

use thiserror::Error;

/// Why the server definitively refused a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// HTTP 401
    Unauthenticated,
    /// HTTP 403
    Forbidden,
    /// HTTP 404
    NotFound,
    /// HTTP 409 on upload without the overwrite flag
    AlreadyExists,
    /// Any status code outside the endpoint's known table
    UnknownStatus,
}

impl RejectReason {
    /// Map a status code that has a well-known meaning to a reason.
    /// Endpoints decide which of these they treat as rejections.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => RejectReason::Unauthenticated,
            403 => RejectReason::Forbidden,
            404 => RejectReason::NotFound,
            409 => RejectReason::AlreadyExists,
            _ => RejectReason::UnknownStatus,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::Unauthenticated => "authentication is required",
            RejectReason::Forbidden => "the provided user is not authorized",
            RejectReason::NotFound => "the requested resource was not found",
            RejectReason::AlreadyExists => {
                "the plug-in already exists and the overwrite flag was not set"
            }
            RejectReason::UnknownStatus => "unknown status code",
        };
        f.write_str(text)
    }
}

/// A remote call that did not succeed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// The server answered with a definitive non-success status
    #[error("HTTP {status}: {reason}")]
    Rejected { status: u16, reason: RejectReason },

    /// The call could not complete (network, TLS or body fault)
    #[error("transport error: {0}")]
    Transport(String),
}

impl OperationError {
    pub fn rejected(status: u16) -> Self {
        OperationError::Rejected {
            status,
            reason: RejectReason::from_status(status),
        }
    }

    /// Rejection for a status code the endpoint does not know
    pub fn unknown(status: u16) -> Self {
        OperationError::Rejected {
            status,
            reason: RejectReason::UnknownStatus,
        }
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            OperationError::Rejected { reason, .. } => Some(*reason),
            OperationError::Transport(_) => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, OperationError::Transport(_))
    }
}

impl From<reqwest::Error> for OperationError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest keeps the useful detail (refused, TLS, decode) in the source chain
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        OperationError::Transport(message)
    }
}

/// Success, rejection or transport failure of a mutating call
pub type OperationOutcome = Result<(), OperationError>;
