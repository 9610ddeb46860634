use std::{path::PathBuf, time::Duration};

use strum::Display;
use thiserror::Error;

use crate::{client::ClientError, serializer::Format};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to {op}: connection error: {message}")]
    Connection { op: String, message: String },
    #[error("failed to {op}: {kind} {name} not found")]
    NotFound {
        op: String,
        kind: &'static str,
        name: String,
    },
    #[error("failed to {op}: {message} (status {status})")]
    Api {
        op: String,
        status: u16,
        message: String,
    },
    #[error("{kind} {name} is not ready: {ready} ready replicas")]
    NotReady {
        kind: &'static str,
        name: String,
        ready: u32,
    },
    #[error("timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },
    #[error("{op}: {reason}")]
    Cancelled { op: String, reason: CancelReason },
    #[error("cannot decode {field} of {kind} {name}: {message}")]
    Transform {
        kind: String,
        name: String,
        field: &'static str,
        message: String,
    },
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to {op} snapshot as {format}: {message}")]
    Encode {
        op: &'static str,
        format: Format,
        message: String,
    },
    #[error("import rejected by {url}: {message}")]
    RemoteRejection {
        url: String,
        status: Option<u16>,
        message: String,
    },
}

/// Why a caller supplied context stopped an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CancelReason {
    #[strum(serialize = "context cancelled")]
    Cancelled,
    #[strum(serialize = "context deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    /// Attaches the failed operation to a control plane error.
    pub fn from_client(op: &str, err: ClientError) -> Self {
        match err {
            ClientError::NotFound { kind, name } => Error::NotFound {
                op: op.to_owned(),
                kind,
                name,
            },
            ClientError::Connection(message) => Error::Connection {
                op: op.to_owned(),
                message,
            },
            ClientError::Api { status, message } => Error::Api {
                op: op.to_owned(),
                status,
                message,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. })
    }
}
