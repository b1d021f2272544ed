//! # error
//!
//! Share client errors

use std::io;
use std::path::PathBuf;

use remotefs::RemoteError;
use thiserror::Error;

pub type ShareResult<T> = Result<T, ShareError>;

/// Errors returned by [`crate::ShareClient`]
#[derive(Debug, Error)]
pub enum ShareError {
    /// Every connection attempt allowed by the retry policy failed
    #[error("could not connect to {host}:{port} after {attempts} attempt(s): {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        attempts: u32,
        #[source]
        source: RemoteError,
    },
    /// Connection was cancelled through the [`crate::CancelToken`]
    #[error("connection cancelled")]
    Cancelled,
    #[error("no such file in share: {0}")]
    NotFound(String),
    /// Remote file kept existing after deleting it for overwrite
    #[error("{name} still exists after {attempts} overwrite attempt(s)")]
    ConflictPersisted { name: String, attempts: u32 },
    #[error("invalid remote file name: {0:?}")]
    InvalidName(String),
    /// Transport or protocol failure reported by the share
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
    #[error("local I/O error on {}: {source}", path.display())]
    Local {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not valid UTF-8", .0.display())]
    NotUtf8(PathBuf),
}

impl ShareError {
    pub(crate) fn local<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::Local {
            path: path.into(),
            source,
        }
    }

    /// Whether the error is a transport failure (connection or remote call)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Remote(_))
    }
}
