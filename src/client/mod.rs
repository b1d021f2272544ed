//! # client
//!
//! Connections to the share

use std::io::{Read, Write};
use std::time::Duration;

use remotefs::{File, RemoteResult};

use crate::ShareConfig;

// -- unix client

#[cfg(target_family = "unix")]
mod unix;
#[cfg(target_family = "unix")]
pub use unix::*;

// -- windows client

#[cfg(target_family = "windows")]
mod windows;
#[cfg(target_family = "windows")]
pub use windows::*;

/// Opens sessions on a share.
///
/// A connector is asked for a brand new session on every operation.
pub trait Connector {
    type Session: ShareSession;

    /// Open a session on the share described by `config`, giving up on this attempt after `timeout`
    fn connect(&self, config: &ShareConfig, timeout: Duration) -> RemoteResult<Self::Session>;
}

/// An open session on the root of a share.
///
/// Names are plain entry names of the share root, compared following [`ShareSession::case_sensitive`].
/// The session is released when dropped.
pub trait ShareSession {
    /// Whether entry names differing only in case are distinct entries
    fn case_sensitive(&self) -> bool;

    /// List files and directories in the share root
    fn list_root(&mut self) -> RemoteResult<Vec<File>>;

    /// Get the entry named `name`, if any. The returned file carries the name as stored in the share
    fn stat(&mut self, name: &str) -> RemoteResult<Option<File>>;

    /// Download `name` into `dest`, returning the amount of bytes read
    fn retrieve(&mut self, name: &str, dest: &mut dyn Write) -> RemoteResult<u64>;

    /// Create `name`, or truncate it if it exists, with data from `reader`. Returns the amount of bytes written
    fn store(&mut self, name: &str, reader: &mut dyn Read) -> RemoteResult<u64>;

    fn remove(&mut self, name: &str) -> RemoteResult<()>;
}
