//! # config
//!
//! Share client configuration

use std::path::{Path, PathBuf};

/// Default share name, exposed by the server for guest access
pub const DEFAULT_SHARE: &str = "guest";
/// NetBIOS session service port
pub const DEFAULT_PORT: u16 = 139;
/// Default local directory where fetched files are written to
pub const DEFAULT_LOCAL_DIR: &str = "../em63_share";
pub const DEFAULT_WORKGROUP: &str = "WORKGROUP";
pub const GUEST_USERNAME: &str = "guest";

/// Describes which share to reach and where to mirror files locally.
///
/// Defaults to guest credentials (`guest` with an empty password).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) share: String,
    pub(crate) local_dir: PathBuf,
    pub(crate) workgroup: String,
    pub(crate) username: String,
    pub(crate) password: String,
}

impl ShareConfig {
    pub fn new<S: AsRef<str>>(host: S) -> Self {
        Self {
            host: host.as_ref().to_string(),
            port: DEFAULT_PORT,
            share: DEFAULT_SHARE.to_string(),
            local_dir: PathBuf::from(DEFAULT_LOCAL_DIR),
            workgroup: DEFAULT_WORKGROUP.to_string(),
            username: GUEST_USERNAME.to_string(),
            password: String::new(),
        }
    }

    /// Construct ShareConfig with the provided share name
    pub fn share<S: AsRef<str>>(mut self, share: S) -> Self {
        self.share = share.as_ref().trim_matches('/').to_string();
        self
    }

    /// Construct ShareConfig with the provided port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Construct ShareConfig with the provided local directory
    pub fn local_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.local_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Construct ShareConfig with the provided workgroup
    pub fn workgroup<S: AsRef<str>>(mut self, workgroup: S) -> Self {
        self.workgroup = workgroup.as_ref().to_string();
        self
    }

    /// Construct ShareConfig with the provided username
    pub fn username<S: AsRef<str>>(mut self, username: S) -> Self {
        self.username = username.as_ref().to_string();
        self
    }

    /// Construct ShareConfig with the provided password
    pub fn password<S: AsRef<str>>(mut self, password: S) -> Self {
        self.password = password.as_ref().to_string();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn share_name(&self) -> &str {
        &self.share
    }

    pub fn port_number(&self) -> u16 {
        self.port
    }

    pub fn local_directory(&self) -> &Path {
        self.local_dir.as_path()
    }

    /// Returns the local path mirroring the remote `name`
    pub fn local_path(&self, name: &str) -> PathBuf {
        self.local_dir.join(name)
    }

    /// `smb://host:port` uri of the server
    pub(crate) fn server_uri(&self) -> String {
        format!("smb://{}:{}", self.host, self.port)
    }
}
