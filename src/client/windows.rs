//! # Windows client
//!
//! Windows implementation of the share session, addressing the share through UNC paths

use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use remotefs::fs::{FileType, Metadata};
use remotefs::{File, RemoteError, RemoteErrorType, RemoteResult};

use super::{Connector, ShareSession};
use crate::utils::name as name_utils;
use crate::ShareConfig;

/// Connects to SMB shares through the Windows redirector, using the current logon
#[derive(Debug, Clone, Default)]
pub struct SmbConnector {
    case_sensitive: bool,
}

impl SmbConnector {
    /// Accepted for parity with the UNIX connector; the redirector always resolves names ignoring case,
    /// so sessions keep comparing names ignoring case
    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = value;
        self
    }
}

impl Connector for SmbConnector {
    type Session = SmbSession;

    fn connect(&self, config: &ShareConfig, timeout: Duration) -> RemoteResult<SmbSession> {
        let addrs: Vec<SocketAddr> = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::BadAddress, e))?
            .collect();
        if !addrs
            .iter()
            .any(|addr| TcpStream::connect_timeout(addr, timeout).is_ok())
        {
            return Err(RemoteError::new_ex(
                RemoteErrorType::ConnectionError,
                format!("{}:{} is unreachable", config.host, config.port),
            ));
        }
        let root = PathBuf::from(format!("\\\\{}\\{}", config.host, config.share));
        trace!("checking share at {}", root.display());
        fs::read_dir(root.as_path())
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::ConnectionError, e))?;
        if self.case_sensitive {
            debug!("case sensitive names are not supported through UNC paths; ignoring case");
        }
        Ok(SmbSession { root })
    }
}

/// Session on a SMB share mounted through its UNC path
pub struct SmbSession {
    root: PathBuf,
}

impl SmbSession {
    fn get_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn to_file(path: PathBuf, meta: &fs::Metadata) -> File {
        let mut metadata = Metadata::default()
            .file_type(if meta.is_dir() {
                FileType::Directory
            } else {
                FileType::File
            })
            .size(meta.len());
        if let Ok(modified) = meta.modified() {
            metadata = metadata.modified(modified);
        }
        if let Ok(accessed) = meta.accessed() {
            metadata = metadata.accessed(accessed);
        }
        if let Ok(created) = meta.created() {
            metadata = metadata.created(created);
        }
        File { path, metadata }
    }
}

impl ShareSession for SmbSession {
    fn case_sensitive(&self) -> bool {
        false
    }

    fn list_root(&mut self) -> RemoteResult<Vec<File>> {
        trace!("listing files at {}", self.root.display());
        fs::read_dir(self.root.as_path())
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::StatFailed, e))?
            .map(|entry| {
                let entry = entry.map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))?;
                let meta = entry
                    .metadata()
                    .map_err(|e| RemoteError::new_ex(RemoteErrorType::StatFailed, e))?;
                Ok(Self::to_file(entry.path(), &meta))
            })
            .collect()
    }

    fn stat(&mut self, name: &str) -> RemoteResult<Option<File>> {
        trace!("get stat for {}", name);
        Ok(self
            .list_root()?
            .into_iter()
            .find(|f| name_utils::same_name(f.name().as_str(), name, false)))
    }

    fn retrieve(&mut self, name: &str, dest: &mut dyn Write) -> RemoteResult<u64> {
        let path = self.get_path(name);
        trace!("opening file at {} for read", path.display());
        let mut file = fs::File::open(path)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::CouldNotOpenFile, e))?;
        io::copy(&mut file, dest).map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))
    }

    fn store(&mut self, name: &str, reader: &mut dyn Read) -> RemoteResult<u64> {
        let path = self.get_path(name);
        trace!("creating file at {}", path.display());
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::CouldNotOpenFile, e))?;
        io::copy(reader, &mut file).map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))
    }

    fn remove(&mut self, name: &str) -> RemoteResult<()> {
        let path = self.get_path(name);
        trace!("removing file {}", path.display());
        fs::remove_file(path)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::CouldNotRemoveFile, e))
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn should_accept_case_sensitive_option() {
        assert!(SmbConnector::default().case_sensitive(true).case_sensitive);
        assert!(!SmbConnector::default().case_sensitive);
    }
}
