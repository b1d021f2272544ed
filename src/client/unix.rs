//! # UNIX client
//!
//! UNIX implementation of the share session, built on top of libsmbclient

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use pavao::{SmbClient, SmbCredentials, SmbOpenOptions, SmbOptions};
use remotefs::{File, RemoteError, RemoteErrorType, RemoteResult};

use super::{Connector, ShareSession};
use crate::utils::{name as name_utils, smb as smb_utils};
use crate::ShareConfig;

/// Connects to SMB shares through libsmbclient
#[derive(Debug, Clone, Default)]
pub struct SmbConnector {
    case_sensitive: bool,
}

impl SmbConnector {
    /// Construct SmbConnector treating remote names as case sensitive
    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = value;
        self
    }

    fn options(&self) -> SmbOptions {
        SmbOptions::default()
            .case_sensitive(self.case_sensitive)
            .one_share_per_server(true)
    }

    /// Make sure the server accepts TCP connections within `timeout`
    fn probe(config: &ShareConfig, timeout: Duration) -> RemoteResult<()> {
        let addrs: Vec<SocketAddr> = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::BadAddress, e))?
            .collect();
        let mut last_err = io::Error::new(io::ErrorKind::NotFound, "host resolved to no address");
        for addr in addrs {
            trace!("probing {} (timeout {:?})", addr, timeout);
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(_) => return Ok(()),
                Err(e) => last_err = e,
            }
        }
        Err(RemoteError::new_ex(
            RemoteErrorType::ConnectionError,
            last_err,
        ))
    }
}

impl Connector for SmbConnector {
    type Session = SmbSession;

    fn connect(&self, config: &ShareConfig, timeout: Duration) -> RemoteResult<SmbSession> {
        Self::probe(config, timeout)?;
        let credentials = SmbCredentials::default()
            .server(config.server_uri())
            .share(format!("/{}", config.share))
            .username(config.username.as_str())
            .password(config.password.as_str())
            .workgroup(config.workgroup.as_str());
        let client = SmbClient::new(credentials, self.options())
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::BadAddress, e))?;
        let mut session = SmbSession {
            client,
            case_sensitive: self.case_sensitive,
        };
        session.check_connection()?;
        Ok(session)
    }
}

/// Session on a SMB share; the smb context is freed on drop
pub struct SmbSession {
    client: SmbClient,
    case_sensitive: bool,
}

impl SmbSession {
    fn check_connection(&mut self) -> RemoteResult<()> {
        trace!("checking connection...");
        match self.client.get_user() {
            Err(e) => {
                error!("connection ERROR: {}", e);
                Err(RemoteError::new_ex(RemoteErrorType::ConnectionError, e))
            }
            Ok(_) => {
                trace!("connection OK");
                Ok(())
            }
        }
    }

    fn get_uri(name: &str) -> String {
        format!("/{}", name)
    }
}

impl ShareSession for SmbSession {
    fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn list_root(&mut self) -> RemoteResult<Vec<File>> {
        trace!("listing files at share root");
        let dirents = self
            .client
            .list_dir("/")
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::StatFailed, e))?;
        dirents
            .into_iter()
            .filter(|d| smb_utils::is_listable(d.get_type(), d.name()))
            .map(|d| {
                let uri = Self::get_uri(d.name());
                self.client
                    .stat(uri.as_str())
                    .map(|stat| smb_utils::smbstat_to_file(uri.as_str(), stat))
                    .map_err(|e| RemoteError::new_ex(RemoteErrorType::StatFailed, e))
            })
            .collect()
    }

    fn stat(&mut self, name: &str) -> RemoteResult<Option<File>> {
        // a failed stat can't tell "no such file" apart from a broken transport,
        // so look the name up in the listing first
        let case_sensitive = self.case_sensitive;
        let listed = self
            .client
            .list_dir("/")
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::StatFailed, e))?
            .into_iter()
            .find(|d| {
                smb_utils::is_listable(d.get_type(), d.name())
                    && name_utils::same_name(d.name(), name, case_sensitive)
            });
        let Some(listed) = listed else {
            trace!("{} is not in the share root", name);
            return Ok(None);
        };
        let uri = Self::get_uri(listed.name());
        trace!("get stat for {}", uri);
        self.client
            .stat(uri.as_str())
            .map(|stat| Some(smb_utils::smbstat_to_file(uri.as_str(), stat)))
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::StatFailed, e))
    }

    fn retrieve(&mut self, name: &str, dest: &mut dyn Write) -> RemoteResult<u64> {
        let uri = Self::get_uri(name);
        trace!("opening file at {} for read", uri);
        let mut file = self
            .client
            .open_with(uri, SmbOpenOptions::default().read(true))
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::CouldNotOpenFile, e))?;
        io::copy(&mut file, dest).map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))
    }

    fn store(&mut self, name: &str, reader: &mut dyn Read) -> RemoteResult<u64> {
        let uri = Self::get_uri(name);
        trace!("creating file at {}", uri);
        let mut file = self
            .client
            .open_with(
                uri,
                SmbOpenOptions::default()
                    .create(true)
                    .truncate(true)
                    .write(true)
                    .mode(0o644),
            )
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::CouldNotOpenFile, e))?;
        io::copy(reader, &mut file).map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))
    }

    fn remove(&mut self, name: &str) -> RemoteResult<()> {
        let uri = Self::get_uri(name);
        trace!("removing file {}", uri);
        self.client
            .unlink(uri)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::CouldNotRemoveFile, e))
    }
}

#[cfg(test)]
#[cfg(feature = "with-containers")]
mod test {

    use std::fs;
    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use tempfile::TempDir;

    use super::*;
    use crate::{DeleteOutcome, RetryPolicy, ShareClient, StoreOutcome};

    #[test]
    #[serial]
    fn should_store_and_retrieve_file() {
        crate::mock::logger();
        let mut session = init_session();
        let mut reader = Cursor::new("test data\n".as_bytes());
        assert_eq!(session.store("a.txt", &mut reader).unwrap(), 10);
        let mut buffer = Vec::new();
        assert_eq!(session.retrieve("a.txt", &mut buffer).unwrap(), 10);
        assert_eq!(buffer.as_slice(), b"test data\n");
        assert!(session.remove("a.txt").is_ok());
    }

    #[test]
    #[serial]
    fn should_stat_file() {
        crate::mock::logger();
        let mut session = init_session();
        let mut reader = Cursor::new("echo 5\n".as_bytes());
        assert!(session.store("a.sh", &mut reader).is_ok());
        let entry = session.stat("a.sh").unwrap().unwrap();
        assert_eq!(entry.name(), "a.sh");
        assert_eq!(entry.metadata().size, 7);
        assert!(session.stat("b.sh").unwrap().is_none());
        assert!(session
            .list_root()
            .unwrap()
            .iter()
            .any(|f| f.name() == "a.sh"));
        assert!(session.remove("a.sh").is_ok());
    }

    #[test]
    #[serial]
    fn should_not_retrieve_missing_file() {
        crate::mock::logger();
        let mut session = init_session();
        let mut buffer = Vec::new();
        assert!(session.retrieve("aashafbhhh", &mut buffer).is_err());
        assert!(session.remove("aashafbhhh").is_err());
    }

    #[test]
    #[serial]
    fn should_not_connect_to_closed_port() {
        crate::mock::logger();
        let config = ShareConfig::new("127.0.0.1").port(1);
        assert_eq!(
            SmbConnector::default()
                .connect(&config, Duration::from_secs(1))
                .err()
                .unwrap()
                .kind,
            RemoteErrorType::ConnectionError
        );
    }

    #[test]
    #[serial]
    fn should_truncate_existing_file_on_store() {
        crate::mock::logger();
        let mut session = init_session();
        let mut reader = Cursor::new("a much longer content\n".as_bytes());
        assert!(session.store("a.txt", &mut reader).is_ok());
        let mut reader = Cursor::new("short\n".as_bytes());
        assert_eq!(session.store("a.txt", &mut reader).unwrap(), 6);
        let mut buffer = Vec::new();
        assert_eq!(session.retrieve("a.txt", &mut buffer).unwrap(), 6);
        assert_eq!(buffer.as_slice(), b"short\n");
        assert!(session.remove("a.txt").is_ok());
    }

    #[test]
    #[serial]
    fn should_stat_file_ignoring_case() {
        crate::mock::logger();
        let mut session = init_session();
        assert_eq!(session.case_sensitive(), false);
        let mut reader = Cursor::new("test data\n".as_bytes());
        assert!(session.store("a.txt", &mut reader).is_ok());
        let entry = session.stat("A.TXT").unwrap().unwrap();
        assert_eq!(entry.name(), "a.txt");
        assert!(session.remove("a.txt").is_ok());
    }

    #[test]
    #[serial]
    fn should_not_overwrite_file_named_with_different_case() {
        crate::mock::logger();
        let dir = TempDir::new().unwrap();
        let client = ShareClient::new(config().local_dir(dir.path()), SmbConnector::default())
            .retry_policy(RetryPolicy::default().max_attempts(1));
        assert!(client.write_text("a.txt", "original content\n").is_ok());
        let local = dir.path().join("upper.txt");
        assert!(fs::write(local.as_path(), "new\n").is_ok());
        assert_eq!(
            client.store("A.TXT", local.as_path(), false).unwrap(),
            StoreOutcome::Skipped
        );
        assert_eq!(
            client.fetch_text("a.txt").unwrap().as_str(),
            "original content\n"
        );
        assert_eq!(client.exists("A.TXT").unwrap(), true);
        assert_eq!(client.delete("A.TXT").unwrap(), DeleteOutcome::Deleted(1));
        assert_eq!(client.exists("a.txt").unwrap(), false);
    }

    fn config() -> ShareConfig {
        ShareConfig::new("localhost")
            .port(3445)
            .share("temp")
            .username("test")
            .password("test")
            .workgroup("pavao")
    }

    fn init_session() -> SmbSession {
        SmbConnector::default()
            .connect(&config(), Duration::from_secs(10))
            .unwrap()
    }
}
