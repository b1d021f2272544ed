//! ## Mock
//!
//! Contains mock for test units

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use remotefs::fs::{FileType, Metadata};
use remotefs::{File, RemoteError, RemoteErrorType, RemoteResult};

use crate::client::{Connector, ShareSession};
use crate::utils::name as name_utils;
use crate::ShareConfig;

// -- logger

pub fn logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// -- memory share

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<String, Vec<u8>>,
    /// connection attempts still to refuse
    refuse_connections: u32,
    connections: u32,
    /// every remote call fails with a transport error
    broken: bool,
    /// entries that survive removal
    sticky: Vec<String>,
    /// entries removed by someone else right before our removal
    vanishing: Vec<String>,
    case_sensitive: bool,
}

impl MemoryState {
    /// Key of the stored entry named `name`
    fn key(&self, name: &str) -> Option<String> {
        self.files
            .keys()
            .find(|k| name_utils::same_name(k.as_str(), name, self.case_sensitive))
            .cloned()
    }
}

/// In-memory share, cloned handles see the same files
#[derive(Debug, Clone, Default)]
pub struct MemoryShare {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryShare {
    /// Case sensitive share
    pub fn new() -> Self {
        let share = Self::default();
        share.state().case_sensitive = true;
        share
    }

    /// Share resolving names ignoring case, like most SMB servers
    pub fn case_insensitive() -> Self {
        Self::default()
    }

    /// Refuse the next `attempts` connections
    pub fn refuse_connections(&self, attempts: u32) {
        self.state().refuse_connections = attempts;
    }

    /// Make every remote call fail once connected
    pub fn break_transport(&self) {
        self.state().broken = true;
    }

    /// Keep `name` around even after it is removed
    pub fn make_sticky(&self, name: &str) {
        self.state().sticky.push(name.to_string());
    }

    /// Have `name` disappear when we are about to remove it
    pub fn make_vanishing(&self, name: &str) {
        self.state().vanishing.push(name.to_string());
    }

    pub fn put(&self, name: &str, data: &[u8]) {
        let _ = self.state().files.insert(name.to_string(), data.to_vec());
    }

    /// Content of the entry stored exactly as `name`
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.state().files.get(name).cloned()
    }

    /// Amount of connections attempted so far
    pub fn connections(&self) -> u32 {
        self.state().connections
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Connector for MemoryShare {
    type Session = MemorySession;

    fn connect(&self, _config: &ShareConfig, _timeout: Duration) -> RemoteResult<MemorySession> {
        let mut state = self.state();
        state.connections += 1;
        if state.refuse_connections > 0 {
            state.refuse_connections -= 1;
            return Err(RemoteError::new_ex(
                RemoteErrorType::ConnectionError,
                "connection timed out",
            ));
        }
        Ok(MemorySession {
            share: self.clone(),
        })
    }
}

pub struct MemorySession {
    share: MemoryShare,
}

impl MemorySession {
    fn state(&self) -> RemoteResult<MutexGuard<'_, MemoryState>> {
        let state = self.share.state();
        if state.broken {
            return Err(RemoteError::new_ex(
                RemoteErrorType::ProtocolError,
                "connection reset by peer",
            ));
        }
        Ok(state)
    }

    fn to_file(name: &str, data: &[u8]) -> File {
        File {
            path: PathBuf::from(format!("/{}", name)),
            metadata: Metadata::default()
                .file_type(FileType::File)
                .size(data.len() as u64),
        }
    }
}

impl ShareSession for MemorySession {
    fn case_sensitive(&self) -> bool {
        self.share.state().case_sensitive
    }

    fn list_root(&mut self) -> RemoteResult<Vec<File>> {
        Ok(self
            .state()?
            .files
            .iter()
            .map(|(name, data)| Self::to_file(name, data))
            .collect())
    }

    fn stat(&mut self, name: &str) -> RemoteResult<Option<File>> {
        let state = self.state()?;
        Ok(state
            .key(name)
            .and_then(|key| state.files.get(&key).map(|data| Self::to_file(&key, data))))
    }

    fn retrieve(&mut self, name: &str, dest: &mut dyn Write) -> RemoteResult<u64> {
        let state = self.state()?;
        let data = state
            .key(name)
            .and_then(|key| state.files.get(&key).cloned())
            .ok_or_else(|| RemoteError::new_ex(RemoteErrorType::CouldNotOpenFile, "no such file"))?;
        drop(state);
        dest.write_all(&data)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))?;
        Ok(data.len() as u64)
    }

    fn store(&mut self, name: &str, reader: &mut dyn Read) -> RemoteResult<u64> {
        let mut data = Vec::new();
        io::copy(reader, &mut data).map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))?;
        let size = data.len() as u64;
        let mut state = self.state()?;
        let key = state.key(name).unwrap_or_else(|| name.to_string());
        let _ = state.files.insert(key, data);
        Ok(size)
    }

    fn remove(&mut self, name: &str) -> RemoteResult<()> {
        let mut state = self.state()?;
        let key = state.key(name).ok_or_else(|| {
            RemoteError::new_ex(RemoteErrorType::CouldNotRemoveFile, "no such file")
        })?;
        if state.sticky.contains(&key) {
            return Ok(());
        }
        let _ = state.files.remove(&key);
        if state.vanishing.contains(&key) {
            return Err(RemoteError::new_ex(
                RemoteErrorType::CouldNotRemoveFile,
                "no such file",
            ));
        }
        Ok(())
    }
}
