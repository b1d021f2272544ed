//! # share
//!
//! Share client: one connection per operation on the root of a share

use std::fs;
use std::path::{Path, PathBuf};

use remotefs::File;

use crate::client::{Connector, ShareSession};
use crate::retry::{self, RetryError};
use crate::utils::{fmt as fmt_utils, name as name_utils};
use crate::{CancelToken, RetryPolicy, ShareConfig, ShareError, ShareResult, SmbConnector};

/// Default amount of delete-and-store rounds before giving up on an overwrite
pub const DEFAULT_MAX_OVERWRITE_ATTEMPTS: u32 = 3;

/// What [`ShareClient::fetch`] should return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    /// Path of the downloaded local file
    Path,
    /// Text content of the downloaded file
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Path(PathBuf),
    Content(String),
}

impl Fetched {
    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Self::Path(p) => Some(p),
            Self::Content(_) => None,
        }
    }

    pub fn into_content(self) -> Option<String> {
        match self {
            Self::Content(c) => Some(c),
            Self::Path(_) => None,
        }
    }
}

/// Result of [`ShareClient::store`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// File uploaded, with the amount of bytes written
    Stored(u64),
    /// Remote file already existed and overwrite was disabled; nothing has been written
    Skipped,
}

impl StoreOutcome {
    pub fn bytes(&self) -> u64 {
        match self {
            Self::Stored(bytes) => *bytes,
            Self::Skipped => 0,
        }
    }
}

/// Result of [`ShareClient::delete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Amount of files removed
    Deleted(usize),
    NotFound,
}

/// Client for the root of a SMB share.
///
/// Holds no connection: every operation connects, performs its remote call and drops the session.
pub struct ShareClient<C: Connector = SmbConnector> {
    config: ShareConfig,
    connector: C,
    retry: RetryPolicy,
    cancel: Option<CancelToken>,
    max_overwrite_attempts: u32,
}

impl<C: Connector> ShareClient<C> {
    pub fn new(config: ShareConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            retry: RetryPolicy::default(),
            cancel: None,
            max_overwrite_attempts: DEFAULT_MAX_OVERWRITE_ATTEMPTS,
        }
    }

    /// Construct ShareClient with the provided connection retry policy
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Construct ShareClient with a token able to abort pending connections
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Construct ShareClient with the provided amount of overwrite rounds (at least 1)
    pub fn max_overwrite_attempts(mut self, attempts: u32) -> Self {
        self.max_overwrite_attempts = attempts.max(1);
        self
    }

    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    /// Open a new session on the share, retrying as the retry policy allows
    pub fn connect(&self) -> ShareResult<C::Session> {
        info!(
            "connecting to SMB host {}:{} at time {}",
            self.config.host,
            self.config.port,
            fmt_utils::now_utc()
        );
        let timeout = self.retry.timeout();
        retry::retry(&self.retry, self.cancel.as_ref(), |attempt| {
            debug!("connection attempt {} to {}", attempt, self.config.host);
            self.connector.connect(&self.config, timeout)
        })
        .map_err(|err| match err {
            RetryError::Cancelled => ShareError::Cancelled,
            RetryError::Exhausted { attempts, last } => ShareError::ConnectionFailed {
                host: self.config.host.clone(),
                port: self.config.port,
                attempts,
                source: last,
            },
        })
    }

    /// List every file and directory in the share root
    pub fn list_files(&self) -> ShareResult<Vec<File>> {
        let mut session = self.connect()?;
        debug!("listing files and dirs in share {}", self.config.share);
        Ok(session.list_root()?)
    }

    /// Log the name of every entry in the share root, then return the listing
    pub fn print_filenames(&self) -> ShareResult<Vec<File>> {
        let files = self.list_files()?;
        info!("listing files and dirs in share {}:", self.config.share);
        for file in files.iter() {
            info!("{}", file.name());
        }
        Ok(files)
    }

    /// Download `name` into the local directory under the same name.
    ///
    /// Returns either the local path or the text content of the file, depending on `fetch`.
    pub fn fetch(&self, name: &str, fetch: Fetch) -> ShareResult<Fetched> {
        let name = name_utils::validate(name)?;
        let mut session = self.connect()?;
        if session.stat(name)?.is_none() {
            error!("cannot download {}: no such file", name);
            return Err(ShareError::NotFound(name.to_string()));
        }
        fs::create_dir_all(self.config.local_directory())
            .map_err(|e| ShareError::local(self.config.local_directory(), e))?;
        let path = self.config.local_path(name);
        info!("downloading {} from the share to {}", name, path.display());
        let mut file = fs::File::create(path.as_path())
            .map_err(|e| ShareError::local(path.as_path(), e))?;
        let bytes = match session.retrieve(name, &mut file) {
            Ok(bytes) => bytes,
            Err(err) => {
                drop(file);
                let _ = fs::remove_file(path.as_path());
                return Err(err.into());
            }
        };
        drop(file);
        drop(session);
        debug!("downloaded {} bytes to {}", bytes, path.display());
        match fetch {
            Fetch::Path => Ok(Fetched::Path(path)),
            Fetch::Content => {
                let data = fs::read(path.as_path()).map_err(|e| ShareError::local(path.as_path(), e))?;
                String::from_utf8(data)
                    .map(Fetched::Content)
                    .map_err(|_| ShareError::NotUtf8(path))
            }
        }
    }

    /// Download `name` and return the path of the local copy
    pub fn fetch_path(&self, name: &str) -> ShareResult<PathBuf> {
        self.fetch(name, Fetch::Path)
            .map(|f| f.into_path().unwrap_or_else(|| self.config.local_path(name)))
    }

    /// Download `name` and return its text content
    pub fn fetch_text(&self, name: &str) -> ShareResult<String> {
        self.fetch(name, Fetch::Content)
            .map(|f| f.into_content().unwrap_or_default())
    }

    /// Upload the local file at `local_path` to the share as `name`.
    ///
    /// If `name` already exists, it is deleted and uploaded again when `overwrite` is set,
    /// otherwise the remote file is left untouched and [`StoreOutcome::Skipped`] is returned.
    pub fn store<P: AsRef<Path>>(
        &self,
        name: &str,
        local_path: P,
        overwrite: bool,
    ) -> ShareResult<StoreOutcome> {
        let name = name_utils::validate(name)?;
        let local_path = local_path.as_ref();
        let mut file =
            fs::File::open(local_path).map_err(|e| ShareError::local(local_path, e))?;
        let mut session = self.connect()?;
        info!(
            "saving local file {} to the share as {}",
            local_path.display(),
            name
        );
        let mut overwrites = 0;
        loop {
            let existing = match session.stat(name)? {
                None => {
                    let bytes = session.store(name, &mut file)?;
                    debug!("uploaded {} bytes to {}", bytes, name);
                    return Ok(StoreOutcome::Stored(bytes));
                }
                Some(existing) => existing.name(),
            };
            if !overwrite {
                warn!("{} exists already, NOT overwriting", name);
                return Ok(StoreOutcome::Skipped);
            }
            if overwrites >= self.max_overwrite_attempts {
                error!(
                    "{} still exists after {} overwrite attempt(s)",
                    name, overwrites
                );
                return Err(ShareError::ConflictPersisted {
                    name: name.to_string(),
                    attempts: overwrites,
                });
            }
            overwrites += 1;
            warn!("{} exists already, overwriting...", existing);
            session.remove(existing.as_str())?;
        }
    }

    /// Write `text` to the local file `name`, then upload it overwriting the remote copy
    pub fn write_text(&self, name: &str, text: &str) -> ShareResult<StoreOutcome> {
        let name = name_utils::validate(name)?;
        fs::create_dir_all(self.config.local_directory())
            .map_err(|e| ShareError::local(self.config.local_directory(), e))?;
        let path = self.config.local_path(name);
        debug!("writing to file {}: {}", path.display(), text);
        fs::write(path.as_path(), text).map_err(|e| ShareError::local(path.as_path(), e))?;
        self.store(name, path, true)
    }

    /// Delete every file in the share root matching `name`; `*` and `?` are wildcards
    pub fn delete(&self, name: &str) -> ShareResult<DeleteOutcome> {
        let name = name_utils::validate(name)?;
        let mut session = self.connect()?;
        info!("deleting files matching {} from the share", name);
        let case_sensitive = session.case_sensitive();
        let targets: Vec<String> = if name_utils::is_pattern(name) {
            session
                .list_root()?
                .into_iter()
                .filter(|f| {
                    !f.is_dir() && name_utils::matches(name, f.name().as_str(), case_sensitive)
                })
                .map(|f| f.name())
                .collect()
        } else {
            session
                .stat(name)?
                .filter(|f| !f.is_dir())
                .map(|f| vec![f.name()])
                .unwrap_or_default()
        };
        let mut deleted = 0;
        for target in targets.iter() {
            trace!("removing {}", target);
            if let Err(err) = session.remove(target) {
                // someone else may have removed it in the meantime
                if session.stat(target)?.is_some() {
                    error!("could not remove {}: {}", target, err);
                    return Err(err.into());
                }
                debug!("{} is already gone", target);
                continue;
            }
            deleted += 1;
        }
        if deleted == 0 {
            info!("nothing to delete for {}. Does the file exist?", name);
            return Ok(DeleteOutcome::NotFound);
        }
        debug!("deleted {} file(s) matching {}", deleted, name);
        Ok(DeleteOutcome::Deleted(deleted))
    }

    /// Tell whether `name` exists in the share root.
    ///
    /// Transport failures are reported as errors, never as a missing file.
    pub fn exists(&self, name: &str) -> ShareResult<bool> {
        let exists = self.stat(name)?.is_some();
        debug!("{} exists: {}", name, exists);
        Ok(exists)
    }

    /// Get the attributes of `name`, if it exists
    pub fn stat(&self, name: &str) -> ShareResult<Option<File>> {
        let name = name_utils::validate(name)?;
        let mut session = self.connect()?;
        trace!("checking if file {} exists", name);
        Ok(session.stat(name)?)
    }
}
