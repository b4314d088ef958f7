//! Token persistence in a single file, accessed through a capability handle
//! on its parent directory.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};

use crate::domain::BearerToken;
use crate::domain::ports::{TokenStore, TokenStoreError};

const STAGING_SUFFIX: &str = ".tmp";

/// [`TokenStore`] writing the raw token to `path`.
///
/// Saves go through a staging file renamed over the target, so a crash never
/// leaves a half-written token behind.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parts(&self) -> Result<(&Path, &OsStr), TokenStoreError> {
        let file_name = self.path.file_name().ok_or_else(|| {
            TokenStoreError::io(format!("{} does not name a file", self.path.display()))
        })?;
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Ok((parent, file_name))
    }

    fn io_error(&self, error: &io::Error) -> TokenStoreError {
        TokenStoreError::io(format!("{}: {error}", self.path.display()))
    }

    /// Open the parent directory, or `None` when it does not exist yet.
    fn open_parent(&self) -> Result<Option<(Dir, &OsStr)>, TokenStoreError> {
        let (parent, file_name) = self.parts()?;
        match Dir::open_ambient_dir(parent, ambient_authority()) {
            Ok(dir) => Ok(Some((dir, file_name))),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error(&error)),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<BearerToken>, TokenStoreError> {
        let Some((dir, file_name)) = self.open_parent()? else {
            return Ok(None);
        };
        let raw = match dir.read_to_string(file_name) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.io_error(&error)),
        };
        BearerToken::new(raw)
            .map(Some)
            .map_err(|error| TokenStoreError::corrupt(format!("{}: {error}", self.path.display())))
    }

    fn save(&self, token: &BearerToken) -> Result<(), TokenStoreError> {
        let (parent, file_name) = self.parts()?;
        Dir::create_ambient_dir_all(parent, ambient_authority())
            .map_err(|error| self.io_error(&error))?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority())
            .map_err(|error| self.io_error(&error))?;

        let mut staging = file_name.to_os_string();
        staging.push(STAGING_SUFFIX);
        dir.write(&staging, token.as_str().as_bytes())
            .map_err(|error| self.io_error(&error))?;
        dir.rename(&staging, &dir, file_name).map_err(|error| {
            let _cleanup_result = dir.remove_file(&staging);
            self.io_error(&error)
        })
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let Some((dir, file_name)) = self.open_parent()? else {
            return Ok(());
        };
        match dir.remove_file(file_name) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error(&error)),
        }
    }
}
