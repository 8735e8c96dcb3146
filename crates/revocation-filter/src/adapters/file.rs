//! File-backed `StateStore`: one file per key, replaced atomically

use crate::error::StoreError;
use crate::ports::StateStore;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File-backed state store.
///
/// Each key is stored in its own file inside `dir`, named after the hex
/// encoding of the key. Writes go to a temp file that is synced and then
/// renamed over the target, so a crash leaves either the old or the new
/// value.
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StoreError::Io {
            key: String::new(),
            message: format!("create {}: {}", dir.display(), e),
        })?;

        info!(dir = %dir.display(), "Opened file state store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.state", hex::encode(key)))
    }
}

impl StateStore for FileStateStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(key, bytes = bytes.len(), "Read state");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let temp_path = path.with_extension("tmp");

        let written = fs::File::create(&temp_path)
            .and_then(|mut file| {
                file.write_all(value)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp_path, &path));

        if let Err(e) = written {
            // Leave no half-written temp file behind
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(key, error = %cleanup, "Failed to remove temp state file");
                }
            }
            return Err(StoreError::Io {
                key: key.to_string(),
                message: e.to_string(),
            });
        }

        debug!(key, bytes = value.len(), "Wrote state");
        Ok(())
    }
}
