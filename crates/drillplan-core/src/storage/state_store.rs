//! Atomic JSON snapshot of [`State`].
//!
//! A save never modifies `state.json` in place: the new snapshot is written
//! to `state.json.tmp` and flushed, the current snapshot is copied to
//! `state.json.bak`, and the temp file is renamed over `state.json`. A
//! reader therefore sees either the old or the new snapshot, never a mix.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::progress::State;

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        Self::backup_path_for(&self.path)
    }

    pub fn backup_path_for(path: &Path) -> PathBuf {
        path.with_extension("json.bak")
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load and check the snapshot.
    ///
    /// # Errors
    /// [`StorageError::NotInitialized`] if there is no snapshot,
    /// [`StorageError::Corrupt`] if it does not parse or breaks an invariant.
    pub fn load(&self) -> Result<State, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotInitialized {
                    path: self.path.clone(),
                })
            }
            Err(source) => {
                return Err(StorageError::ReadFailed {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        self.parse(&content)
    }

    fn parse(&self, content: &str) -> Result<State, StorageError> {
        let corrupt = |message: String| StorageError::Corrupt {
            path: self.path.clone(),
            message,
            backup: self.backup_path().display().to_string(),
        };
        let state: State = serde_json::from_str(content).map_err(|e| corrupt(e.to_string()))?;
        state.check().map_err(corrupt)?;
        Ok(state)
    }

    /// Atomically replace the snapshot.
    ///
    /// # Errors
    /// [`StorageError::WriteFailed`] if any step fails; the previous snapshot
    /// is then still in place.
    pub fn save(&self, state: &State) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(state)?;
        let temp = self.temp_path();
        let write_failed = |path: &Path, source: std::io::Error| StorageError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| write_failed(parent, e))?;
            }
        }

        let written = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&temp)?;
            file.write_all(content.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()
        })();
        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(write_failed(&temp, e));
        }

        self.refresh_backup();

        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(write_failed(&self.path, e));
        }
        log::debug!("saved {}", self.path.display());
        Ok(())
    }

    /// Copy the current snapshot to the backup, if it is a valid one.
    fn refresh_backup(&self) {
        let Ok(current) = fs::read_to_string(&self.path) else {
            return;
        };
        if self.parse(&current).is_err() {
            log::warn!(
                "{} is not a valid snapshot; keeping the existing backup",
                self.path.display()
            );
            return;
        }
        if let Err(e) = fs::write(self.backup_path(), current) {
            log::warn!("could not refresh {}: {e}", self.backup_path().display());
        }
    }
}
