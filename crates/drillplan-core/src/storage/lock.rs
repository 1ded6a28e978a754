//! Concurrent-run marker.
//!
//! A run creates `.drillplan.lock` with create-new semantics and removes it
//! when dropped. Finding the file already present is a hard failure; a
//! stale lock left by a crashed run has to be deleted by hand.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::error::ConcurrencyError;

#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    run_id: Uuid,
}

impl RunLock {
    /// Create the marker at `path`.
    ///
    /// # Errors
    /// [`ConcurrencyError::Locked`] if the marker already exists.
    pub fn acquire(path: &Path) -> Result<Self, ConcurrencyError> {
        let run_id = Uuid::new_v4();
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                let holder = fs::read_to_string(path)
                    .map(|s| s.lines().collect::<Vec<_>>().join(", "))
                    .unwrap_or_else(|_| "unknown holder".into());
                return Err(ConcurrencyError::Locked {
                    path: path.to_path_buf(),
                    holder,
                });
            }
            Err(source) => {
                return Err(ConcurrencyError::LockFailed {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let body = format!(
            "run={run_id}\npid={}\nstarted={}\n",
            std::process::id(),
            Utc::now().to_rfc3339()
        );
        if let Err(source) = file.write_all(body.as_bytes()) {
            let _ = fs::remove_file(path);
            return Err(ConcurrencyError::LockFailed {
                path: path.to_path_buf(),
                source,
            });
        }
        log::debug!("acquired {} ({run_id})", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            run_id,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let ours = fs::read_to_string(&self.path)
            .map(|s| s.contains(&self.run_id.to_string()))
            .unwrap_or(false);
        if !ours {
            log::warn!("{} no longer belongs to this run; leaving it", self.path.display());
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("could not remove {}: {e}", self.path.display());
        }
    }
}
