//! On-disk layout of a journey.
//!
//! ```text
//! <root>/
//!   drillplan.toml      tuning config
//!   state.json          progress snapshot (state.json.bak: last known-good)
//!   dashboard.md        regenerated on every sync
//!   problem_lists/      problem list JSON files
//!   daily_plans/        one plan document per day
//!   workspace/          solution files; only their timestamps are read
//!   archive/            everything moved aside by resets and clean-ups
//! ```

mod config;
pub mod lock;
pub mod state_store;

pub use config::{Config, PlanningConfig, CONFIG_FILE};
pub use lock::RunLock;
pub use state_store::StateStore;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::StorageError;

/// Environment variable overriding the journey root.
pub const ROOT_ENV: &str = "DRILLPLAN_HOME";

/// Files moved aside by a reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHandle {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Paths of one journey root.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Journey root from an explicit path, `DRILLPLAN_HOME`, or the current
    /// directory.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        let root = explicit
            .or_else(|| std::env::var_os(ROOT_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join("state.json")
    }

    pub fn dashboard_path(&self) -> PathBuf {
        self.root.join("dashboard.md")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(".drillplan.lock")
    }

    pub fn problem_lists_dir(&self) -> PathBuf {
        self.root.join("problem_lists")
    }

    pub fn daily_plans_dir(&self) -> PathBuf {
        self.root.join("daily_plans")
    }

    pub fn workspace_dir(&self) -> PathBuf {
        self.root.join("workspace")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.root.join("archive")
    }

    pub fn plan_path(&self, date: NaiveDate) -> PathBuf {
        self.daily_plans_dir().join(format!("{}.md", date.format("%Y-%m-%d")))
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [
            self.problem_lists_dir(),
            self.daily_plans_dir(),
            self.workspace_dir(),
            self.archive_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Plan documents in `daily_plans/`, oldest first.
    pub fn plan_documents(&self) -> std::io::Result<Vec<PathBuf>> {
        let dir = self.daily_plans_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut docs: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("md"))
            .collect();
        docs.sort();
        Ok(docs)
    }

    /// Move every file in `workspace/` to `archive/workspace/<date>/`.
    ///
    /// Returns the number of files moved.
    pub fn clear_artifacts(&self, date: NaiveDate) -> Result<usize, StorageError> {
        let source = self.workspace_dir();
        if !source.exists() {
            return Ok(0);
        }
        let target = self
            .archive_dir()
            .join("workspace")
            .join(date.format("%Y-%m-%d").to_string());
        let files = list_files(&source).map_err(|e| archive_failed(&source, e))?;
        for file in &files {
            move_into(file, &target)?;
        }
        if !files.is_empty() {
            log::info!("moved {} workspace file(s) to {}", files.len(), target.display());
        }
        Ok(files.len())
    }

    /// Move a processed plan document to `archive/plans/`.
    pub fn archive_plan_document(&self, path: &Path) -> Result<PathBuf, StorageError> {
        move_into(path, &self.archive_dir().join("plans"))
    }

    /// Move state, backup, dashboard, plan documents and workspace files to
    /// `archive/<stamp>/`.
    pub fn archive_all(&self, stamp: &str) -> Result<ArchiveHandle, StorageError> {
        let dir = self.archive_dir().join(stamp);
        let mut files = Vec::new();

        for path in [
            self.state_path(),
            StateStore::backup_path_for(&self.state_path()),
            self.dashboard_path(),
        ] {
            if path.exists() {
                files.push(move_into(&path, &dir)?);
            }
        }
        for (source, sub) in [
            (self.daily_plans_dir(), "daily_plans"),
            (self.workspace_dir(), "workspace"),
        ] {
            if !source.exists() {
                continue;
            }
            for file in list_files(&source).map_err(|e| archive_failed(&source, e))? {
                files.push(move_into(&file, &dir.join(sub))?);
            }
        }

        log::info!("archived {} file(s) to {}", files.len(), dir.display());
        Ok(ArchiveHandle { dir, files })
    }
}

fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn archive_failed(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::ArchiveFailed {
        path: path.to_path_buf(),
        source,
    }
}

/// Move `file` into `dir`, never overwriting an existing file there.
fn move_into(file: &Path, dir: &Path) -> Result<PathBuf, StorageError> {
    std::fs::create_dir_all(dir).map_err(|e| archive_failed(dir, e))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".into());
    let mut target = dir.join(&name);
    let mut n = 1;
    while target.exists() {
        let stem = Path::new(&name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        target = match Path::new(&name).extension() {
            Some(ext) => dir.join(format!("{stem}-{n}.{}", ext.to_string_lossy())),
            None => dir.join(format!("{stem}-{n}")),
        };
        n += 1;
    }
    std::fs::rename(file, &target).map_err(|e| archive_failed(file, e))?;
    Ok(target)
}
