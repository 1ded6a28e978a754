pub mod config;
pub mod dashboard;
pub mod init;
pub mod plan;
pub mod reset;
pub mod sync;

use std::path::PathBuf;

use chrono::NaiveDate;
use drillplan_core::Workspace;

/// Settings shared by every command.
pub struct Context {
    pub workspace: Workspace,
    pub today: NaiveDate,
}

impl Context {
    pub fn new(root: Option<PathBuf>, date: Option<NaiveDate>) -> Self {
        Self {
            workspace: Workspace::resolve(root),
            today: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
        }
    }
}
