//! # Drillplan Core Library
//!
//! This library provides the core logic of drillplan, a file-based
//! spaced-repetition planner for practice problems. All operations are
//! available through the standalone `drillplan` CLI, which is a thin layer
//! over this crate.
//!
//! ## Architecture
//!
//! - **State Store**: atomic JSON snapshot of per-problem progress, guarded
//!   by a run lock
//! - **Scheduler**: pure `(previous interval, rating) -> next interval`
//! - **Time Tracker**: elapsed time from workspace file timestamps
//! - **Daily Plan Builder**: picks overdue, due and new problems for a date
//! - **Sync Engine**: merges an edited plan document back into the state
//!
//! ## Key Components
//!
//! - [`Planner`]: one locked session over a journey root
//! - [`State`]: everything persisted in `state.json`
//! - [`Config`]: tuning constants from `drillplan.toml`
//! - [`ArtifactSource`]: seam for artifact timestamps

pub mod dashboard;
pub mod error;
pub mod plan;
pub mod planner;
pub mod problem;
pub mod progress;
pub mod scheduler;
pub mod storage;
pub mod sync;
pub mod tracker;

pub use dashboard::{Dashboard, Streaks};
pub use error::{CatalogError, ConcurrencyError, ConfigError, CoreError, EntryError, StorageError, ValidationError};
pub use plan::render::render_plan;
pub use plan::{DailyPlan, DailyPlanBuilder, EntryKind, ParsedEntry, PlanDocument, PlanEntry};
pub use planner::Planner;
pub use problem::{ProblemCatalog, ProblemDefinition, ProblemId};
pub use progress::{PlanSettings, ProgressRecord, ProgressStatus, RichnessLevel, State};
pub use scheduler::{Rating, SchedulingPolicy};
pub use storage::{ArchiveHandle, Config, StateStore, Workspace};
pub use sync::{SyncEngine, SyncReport, SyncTotals};
pub use tracker::{ArtifactSource, FsTimeTracker, TimeLimits};
