//! One session over a journey root.
//!
//! A [`Planner`] holds the run lock for its whole lifetime, owns the loaded
//! [`State`] and is the only thing that writes `state.json`. Every operation
//! works on a copy of the state and commits it with one atomic save, so a
//! failure part-way leaves the previous snapshot in place.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::dashboard::Dashboard;
use crate::error::{Result, StorageError};
use crate::plan::render::render_plan;
use crate::plan::{DailyPlan, DailyPlanBuilder, PlanDocument};
use crate::problem::{list_path, ProblemCatalog};
use crate::progress::{PlanSettings, State};
use crate::storage::{ArchiveHandle, Config, RunLock, StateStore, Workspace};
use crate::sync::{SyncEngine, SyncReport};
use crate::tracker::{ArtifactSource, FsTimeTracker};

pub struct Planner {
    workspace: Workspace,
    config: Config,
    store: StateStore,
    state: State,
    lock: RunLock,
}

impl Planner {
    /// Lock the journey and load its config and state.
    ///
    /// # Errors
    /// Fails if another run holds the lock, the config is invalid, or the
    /// state is missing or corrupt.
    pub fn open(workspace: Workspace) -> Result<Self> {
        let lock = RunLock::acquire(&workspace.lock_path())?;
        let config = Config::load(workspace.root())?;
        let store = StateStore::new(workspace.state_path());
        let state = store.load()?;
        log::debug!(
            "opened {} ({} problems, run {})",
            workspace.root().display(),
            state.problems.len(),
            lock.run_id()
        );
        Ok(Self {
            workspace,
            config,
            store,
            state,
            lock,
        })
    }

    /// Start a new journey from `catalog`.
    ///
    /// With `overwrite`, an existing journey is archived first.
    ///
    /// # Errors
    /// [`StorageError::AlreadyInitialized`] if a state exists and
    /// `overwrite` is false.
    pub fn initialize(
        workspace: Workspace,
        catalog: &ProblemCatalog,
        settings: PlanSettings,
        overwrite: bool,
    ) -> Result<Self> {
        workspace.ensure_dirs()?;
        let lock = RunLock::acquire(&workspace.lock_path())?;
        let store = StateStore::new(workspace.state_path());
        if store.exists() {
            if !overwrite {
                return Err(StorageError::AlreadyInitialized {
                    path: store.path().to_path_buf(),
                }
                .into());
            }
            let stamp = chrono::Local::now().format("%Y-%m-%d_%H%M%S").to_string();
            workspace.archive_all(&stamp)?;
        }

        let config_path = Config::path(workspace.root());
        let config = if config_path.exists() {
            Config::load(workspace.root())?
        } else {
            let config = Config::default();
            config.save(workspace.root())?;
            config
        };

        let state = State::initialize(catalog, settings);
        store.save(&state)?;
        log::info!(
            "initialized '{}' with {} problems starting {}",
            state.settings.plan_name,
            state.problems.len(),
            state.settings.start_date
        );
        Ok(Self {
            workspace,
            config,
            store,
            state,
            lock,
        })
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn run_id(&self) -> uuid::Uuid {
        self.lock.run_id()
    }

    fn builder(&self) -> DailyPlanBuilder {
        DailyPlanBuilder::new(self.config.planning.daily_cap)
    }

    /// Select the plan for `date` and persist the assignment.
    ///
    /// Building for a new date also moves the previous day's workspace
    /// files to the archive when `planning.clear_workspace_on_plan` is set.
    pub fn build_daily_plan(&mut self, date: NaiveDate) -> Result<DailyPlan> {
        let new_day = self.state.current_plan.as_ref().map(|m| m.date) != Some(date);
        let mut staged = self.state.clone();
        let plan = self.builder().build(&mut staged, date);
        self.commit(staged)?;

        if new_day && self.config.planning.clear_workspace_on_plan {
            self.clear_workspace(date)?;
        }
        Ok(plan)
    }

    fn clear_workspace(&self, date: NaiveDate) -> Result<()> {
        let today = self.workspace.plan_path(date);
        let pending: Vec<PathBuf> = self
            .workspace
            .plan_documents()?
            .into_iter()
            .filter(|p| *p != today)
            .collect();
        if !pending.is_empty() {
            log::warn!(
                "{} unsynced plan document(s) in {}; keeping workspace files for their timings",
                pending.len(),
                self.workspace.daily_plans_dir().display()
            );
            return Ok(());
        }
        self.workspace.clear_artifacts(date)?;
        Ok(())
    }

    /// Pull `count` extra problems into the plan for `date`.
    ///
    /// Returns the updated plan and how many problems were added.
    pub fn add_extra(&mut self, date: NaiveDate, count: usize) -> Result<(DailyPlan, usize)> {
        let mut staged = self.state.clone();
        let (plan, added) = self.builder().add_extra(&mut staged, date, count);
        self.commit(staged)?;
        Ok((plan, added))
    }

    /// Apply an edited plan document, reading artifact times from the
    /// workspace directory.
    pub fn sync_day(&mut self, doc: &PlanDocument, date: NaiveDate) -> Result<SyncReport> {
        let tracker = FsTimeTracker::new(self.workspace.workspace_dir());
        self.sync_day_with(doc, date, &tracker)
    }

    /// Apply an edited plan document and regenerate the dashboard.
    ///
    /// Per-entry errors are in the report; the entries that did apply are
    /// committed regardless.
    pub fn sync_day_with(
        &mut self,
        doc: &PlanDocument,
        date: NaiveDate,
        artifacts: &dyn ArtifactSource,
    ) -> Result<SyncReport> {
        let outcome = self.engine_run(doc, date, artifacts);
        if !outcome.report.updated_ids.is_empty() {
            self.commit(outcome.state)?;
        }
        self.write_dashboard(date)?;
        Ok(outcome.report)
    }

    /// What a sync would do, without committing anything.
    pub fn preview_sync(&self, doc: &PlanDocument, date: NaiveDate) -> SyncReport {
        let tracker = FsTimeTracker::new(self.workspace.workspace_dir());
        self.engine_run(doc, date, &tracker).report
    }

    fn engine_run(&self, doc: &PlanDocument, date: NaiveDate, artifacts: &dyn ArtifactSource) -> crate::sync::SyncOutcome {
        SyncEngine::new(&self.config.scheduling, &self.config.time_tracking, artifacts).sync_day(
            &self.state,
            doc,
            date,
        )
    }

    /// Re-spread NotStarted problems from `from` at `per_day` a day.
    ///
    /// Returns how many problems moved. The dashboard is regenerated.
    pub fn rebalance(&mut self, from: NaiveDate, per_day: u32) -> Result<usize> {
        if per_day == 0 {
            return Err(crate::error::ValidationError::InvalidValue {
                field: "problems_per_day".into(),
                message: "must be at least 1".into(),
            }
            .into());
        }
        let mut staged = self.state.clone();
        staged.settings.problems_per_day = per_day;
        let moved = staged.spread_not_started(from, per_day);
        self.commit(staged)?;
        self.write_dashboard(from)?;
        log::info!("rebalanced {moved} problem(s) from {from} at {per_day}/day");
        Ok(moved)
    }

    pub fn dashboard(&self, date: NaiveDate) -> Dashboard {
        Dashboard::from_state(&self.state, date, self.config.planning.upcoming_days)
    }

    /// Overwrite `dashboard.md` from the current state.
    pub fn write_dashboard(&self, date: NaiveDate) -> Result<PathBuf> {
        let path = self.workspace.dashboard_path();
        std::fs::write(&path, self.dashboard(date).render_markdown())?;
        log::debug!("wrote {}", path.display());
        Ok(path)
    }

    /// The problem list this journey was started from, if still readable.
    pub fn catalog(&self) -> Option<ProblemCatalog> {
        let settings = &self.state.settings;
        let name = if settings.plan_source.is_empty() {
            &settings.plan_name
        } else {
            &settings.plan_source
        };
        let path = list_path(&self.workspace.problem_lists_dir(), name);
        match ProblemCatalog::load(&path) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                log::warn!("rendering without resources: {e}");
                None
            }
        }
    }

    /// Write the plan document for `plan.date`, keeping anything already
    /// filled in on an existing document for that day.
    pub fn write_plan(&self, plan: &DailyPlan) -> Result<PathBuf> {
        let path = self.workspace.plan_path(plan.date);
        let mut plan = plan.clone();
        if path.exists() {
            plan.apply_edits(&PlanDocument::load(&path)?);
        }
        let text = render_plan(&plan, self.catalog().as_ref(), self.state.settings.richness);
        std::fs::create_dir_all(self.workspace.daily_plans_dir())?;
        std::fs::write(&path, text)?;
        Ok(path)
    }

    /// Archive the whole journey and release the lock.
    pub fn reset_state(self, stamp: &str) -> Result<ArchiveHandle> {
        let handle = self.workspace.archive_all(stamp)?;
        log::info!("journey reset; previous files are in {}", handle.dir.display());
        Ok(handle)
    }

    fn commit(&mut self, staged: State) -> Result<()> {
        if staged == self.state {
            return Ok(());
        }
        self.store.save(&staged)?;
        self.state = staged;
        Ok(())
    }
}
