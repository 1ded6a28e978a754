//! Start a new journey.

use clap::Args;
use drillplan_core::problem::{available_lists, list_path};
use drillplan_core::{PlanSettings, Planner, ProblemCatalog, RichnessLevel};

use super::Context;

#[derive(Args)]
pub struct InitArgs {
    /// Problem list name or file in problem_lists/ (e.g. "NeetCode 150")
    #[arg(short, long)]
    list: Option<String>,

    /// First study day (defaults to today)
    #[arg(long)]
    start: Option<chrono::NaiveDate>,

    /// New problems introduced per day
    #[arg(long, default_value_t = 3)]
    per_day: u32,

    /// Resource detail in plans: minimal, spoilers, video_link, video_embed
    #[arg(long, default_value = "minimal")]
    richness: RichnessLevel,

    /// Archive an existing journey and start over
    #[arg(long)]
    force: bool,
}

pub fn run(args: InitArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let lists_dir = ctx.workspace.problem_lists_dir();
    let available = available_lists(&lists_dir)?;

    let Some(name) = args.list else {
        if available.is_empty() {
            println!("No problem lists found. Put a list JSON file in {}", lists_dir.display());
        } else {
            println!("Available problem lists:");
            for name in &available {
                println!("  {name}");
            }
            println!("\nRun `drillplan init --list <name>` to start.");
        }
        return Ok(());
    };
    if args.per_day == 0 {
        return Err("--per-day must be at least 1".into());
    }

    let path = list_path(&lists_dir, &name);
    let catalog = ProblemCatalog::load(&path)?;
    let source = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let settings = PlanSettings {
        plan_name: catalog.name.clone(),
        plan_source: source,
        start_date: args.start.unwrap_or(ctx.today),
        problems_per_day: args.per_day,
        richness: args.richness,
    };

    let planner = Planner::initialize(ctx.workspace.clone(), &catalog, settings, args.force)?;
    let state = planner.state();
    println!(
        "Started '{}' with {} problems, {} per day from {} ({} resources).",
        state.settings.plan_name,
        state.problems.len(),
        state.settings.problems_per_day,
        state.settings.start_date,
        state.settings.richness
    );
    println!("Run `drillplan plan` to create today's plan.");
    Ok(())
}
