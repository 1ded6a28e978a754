//! Plan building: `plan`, `add` and `rebalance`.

use clap::Args;
use drillplan_core::{DailyPlan, EntryKind, Planner};

use super::Context;

#[derive(Args)]
pub struct PlanArgs {
    /// Print the plan as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// How many problems to add (defaults to planning.default_extra_count)
    count: Option<usize>,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct RebalanceArgs {
    /// New problems per day from now on
    per_day: u32,

    /// First day of the new schedule (defaults to today)
    #[arg(long)]
    from: Option<chrono::NaiveDate>,
}

pub fn run(args: PlanArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let mut planner = Planner::open(ctx.workspace.clone())?;
    let plan = planner.build_daily_plan(ctx.today)?;
    let path = planner.write_plan(&plan)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_summary(&plan);
        println!("Plan written to {}", path.display());
    }
    Ok(())
}

pub fn add(args: AddArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let mut planner = Planner::open(ctx.workspace.clone())?;
    let count = args.count.unwrap_or(planner.config().planning.default_extra_count);
    let (plan, added) = planner.add_extra(ctx.today, count)?;
    let path = planner.write_plan(&plan)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }
    if added < count {
        println!("Only {added} problem(s) left to add; the list is fully scheduled.");
    } else {
        println!("Added {added} problem(s).");
    }
    print_summary(&plan);
    println!("Plan written to {}", path.display());
    Ok(())
}

pub fn rebalance(args: RebalanceArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let mut planner = Planner::open(ctx.workspace.clone())?;
    let from = args.from.unwrap_or(ctx.today);
    let moved = planner.rebalance(from, args.per_day)?;
    println!(
        "Rescheduled {moved} problem(s) not yet started: {} per day from {from}.",
        args.per_day
    );
    Ok(())
}

fn print_summary(plan: &DailyPlan) {
    println!("Plan for {}:", plan.date);
    if plan.is_empty() {
        println!("  nothing due");
    }
    for (kind, label) in [
        (EntryKind::Overdue, "overdue"),
        (EntryKind::Review, "review"),
        (EntryKind::New, "new"),
        (EntryKind::Extra, "extra"),
    ] {
        let count = plan.count(kind);
        if count > 0 {
            println!("  {count} {label}");
        }
    }
    if plan.backlog_focus {
        println!(
            "  {} more overdue problem(s) deferred; no new problems until the backlog clears",
            plan.deferred
        );
    }
}
