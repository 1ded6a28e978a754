//! Sync subcommand: apply completed plan documents.

use clap::Args;
use drillplan_core::tracker::format_duration;
use drillplan_core::{PlanDocument, Planner, Rating, SyncReport};

use super::Context;

#[derive(Args)]
pub struct SyncArgs {
    /// Preview changes without applying them
    #[arg(long)]
    dry_run: bool,

    /// Print the reports as JSON
    #[arg(long)]
    json: bool,
}

/// Run the sync command.
///
/// Documents are processed oldest first. A document that synced without
/// errors moves to `archive/plans/`; one with errors stays so it can be
/// fixed and synced again.
pub fn run(args: SyncArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let mut planner = Planner::open(ctx.workspace.clone())?;
    let documents = ctx.workspace.plan_documents()?;

    if documents.is_empty() {
        if !args.dry_run {
            planner.write_dashboard(ctx.today)?;
        }
        println!("No daily plans found to sync. Dashboard regenerated from the current state.");
        return Ok(());
    }

    let mut reports = Vec::new();
    for path in documents {
        let doc = PlanDocument::load(&path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let report = if args.dry_run {
            planner.preview_sync(&doc, ctx.today)
        } else {
            planner.sync_day(&doc, ctx.today)?
        };

        if !args.json {
            print_report(&name, &report, args.dry_run);
        }
        if !args.dry_run && report.is_clean() {
            let archived = ctx.workspace.archive_plan_document(&path)?;
            log::info!("archived {} to {}", name, archived.display());
        }
        reports.push(serde_json::json!({ "document": name, "report": report }));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if !args.dry_run {
        println!("Dashboard updated: {}", ctx.workspace.dashboard_path().display());
    }
    Ok(())
}

fn print_report(name: &str, report: &SyncReport, dry_run: bool) {
    let verb = if dry_run { "would update" } else { "updated" };
    let totals = &report.totals;
    println!(
        "{name}: {verb} {}, skipped {}, {} error(s)",
        totals.updated, totals.skipped, totals.errored
    );
    if totals.updated > 0 {
        let ratings: Vec<String> = Rating::ALL
            .iter()
            .filter(|r| totals.count_for(**r) > 0)
            .map(|r| format!("{} x{}", r.label(), totals.count_for(*r)))
            .collect();
        println!(
            "  ratings: {}; time recorded: {}",
            ratings.join(", "),
            format_duration(totals.time_recorded_secs)
        );
    }
    for error in &report.errors {
        println!("  error: {error}");
    }
    if !report.is_clean() && !dry_run {
        println!("  fix the entries above and run `drillplan sync` again");
    }
    println!("  backlog: {}, streak: {} day(s)", totals.backlog_size, totals.streak);
}
