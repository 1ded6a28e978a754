use clap::Args;
use drillplan_core::Planner;

use super::Context;

#[derive(Args)]
pub struct DashboardArgs {
    /// Print the dashboard data as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: DashboardArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let planner = Planner::open(ctx.workspace.clone())?;
    planner.write_dashboard(ctx.today)?;
    let dashboard = planner.dashboard(ctx.today);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        println!("{}", dashboard.render_markdown());
    }
    Ok(())
}
