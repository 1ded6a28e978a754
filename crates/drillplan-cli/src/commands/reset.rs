use clap::Args;
use drillplan_core::Planner;

use super::Context;

#[derive(Args)]
pub struct ResetArgs {
    /// Confirm the reset
    #[arg(long)]
    yes: bool,
}

pub fn run(args: ResetArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    if !args.yes {
        return Err("reset archives the state, plans and workspace; pass --yes to confirm".into());
    }
    let planner = Planner::open(ctx.workspace.clone())?;
    let stamp = chrono::Local::now().format("%Y-%m-%d_%H%M%S").to_string();
    let handle = planner.reset_state(&stamp)?;
    println!("Archived {} file(s) to {}", handle.files.len(), handle.dir.display());
    println!("Run `drillplan init` to start a new journey.");
    Ok(())
}
