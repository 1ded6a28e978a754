use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "drillplan", version, about = "Spaced-repetition planner for practice problems")]
struct Cli {
    /// Journey root (defaults to $DRILLPLAN_HOME, then the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Act as if today were this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new journey from a problem list
    Init(commands::init::InitArgs),
    /// Build today's plan document
    Plan(commands::plan::PlanArgs),
    /// Pull extra problems into today's plan
    Add(commands::plan::AddArgs),
    /// Apply completed plan documents to the progress state
    Sync(commands::sync::SyncArgs),
    /// Regenerate and show the progress dashboard
    Dashboard(commands::dashboard::DashboardArgs),
    /// Re-spread problems not yet started at a new daily rate
    Rebalance(commands::plan::RebalanceArgs),
    /// Archive everything and start from scratch
    Reset(commands::reset::ResetArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let ctx = Context::new(cli.root, cli.date);
    let result = match cli.command {
        Commands::Init(args) => commands::init::run(args, &ctx),
        Commands::Plan(args) => commands::plan::run(args, &ctx),
        Commands::Add(args) => commands::plan::add(args, &ctx),
        Commands::Sync(args) => commands::sync::run(args, &ctx),
        Commands::Dashboard(args) => commands::dashboard::run(args, &ctx),
        Commands::Rebalance(args) => commands::plan::rebalance(args, &ctx),
        Commands::Reset(args) => commands::reset::run(args, &ctx),
        Commands::Config { action } => commands::config::run(action, &ctx),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "drillplan", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
