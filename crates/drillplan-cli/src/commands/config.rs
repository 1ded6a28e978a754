//! Config subcommand: inspect and edit `drillplan.toml`.

use clap::Subcommand;
use drillplan_core::Config;

use super::Context;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting, e.g. `planning.daily_cap` or `scheduling.easy_multiplier`
    Get {
        /// Dotted key: `<scheduling|planning|time_tracking>.<field>`
        key: String,
    },
    /// Change one setting; the whole file is re-validated before saving
    Set {
        /// Dotted key, e.g. `time_tracking.max_duration_secs`
        key: String,
        /// New value, parsed to the type of the current one
        value: String,
    },
    /// Print the effective config as TOML, defaults included
    List,
    /// Print the path of the config file for this journey
    Path,
    /// Overwrite drillplan.toml with the default intervals and limits
    Reset,
}

pub fn run(action: ConfigAction, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let root = ctx.workspace.root();
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load(root)?
                .get(&key)
                .ok_or_else(|| format!("no such setting '{key}' (see `drillplan config list`)"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(root)?;
            let previous = config.get(&key).unwrap_or_default();
            config.set(&key, &value)?;
            config.save(root)?;
            log::info!("{key}: {previous} -> {value}");
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List => {
            print!("{}", toml::to_string_pretty(&Config::load(root)?)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::path(root).display());
        }
        ConfigAction::Reset => {
            Config::default().save(root)?;
            println!("{} reset to defaults", Config::path(root).display());
        }
    }
    Ok(())
}
