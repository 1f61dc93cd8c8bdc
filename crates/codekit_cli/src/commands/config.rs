//! Config command implementation.

use std::path::Path;

use anyhow::{Result, bail};

use super::{ConfigAction, ConfigArgs};
use crate::config::Config;

/// Run the config command.
///
/// `init` does not read the existing file, so it can replace a broken one.
pub fn run(args: ConfigArgs, explicit: Option<&Path>) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let config = Config::load(explicit)?;
            print!("{}", config.to_toml_string()?);
        }

        ConfigAction::Init { force } => {
            let path = Config::resolve_path(explicit);
            if path.exists() && !force {
                bail!(
                    "{} already exists; pass --force to overwrite it",
                    path.display()
                );
            }
            Config::default().save(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }

    Ok(())
}
