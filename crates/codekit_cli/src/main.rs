//! codekit CLI - gap-filling code allocation for xlsx workbooks
//!
//! Codes are a 3-letter prefix plus a zero-padded 3- or 4-digit number.
//! Every tag receives the smallest number not yet used under its prefix.
//!
//! ## Quick Start
//!
//! ```bash
//! # Allocate codes for every tag in SIGLAS!A
//! codekit allocate --base base.xlsx --tags siglas.xlsx
//!
//! # Preview the next code for a prefix
//! codekit next ABC --base base.xlsx --digits 3
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod commands;
mod config;

use commands::{Cli, Command};
use config::Config;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let path_config = cli.config.as_deref();

    match cli.command {
        Command::Allocate(args) => commands::allocate::run(args, &Config::load(path_config)?),
        Command::Next(args) => commands::next::run(args, &Config::load(path_config)?),
        Command::Validate(args) => commands::validate::run(args, &Config::load(path_config)?),
        Command::Config(args) => commands::config::run(args, path_config),
    }
}

fn init_logging(if_verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let c_filter_default = if if_verbose {
        "debug"
    } else {
        "warn,codekit=info,codekit_io_xlsx=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(c_filter_default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
