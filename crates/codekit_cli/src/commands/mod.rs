//! CLI command definitions and handlers.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use codekit_alloc::EnumDigitWidth;
use codekit_io_xlsx::{EnumSourceRole, SpecKnownCodesSource, XlsxIoError};

use crate::config::Config;

pub mod allocate;
pub mod config;
pub mod next;
pub mod validate;

/// codekit - gap-filling code allocation for xlsx workbooks
#[derive(Parser)]
#[command(name = "codekit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log debug details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ./codekit.toml when present)
    #[arg(long, global = true, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand)]
pub enum Command {
    /// Allocate codes for every tag and write a result workbook
    Allocate(AllocateArgs),

    /// Print the next code for one or more prefixes
    Next(NextArgs),

    /// Check the known-codes workbook for malformed and duplicate codes
    Validate(ValidateArgs),

    /// Show or create the configuration file
    Config(ConfigArgs),
}

/// Where the known codes are read from.
#[derive(Args, Clone, Debug)]
pub struct BaseArgs {
    /// Workbook with already-issued codes
    #[arg(long, value_name = "XLSX")]
    pub base: PathBuf,

    /// Sheet with already-issued codes [config: base.sheet]
    #[arg(long, value_name = "SHEET")]
    pub base_sheet: Option<String>,

    /// Column letters scanned for codes, comma-separated [config: base.columns]
    #[arg(long, value_name = "COLS", value_delimiter = ',')]
    pub base_columns: Option<Vec<String>>,
}

impl BaseArgs {
    /// Known-codes source with flags applied over `config`.
    pub fn known_codes_source(&self, config: &Config) -> SpecKnownCodesSource {
        let mut source = config.known_codes_source();
        if let Some(val) = &self.base_sheet {
            source.sheet_name = val.clone();
        }
        if let Some(val) = &self.base_columns {
            source.cols = val.clone();
        }
        source
    }
}

/// Suffix width of the codes handed out.
#[derive(Args, Clone, Debug)]
pub struct DigitsArgs {
    /// Suffix width, 3 or 4 [config: allocation.digit_width]
    #[arg(long, value_name = "N")]
    pub digits: Option<EnumDigitWidth>,
}

impl DigitsArgs {
    /// Digit width with the flag applied over `config`.
    pub fn digit_width(&self, config: &Config) -> Result<EnumDigitWidth> {
        match self.digits {
            Some(val) => Ok(val),
            None => config.digit_width(),
        }
    }
}

/// Arguments for `allocate`.
#[derive(Args, Clone, Debug)]
pub struct AllocateArgs {
    #[command(flatten)]
    pub base: BaseArgs,

    #[command(flatten)]
    pub digits: DigitsArgs,

    /// Workbook with the tags to code
    #[arg(long, value_name = "XLSX")]
    pub tags: PathBuf,

    /// Output workbook (default: <tags stem>_codes.xlsx next to the tags file)
    #[arg(short, long, value_name = "XLSX")]
    pub output: Option<PathBuf>,

    /// Sheet with the tags [config: tags.sheet]
    #[arg(long, value_name = "SHEET")]
    pub tags_sheet: Option<String>,

    /// Column letter holding the tags [config: tags.column]
    #[arg(long, value_name = "COL")]
    pub tags_column: Option<String>,

    /// Result sheet name [config: output.result_sheet]
    #[arg(long, value_name = "SHEET")]
    pub result_sheet: Option<String>,

    /// Write only the result sheet, without the tags workbook's sheets
    #[arg(long)]
    pub no_copy_sheets: bool,
}

/// Arguments for `next`.
#[derive(Args, Clone, Debug)]
pub struct NextArgs {
    /// Prefixes (or full tags; the first 3 characters are used)
    #[arg(required = true, value_name = "PREFIX")]
    pub prefixes: Vec<String>,

    #[command(flatten)]
    pub base: BaseArgs,

    #[command(flatten)]
    pub digits: DigitsArgs,
}

/// Arguments for `validate`. Both widths are always checked.
#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub base: BaseArgs,
}

/// Arguments for `config`.
#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config actions
#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Hint naming the flag that fixes `err`, if there is one.
///
/// The hint follows the input role tagged on `err`, so it stays right when
/// the known codes and the tags share one workbook.
pub fn derive_flag_hint(err: &XlsxIoError) -> Option<String> {
    let role = err.role()?;
    let c_hint = match (role, err.root()) {
        (EnumSourceRole::KnownCodes, XlsxIoError::SheetNotFound { .. }) => {
            "pass --base-sheet with the sheet holding the known codes".to_string()
        }
        (EnumSourceRole::Tags, XlsxIoError::SheetNotFound { .. }) => {
            "pass --tags-sheet with the sheet holding the tags".to_string()
        }
        (EnumSourceRole::KnownCodes, XlsxIoError::InvalidColumn(c_col)) => {
            format!("column {c_col:?} is not a letter A..XFD; fix --base-columns")
        }
        (EnumSourceRole::Tags, XlsxIoError::InvalidColumn(c_col)) => {
            format!("column {c_col:?} is not a letter A..XFD; fix --tags-column")
        }
        (EnumSourceRole::KnownCodes, XlsxIoError::InvalidRow(_)) => {
            "fix base.row_start in the config file".to_string()
        }
        (EnumSourceRole::Tags, XlsxIoError::InvalidRow(_)) => {
            "fix tags.row_start in the config file".to_string()
        }
        (EnumSourceRole::KnownCodes, XlsxIoError::Open { .. }) => {
            "check the --base path points to an .xlsx workbook".to_string()
        }
        (EnumSourceRole::Tags, XlsxIoError::Open { .. }) => {
            "check the --tags path points to an .xlsx workbook".to_string()
        }
        _ => return None,
    };
    Some(c_hint)
}

/// Wrap `err` with its flag hint as context.
pub fn derive_cli_error(err: XlsxIoError) -> anyhow::Error {
    match derive_flag_hint(&err) {
        Some(c_hint) => anyhow::Error::new(err).context(c_hint),
        None => anyhow::Error::new(err),
    }
}
