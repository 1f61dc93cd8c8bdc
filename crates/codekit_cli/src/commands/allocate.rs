//! Allocate command implementation.

use anyhow::Result;

use codekit_io_xlsx::{SpecAllocationJob, derive_default_output_path, run_allocation_job};

use super::{AllocateArgs, derive_cli_error};
use crate::config::Config;

/// Build the job from flags over `config`.
pub fn derive_job(args: &AllocateArgs, config: &Config) -> Result<SpecAllocationJob> {
    let path_file_out = args
        .output
        .clone()
        .unwrap_or_else(|| derive_default_output_path(&args.tags));

    let mut job = SpecAllocationJob::new(args.base.base.clone(), args.tags.clone(), path_file_out);
    job.digit_width = args.digits.digit_width(config)?;
    job.source_base = args.base.known_codes_source(config);

    job.source_tags = config.tag_source();
    if let Some(val) = &args.tags_sheet {
        job.source_tags.sheet_name = val.clone();
    }
    if let Some(val) = &args.tags_column {
        job.source_tags.col = val.clone();
    }

    job.result_sheet = config.result_sheet_options();
    if let Some(val) = &args.result_sheet {
        job.result_sheet.sheet_name = val.clone();
    }
    job.if_copy_tag_sheets = config.output.copy_tag_sheets && !args.no_copy_sheets;
    Ok(job)
}

/// Run the allocate command.
pub fn run(args: AllocateArgs, config: &Config) -> Result<()> {
    let job = derive_job(&args, config)?;
    tracing::debug!(?job, "allocation job");

    let report = run_allocation_job(&job).map_err(derive_cli_error)?;

    for c_warning in &report.allocation.warnings {
        eprintln!("warning: {c_warning}");
    }
    println!("{}", report.allocation);
    println!(
        "Wrote sheet {:?} to {} ({} known codes read)",
        report.sheet_name_result,
        report.path_file_out.display(),
        report.cnt_known_codes
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::*;
    use crate::commands::{Cli, Command};
    use codekit_alloc::EnumDigitWidth;

    fn parse_allocate(l_args: &[&str]) -> AllocateArgs {
        let cli = Cli::try_parse_from(l_args.iter().copied()).unwrap();
        match cli.command {
            Command::Allocate(args) => args,
            _ => panic!("expected allocate command"),
        }
    }

    #[test]
    fn job_takes_config_then_flags() {
        let mut config = Config::default();
        config.allocation.digit_width = 3;
        config.tags.sheet = "Tags".to_string();
        config.output.result_sheet = "Out".to_string();

        let args = parse_allocate(&["codekit", "allocate", "--base", "b.xlsx", "--tags", "t.xlsx"]);
        let job = derive_job(&args, &config).unwrap();
        assert_eq!(job.digit_width, EnumDigitWidth::Three);
        assert_eq!(job.source_tags.sheet_name, "Tags");
        assert_eq!(job.result_sheet.sheet_name, "Out");
        assert_eq!(job.path_file_out, PathBuf::from("t_codes.xlsx"));
        assert!(job.if_copy_tag_sheets);

        let args = parse_allocate(&[
            "codekit",
            "allocate",
            "--base",
            "b.xlsx",
            "--tags",
            "t.xlsx",
            "--output",
            "t.xlsx",
            "--digits",
            "4",
            "--tags-sheet",
            "SIGLAS",
            "--tags-column",
            "B",
            "--result-sheet",
            "R",
            "--no-copy-sheets",
        ]);
        let job = derive_job(&args, &config).unwrap();
        assert_eq!(job.digit_width, EnumDigitWidth::Four);
        assert_eq!(job.source_tags.sheet_name, "SIGLAS");
        assert_eq!(job.source_tags.col, "B");
        assert_eq!(job.result_sheet.sheet_name, "R");
        assert_eq!(job.path_file_out, PathBuf::from("t.xlsx"));
        assert!(!job.if_copy_tag_sheets);
    }
}
