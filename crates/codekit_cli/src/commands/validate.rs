//! Validate command implementation.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;

use codekit_alloc::{EnumDigitWidth, is_valid_code, is_valid_code_any_width};
use codekit_io_xlsx::{EnumSourceRole, read_known_codes};

use super::{ValidateArgs, derive_cli_error};
use crate::config::Config;

/// Counts over one known-codes table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportValidation {
    /// Non-blank text entries seen.
    pub cnt_entries: u64,
    /// Entries valid at 3 digits.
    pub cnt_valid_3: u64,
    /// Entries valid at 4 digits.
    pub cnt_valid_4: u64,
    /// Entries valid at neither width.
    pub l_invalid: Vec<String>,
    /// Codes present more than once, with their count.
    pub dict_duplicates: BTreeMap<String, u64>,
}

impl ReportValidation {
    /// Summarize `known_codes`.
    pub fn from_known_codes(known_codes: &[Option<String>]) -> Self {
        let mut report = Self::default();
        let mut dict_counts: BTreeMap<&str, u64> = BTreeMap::new();

        for c_code in known_codes.iter().flatten() {
            report.cnt_entries += 1;
            if !is_valid_code_any_width(c_code) {
                report.l_invalid.push(c_code.clone());
                continue;
            }
            if is_valid_code(c_code, EnumDigitWidth::Three) {
                report.cnt_valid_3 += 1;
            } else {
                report.cnt_valid_4 += 1;
            }
            *dict_counts.entry(c_code.as_str()).or_default() += 1;
        }

        report.dict_duplicates = dict_counts
            .into_iter()
            .filter(|(_, n_count)| *n_count > 1)
            .map(|(c_code, n_count)| (c_code.to_string(), n_count))
            .collect();
        report
    }

    /// `true` when nothing is malformed or repeated.
    pub fn is_clean(&self) -> bool {
        self.l_invalid.is_empty() && self.dict_duplicates.is_empty()
    }
}

impl fmt::Display for ReportValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[VALIDATE] entries={} valid_3={} valid_4={} invalid={} duplicates={}",
            self.cnt_entries,
            self.cnt_valid_3,
            self.cnt_valid_4,
            self.l_invalid.len(),
            self.dict_duplicates.len()
        )
    }
}

/// Run the validate command.
pub fn run(args: ValidateArgs, config: &Config) -> Result<()> {
    let source = args.base.known_codes_source(config);
    let l_known_codes = read_known_codes(&args.base.base, &source)
        .map_err(|err| derive_cli_error(err.in_source(EnumSourceRole::KnownCodes)))?;

    let report = ReportValidation::from_known_codes(&l_known_codes);
    println!("{report}");
    for c_code in &report.l_invalid {
        println!("invalid\t{c_code:?}");
    }
    for (c_code, n_count) in &report.dict_duplicates {
        println!("duplicate\t{c_code}\tx{n_count}");
    }
    Ok(())
}
