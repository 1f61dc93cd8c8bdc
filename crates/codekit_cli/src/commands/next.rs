//! Next command implementation.

use anyhow::Result;

use codekit_alloc::{PrefixIndex, build_index};
use codekit_io_xlsx::{EnumSourceRole, read_known_codes};

use super::{NextArgs, derive_cli_error};
use crate::config::Config;

/// Next codes for `prefixes`, in order, as if each were issued in turn.
///
/// `None` marks a prefix too short to allocate.
pub fn derive_next_codes(prefixes: &[String], index: &mut PrefixIndex) -> Vec<Option<String>> {
    prefixes
        .iter()
        .map(|c_prefix| index.allocate_next(Some(c_prefix.as_str())))
        .collect()
}

/// Run the next command. Nothing is written.
pub fn run(args: NextArgs, config: &Config) -> Result<()> {
    let digit_width = args.digits.digit_width(config)?;
    let source = args.base.known_codes_source(config);

    let l_known_codes = read_known_codes(&args.base.base, &source)
        .map_err(|err| derive_cli_error(err.in_source(EnumSourceRole::KnownCodes)))?;
    let mut index = build_index(l_known_codes.iter().map(Option::as_deref), digit_width);

    for (c_prefix, code) in args
        .prefixes
        .iter()
        .zip(derive_next_codes(&args.prefixes, &mut index))
    {
        match code {
            Some(c_code) => println!("{c_prefix}\t{c_code}"),
            None => println!("{c_prefix}\t(skipped: needs at least 3 characters)"),
        }
    }
    Ok(())
}
