//! Stateless helpers for code validation, splitting and formatting.

use crate::conf::{N_LEN_CODE_PREFIX, TUP_DIGIT_WIDTHS};
use crate::spec::EnumDigitWidth;

/// Return `true` iff `code` is a 3-letter prefix followed by exactly
/// `digit_width` decimal digits.
///
/// Lengths are counted in characters. Letters follow Unicode `Alphabetic`;
/// digits must be ASCII `0-9`.
pub fn is_valid_code(code: &str, digit_width: EnumDigitWidth) -> bool {
    is_valid_code_with_digits(code, digit_width.n_digits())
}

/// Return `true` iff `code` is valid under any supported digit width.
pub fn is_valid_code_any_width(code: &str) -> bool {
    TUP_DIGIT_WIDTHS
        .iter()
        .any(|n_digits| is_valid_code_with_digits(code, *n_digits))
}

fn is_valid_code_with_digits(code: &str, n_digits: usize) -> bool {
    if code.chars().count() != N_LEN_CODE_PREFIX + n_digits {
        return false;
    }
    code.chars().take(N_LEN_CODE_PREFIX).all(char::is_alphabetic)
        && code
            .chars()
            .skip(N_LEN_CODE_PREFIX)
            .all(|chr| chr.is_ascii_digit())
}

/// Split a valid code into `(prefix, number)`; `None` when invalid at `digit_width`.
pub fn split_code(code: &str, digit_width: EnumDigitWidth) -> Option<(&str, u64)> {
    if !is_valid_code(code, digit_width) {
        return None;
    }
    let n_idx_split = derive_prefix_byte_end(code)?;
    let (c_prefix, c_suffix) = code.split_at(n_idx_split);
    c_suffix.parse::<u64>().ok().map(|n| (c_prefix, n))
}

/// Derive the request prefix from a raw tag.
///
/// Absent, blank and shorter-than-3-character tags yield `None`; otherwise
/// the first 3 characters are returned as supplied.
pub fn derive_request_prefix(tag: Option<&str>) -> Option<&str> {
    let c_tag = tag?;
    if c_tag.trim().is_empty() {
        return None;
    }
    let n_idx_end = derive_prefix_byte_end(c_tag)?;
    Some(&c_tag[..n_idx_end])
}

/// Format `prefix` + zero-padded `number`.
///
/// Numbers wider than `digit_width` are written in full.
pub fn format_code(prefix: &str, number: u64, digit_width: EnumDigitWidth) -> String {
    format!("{prefix}{number:0n_width$}", n_width = digit_width.n_digits())
}

/// Byte offset just past the third character, or `None` if shorter.
fn derive_prefix_byte_end(s: &str) -> Option<usize> {
    s.char_indices()
        .map(|(n_idx, chr)| n_idx + chr.len_utf8())
        .nth(N_LEN_CODE_PREFIX - 1)
}
