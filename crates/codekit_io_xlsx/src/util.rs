//! Stateless helper utilities for column letters, sheet names and widths.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::{EnumCellValue, XlsxIoError};

////////////////////////////////////////////////////////////////////////////////
// #region ColumnLetters

/// Convert a column letter (`A`, `z`, `AA`, ...) to its 1-based index.
///
/// Surrounding whitespace is ignored and letters are case-insensitive.
pub fn column_letter_to_index(letter: &str) -> Result<usize, XlsxIoError> {
    let c_letter = letter.trim();
    if c_letter.is_empty() || !c_letter.chars().all(|chr| chr.is_ascii_alphabetic()) {
        return Err(XlsxIoError::InvalidColumn(letter.to_string()));
    }

    let mut n_index = 0usize;
    for chr in c_letter.chars() {
        let n_digit = (chr.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n_index = n_index * 26 + n_digit;
        if n_index > N_NCOLS_EXCEL_MAX {
            return Err(XlsxIoError::InvalidColumn(letter.to_string()));
        }
    }
    Ok(n_index)
}

/// Convert a 1-based column index to its letter (`1` → `A`, `27` → `AA`).
pub fn column_index_to_letter(index: usize) -> Result<String, XlsxIoError> {
    if index == 0 || index > N_NCOLS_EXCEL_MAX {
        return Err(XlsxIoError::InvalidColumn(index.to_string()));
    }

    let mut l_chars = Vec::new();
    let mut n_rest = index;
    while n_rest > 0 {
        let n_digit = (n_rest - 1) % 26;
        l_chars.push((b'A' + n_digit as u8) as char);
        n_rest = (n_rest - 1) / 26;
    }
    Ok(l_chars.into_iter().rev().collect())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().trim_matches('\'').trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Pick a sheet name not yet in `existing`, appending `1`, `2`, ... when taken.
///
/// Comparison is case-insensitive, as in Excel. The base is shortened so the
/// suffixed name stays within the sheet-name length cap.
pub fn derive_unique_sheet_name<S: AsRef<str>>(name: &str, existing: &[S]) -> String {
    let set_names_lower: BTreeSet<String> = existing
        .iter()
        .map(|c_name| c_name.as_ref().to_lowercase())
        .collect();
    if !set_names_lower.contains(&name.to_lowercase()) {
        return name.to_string();
    }

    let mut n_counter = 1usize;
    loop {
        let c_suffix = n_counter.to_string();
        let n_len_base_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_suffix.len());
        let c_base: String = name.chars().take(usize::max(1, n_len_base_max)).collect();
        let c_candidate = format!("{c_base}{c_suffix}");
        if !set_names_lower.contains(&c_candidate.to_lowercase()) {
            return c_candidate;
        }
        n_counter += 1;
    }
}

/// Default output path: `<tags stem>_codes.xlsx` next to the tags workbook.
pub fn derive_default_output_path(path_tags: &Path) -> PathBuf {
    let c_stem = path_tags
        .file_stem()
        .map_or_else(|| "tags".into(), |stem| stem.to_string_lossy());
    path_tags.with_file_name(format!("{c_stem}_codes.xlsx"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WidthEstimation

/// Estimate displayed width units for one cell value.
///
/// Used by autofit inference logic.
pub fn estimate_width_len(value: &EnumCellValue) -> usize {
    match value {
        EnumCellValue::None => 0,
        EnumCellValue::String(s) => estimate_unicode_string_width(s),
        EnumCellValue::Number(n) => estimate_unicode_string_width(&n.to_string()),
        EnumCellValue::Boolean(_) => 5,
    }
}

fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
