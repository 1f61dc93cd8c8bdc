//! Calamine-backed readers for known codes, tags and whole sheets.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};

use crate::spec::{EnumCellValue, SpecKnownCodesSource, SpecTagSource, XlsxIoError};
use crate::util::column_letter_to_index;

////////////////////////////////////////////////////////////////////////////////
// #region WorkbookAccess

fn open_workbook(path: &Path) -> Result<Sheets<BufReader<File>>, XlsxIoError> {
    open_workbook_auto(path).map_err(|err| XlsxIoError::Open {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn read_sheet_range(
    workbook: &mut Sheets<BufReader<File>>,
    path: &Path,
    sheet_name: &str,
) -> Result<Range<Data>, XlsxIoError> {
    let l_sheet_names = workbook.sheet_names();
    if !l_sheet_names.iter().any(|c_name| c_name == sheet_name) {
        return Err(XlsxIoError::SheetNotFound {
            path: path.to_path_buf(),
            sheet: sheet_name.to_string(),
            available: l_sheet_names,
        });
    }
    workbook
        .worksheet_range(sheet_name)
        .map_err(|err| XlsxIoError::Open {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

/// Return sheet names in workbook order.
pub fn read_sheet_names(path: &Path) -> Result<Vec<String>, XlsxIoError> {
    Ok(open_workbook(path)?.sheet_names())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellConversion

fn derive_cell_value_from_data(value: &Data) -> EnumCellValue {
    match value {
        Data::Empty => EnumCellValue::None,
        Data::String(val) => EnumCellValue::String(val.clone()),
        Data::Float(val) => EnumCellValue::Number(*val),
        Data::Int(val) => EnumCellValue::Number(*val as f64),
        Data::Bool(val) => EnumCellValue::Boolean(*val),
        Data::DateTime(val) => EnumCellValue::Number(val.as_f64()),
        other => EnumCellValue::String(other.to_string()),
    }
}

/// Non-empty text content of a cell; every other cell kind is absent.
fn derive_text_from_data(value: Option<&Data>) -> Option<String> {
    match value {
        Some(Data::String(val)) if !val.is_empty() => Some(val.clone()),
        _ => None,
    }
}

/// Read one column from `n_row_start` (0-based) down to the last used row.
fn read_column_text(range: &Range<Data>, n_col: u32, n_row_start: u32) -> Vec<Option<String>> {
    let Some((n_row_end, _)) = range.end() else {
        return vec![];
    };
    (n_row_start..=n_row_end)
        .map(|n_row| derive_text_from_data(range.get_value((n_row, n_col))))
        .collect()
}

fn derive_row_start_0based(row_start: usize) -> Result<u32, XlsxIoError> {
    if row_start == 0 {
        return Err(XlsxIoError::InvalidRow(row_start));
    }
    u32::try_from(row_start - 1).map_err(|_| XlsxIoError::InvalidRow(row_start))
}

fn derive_col_0based(letter: &str) -> Result<u32, XlsxIoError> {
    let n_col = column_letter_to_index(letter)?;
    u32::try_from(n_col - 1).map_err(|_| XlsxIoError::InvalidColumn(letter.to_string()))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Readers

/// Read candidate codes from `source`.
///
/// Columns are read top to bottom, one after another, in the order given.
/// Only text cells become values; every other cell is `None`.
pub fn read_known_codes(
    path: &Path,
    source: &SpecKnownCodesSource,
) -> Result<Vec<Option<String>>, XlsxIoError> {
    let n_row_start = derive_row_start_0based(source.row_start)?;
    let l_cols = source
        .cols
        .iter()
        .map(|c_col| derive_col_0based(c_col))
        .collect::<Result<Vec<_>, _>>()?;

    let mut workbook = open_workbook(path)?;
    let range = read_sheet_range(&mut workbook, path, &source.sheet_name)?;

    let mut l_codes = Vec::new();
    for n_col in l_cols {
        l_codes.extend(read_column_text(&range, n_col, n_row_start));
    }

    tracing::debug!(
        path = %path.display(),
        sheet = %source.sheet_name,
        cnt_cells = l_codes.len(),
        cnt_text = l_codes.iter().flatten().count(),
        "read known codes"
    );
    Ok(l_codes)
}

/// Read tags from `source`, one entry per row, blanks kept in place.
pub fn read_tags(path: &Path, source: &SpecTagSource) -> Result<Vec<Option<String>>, XlsxIoError> {
    let n_row_start = derive_row_start_0based(source.row_start)?;
    let n_col = derive_col_0based(&source.col)?;

    let mut workbook = open_workbook(path)?;
    let range = read_sheet_range(&mut workbook, path, &source.sheet_name)?;
    let l_tags = read_column_text(&range, n_col, n_row_start);

    tracing::debug!(
        path = %path.display(),
        sheet = %source.sheet_name,
        cnt_rows = l_tags.len(),
        "read tags"
    );
    Ok(l_tags)
}

fn derive_grid_from_range(range: &Range<Data>) -> Vec<Vec<EnumCellValue>> {
    let Some((n_row_end, n_col_end)) = range.end() else {
        return vec![];
    };
    (0..=n_row_end)
        .map(|n_row| {
            (0..=n_col_end)
                .map(|n_col| {
                    range
                        .get_value((n_row, n_col))
                        .map_or(EnumCellValue::None, derive_cell_value_from_data)
                })
                .collect()
        })
        .collect()
}

/// Read a whole sheet as a value grid anchored at `A1`.
pub fn read_sheet_grid(
    path: &Path,
    sheet_name: &str,
) -> Result<Vec<Vec<EnumCellValue>>, XlsxIoError> {
    let mut workbook = open_workbook(path)?;
    let range = read_sheet_range(&mut workbook, path, sheet_name)?;
    Ok(derive_grid_from_range(&range))
}

/// Read every sheet of a workbook as `(name, grid)` pairs, in workbook order.
pub fn read_workbook_grids(
    path: &Path,
) -> Result<Vec<(String, Vec<Vec<EnumCellValue>>)>, XlsxIoError> {
    let mut workbook = open_workbook(path)?;
    let mut l_sheets = Vec::new();
    for c_sheet_name in workbook.sheet_names() {
        let range = read_sheet_range(&mut workbook, path, &c_sheet_name)?;
        l_sheets.push((c_sheet_name, derive_grid_from_range(&range)));
    }
    Ok(l_sheets)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn derive_range() -> Range<Data> {
        let mut range = Range::new((0, 0), (3, 1));
        range.set_value((0, 0), Data::String("Codigo".to_string()));
        range.set_value((1, 0), Data::String("ABC0001".to_string()));
        range.set_value((2, 0), Data::Float(12.0));
        range.set_value((3, 0), Data::String(String::new()));
        range.set_value((1, 1), Data::String("XYZ0001".to_string()));
        range.set_value((3, 1), Data::Bool(true));
        range
    }

    #[test]
    fn test_read_column_text_keeps_only_text_cells() {
        let range = derive_range();
        assert_eq!(
            read_column_text(&range, 0, 1),
            vec![Some("ABC0001".to_string()), None, None]
        );
        assert_eq!(
            read_column_text(&range, 1, 0),
            vec![None, Some("XYZ0001".to_string()), None, None]
        );
        assert_eq!(read_column_text(&range, 5, 0), vec![None, None, None, None]);
        assert!(read_column_text(&range, 0, 9).is_empty());
    }

    #[test]
    fn test_derive_grid_from_range_converts_values() {
        let l_grid = derive_grid_from_range(&derive_range());
        assert_eq!(l_grid.len(), 4);
        assert_eq!(l_grid[0][0], EnumCellValue::String("Codigo".to_string()));
        assert_eq!(l_grid[0][1], EnumCellValue::None);
        assert_eq!(l_grid[2][0], EnumCellValue::Number(12.0));
        assert_eq!(l_grid[3][1], EnumCellValue::Boolean(true));
    }

    #[test]
    fn test_row_start_must_be_1based() {
        assert!(matches!(
            derive_row_start_0based(0),
            Err(XlsxIoError::InvalidRow(0))
        ));
        assert_eq!(derive_row_start_0based(2).ok(), Some(1));
    }
}
