//! XLSX writer kernel for result DataFrames and copied value grids.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use polars::prelude::{AnyValue, DataFrame};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::conf::{N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, derive_default_xlsx_formats};
use crate::spec::{
    EnumAutofitColumnsRule, EnumCellValue, SpecAutofitCellsPolicy, SpecCellFormat,
    SpecXlsxSheetWriteOptions, SpecXlsxWriteOptions, XlsxIoError,
};
use crate::util::{derive_unique_sheet_name, estimate_width_len, sanitize_sheet_name};

/// Stateful workbook writer.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    fmt_text: SpecCellFormat,
    fmt_header: SpecCellFormat,
    write_options: SpecXlsxWriteOptions,
    l_sheet_names: Vec<String>,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path and format/options presets.
    ///
    /// The workbook is buffered in memory until [`Self::close`] is called.
    pub fn new(
        path_file_out: PathBuf,
        fmt_text: SpecCellFormat,
        fmt_header: SpecCellFormat,
        write_options: SpecXlsxWriteOptions,
    ) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            fmt_text,
            fmt_header,
            write_options,
            l_sheet_names: Vec::new(),
            if_closed: false,
        }
    }

    /// Create writer with the default `text`/`header` presets.
    pub fn with_defaults(path_file_out: PathBuf) -> Self {
        let dict_fmt = derive_default_xlsx_formats();
        Self::new(
            path_file_out,
            dict_fmt.get("text").cloned().unwrap_or_default(),
            dict_fmt.get("header").cloned().unwrap_or_default(),
            SpecXlsxWriteOptions::default(),
        )
    }

    /// Output file path.
    pub fn file_out(&self) -> &Path {
        &self.path_file_out
    }

    /// Sheet names written so far, in order.
    pub fn sheet_names(&self) -> &[String] {
        &self.l_sheet_names
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), XlsxIoError> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook.save(&self.path_file_out)?;
        self.if_closed = true;
        tracing::debug!(
            path = %self.path_file_out.display(),
            cnt_sheets = self.l_sheet_names.len(),
            "workbook saved"
        );
        Ok(())
    }

    /// Write one sheet from a DataFrame; returns the actual sheet name.
    ///
    /// Column names form the header row. Values are written as text, numbers
    /// or booleans by their dtype; nulls stay blank.
    pub fn write_sheet_from_dataframe(
        &mut self,
        df_data: &DataFrame,
        sheet_name: &str,
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<String, XlsxIoError> {
        if self.if_closed {
            return Err(XlsxIoError::Closed);
        }
        validate_policy_autofit(&options.policy_autofit)?;

        let n_height_df = df_data.height();
        let n_width_df = df_data.width();
        if n_height_df + 1 > N_NROWS_EXCEL_MAX || n_width_df > N_NCOLS_EXCEL_MAX {
            return Err(XlsxIoError::InvalidInput(format!(
                "DataFrame shape {n_height_df}x{n_width_df} exceeds Excel sheet limits."
            )));
        }

        let l_colnames: Vec<String> = df_data
            .get_column_names_str()
            .into_iter()
            .map(ToString::to_string)
            .collect();

        let mut l_body_grid = vec![vec![EnumCellValue::None; n_width_df]; n_height_df];
        for (n_idx_col, col) in df_data.get_columns().iter().enumerate() {
            for (n_idx_row, l_row) in l_body_grid.iter_mut().enumerate() {
                l_row[n_idx_col] = derive_cell_value_from_any_value(col.get(n_idx_row)?);
            }
        }

        let sheet_name_unique = self.reserve_sheet_name(sheet_name);
        let fmt_header = derive_rust_xlsx_format(&self.fmt_header);
        let fmt_text = derive_rust_xlsx_format(&self.fmt_text);

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet_name_unique)?;

        for (n_idx_col, c_colname) in l_colnames.iter().enumerate() {
            worksheet.write_string_with_format(0, cast_col_num(n_idx_col)?, c_colname, &fmt_header)?;
        }
        for (n_idx_row, l_row) in l_body_grid.iter().enumerate() {
            for (n_idx_col, value) in l_row.iter().enumerate() {
                write_cell_with_format(worksheet, n_idx_row + 1, n_idx_col, value, &fmt_text)?;
            }
        }

        if options.if_freeze_header {
            worksheet.set_freeze_panes(1, 0)?;
        }

        let dict_widths = derive_autofit_widths(&l_colnames, &l_body_grid, &options.policy_autofit);
        for (n_idx_col, n_width) in dict_widths {
            worksheet.set_column_width(cast_col_num(n_idx_col)?, n_width as f64)?;
        }

        tracing::debug!(
            sheet = %sheet_name_unique,
            cnt_rows = n_height_df,
            cnt_cols = n_width_df,
            "wrote dataframe sheet"
        );
        Ok(sheet_name_unique)
    }

    /// Write one sheet from a value grid anchored at `A1`; returns the actual sheet name.
    ///
    /// Blank cells are skipped. No formatting is applied.
    pub fn write_sheet_from_grid(
        &mut self,
        grid: &[Vec<EnumCellValue>],
        sheet_name: &str,
    ) -> Result<String, XlsxIoError> {
        if self.if_closed {
            return Err(XlsxIoError::Closed);
        }
        let n_width_grid = grid.iter().map(Vec::len).max().unwrap_or(0);
        if grid.len() > N_NROWS_EXCEL_MAX || n_width_grid > N_NCOLS_EXCEL_MAX {
            return Err(XlsxIoError::InvalidInput(format!(
                "Grid shape {}x{n_width_grid} exceeds Excel sheet limits.",
                grid.len()
            )));
        }

        let sheet_name_unique = self.reserve_sheet_name(sheet_name);
        let fmt_plain = Format::new();

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet_name_unique)?;
        for (n_idx_row, l_row) in grid.iter().enumerate() {
            for (n_idx_col, value) in l_row.iter().enumerate() {
                if matches!(value, EnumCellValue::None) {
                    continue;
                }
                write_cell_with_format(worksheet, n_idx_row, n_idx_col, value, &fmt_plain)?;
            }
        }

        tracing::debug!(
            sheet = %sheet_name_unique,
            cnt_rows = grid.len(),
            cnt_cols = n_width_grid,
            "wrote grid sheet"
        );
        Ok(sheet_name_unique)
    }

    /// Sanitize `name`, make it unique among written sheets and record it.
    fn reserve_sheet_name(&mut self, name: &str) -> String {
        let c_sanitized = sanitize_sheet_name(name, &self.write_options.sheet_name_replace_to);
        let c_unique = derive_unique_sheet_name(&c_sanitized, &self.l_sheet_names);
        if c_unique != name {
            tracing::warn!(requested = %name, actual = %c_unique, "sheet renamed");
        }
        self.l_sheet_names.push(c_unique.clone());
        c_unique
    }
}

fn validate_policy_autofit(policy_autofit: &SpecAutofitCellsPolicy) -> Result<(), XlsxIoError> {
    if policy_autofit.width_cell_min == 0 {
        return Err(XlsxIoError::InvalidInput(
            "policy_autofit.width_cell_min must be >= 1.".to_string(),
        ));
    }
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min {
        return Err(XlsxIoError::InvalidInput(
            "policy_autofit.width_cell_max must be >= policy_autofit.width_cell_min.".to_string(),
        ));
    }
    Ok(())
}

/// Column index → final width, empty when autofit is disabled.
fn derive_autofit_widths(
    l_colnames: &[String],
    l_body_grid: &[Vec<EnumCellValue>],
    policy: &SpecAutofitCellsPolicy,
) -> BTreeMap<usize, usize> {
    let mut dict_widths = BTreeMap::new();
    if matches!(policy.rule_columns, EnumAutofitColumnsRule::None) {
        return dict_widths;
    }

    let n_rows_inspected = policy
        .height_body_inferred_max
        .map_or(l_body_grid.len(), |n_max| usize::min(n_max, l_body_grid.len()));
    let n_min = usize::max(1, policy.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy.width_cell_max));

    for (n_idx_col, c_colname) in l_colnames.iter().enumerate() {
        let n_width_header = estimate_width_len(&EnumCellValue::String(c_colname.clone()));
        let n_width_body = l_body_grid
            .iter()
            .take(n_rows_inspected)
            .filter_map(|l_row| l_row.get(n_idx_col))
            .map(estimate_width_len)
            .max()
            .unwrap_or(0);
        let n_width_recorded = match policy.rule_columns {
            EnumAutofitColumnsRule::Header => n_width_header,
            EnumAutofitColumnsRule::Body => n_width_body,
            EnumAutofitColumnsRule::All | EnumAutofitColumnsRule::None => {
                usize::max(n_width_header, n_width_body)
            }
        };
        dict_widths.insert(
            n_idx_col,
            usize::min(
                n_max,
                usize::max(n_min, n_width_recorded + policy.width_cell_padding),
            ),
        );
    }
    dict_widths
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), XlsxIoError> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean_with_format(n_row, n_col, *val, format)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if spec.border.unwrap_or(false) {
        format = format.set_border(FormatBorder::Thin);
    }

    format
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, XlsxIoError> {
    u32::try_from(value)
        .map_err(|_| XlsxIoError::InvalidInput(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, XlsxIoError> {
    u16::try_from(value)
        .map_err(|_| XlsxIoError::InvalidInput(format!("column index overflow: {value}")))
}
