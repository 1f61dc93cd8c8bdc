//! Shared XLSX specification models.

use std::fmt;
use std::path::PathBuf;

use codekit_alloc::{DigitWidthError, EnumDigitWidth, ReportAllocation};

use crate::conf::{
    C_COL_TAGS_DEFAULT, C_HEADER_CODE_DEFAULT, C_HEADER_TAG_DEFAULT, C_SHEET_BASE_DEFAULT,
    C_SHEET_RESULT_DEFAULT, C_SHEET_TAGS_DEFAULT, N_ROW_BASE_START_DEFAULT,
    N_ROW_TAGS_START_DEFAULT, TUP_COLS_BASE_DEFAULT,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Horizontal alignment.
    pub align: Option<String>,
    /// Thin border on all sides.
    pub border: Option<bool>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            border: other.border.or(self.border),
        }
    }
}

/// Normalized cell value read from or written to a sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SourceSpecification

/// Which input a read belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumSourceRole {
    /// Workbook with already-issued codes.
    KnownCodes,
    /// Workbook with tags needing codes.
    Tags,
}

impl fmt::Display for EnumSourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KnownCodes => write!(f, "known codes"),
            Self::Tags => write!(f, "tags"),
        }
    }
}

/// Where the already-issued codes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecKnownCodesSource {
    /// Sheet name.
    pub sheet_name: String,
    /// Column letters, read in order.
    pub cols: Vec<String>,
    /// First data row (1-based).
    pub row_start: usize,
}

impl Default for SpecKnownCodesSource {
    fn default() -> Self {
        Self {
            sheet_name: C_SHEET_BASE_DEFAULT.to_string(),
            cols: TUP_COLS_BASE_DEFAULT.iter().map(ToString::to_string).collect(),
            row_start: N_ROW_BASE_START_DEFAULT,
        }
    }
}

/// Where the tags needing codes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTagSource {
    /// Sheet name.
    pub sheet_name: String,
    /// Column letter.
    pub col: String,
    /// First row read (1-based).
    pub row_start: usize,
}

impl Default for SpecTagSource {
    fn default() -> Self {
        Self {
            sheet_name: C_SHEET_TAGS_DEFAULT.to_string(),
            col: C_COL_TAGS_DEFAULT.to_string(),
            row_start: N_ROW_TAGS_START_DEFAULT,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Autofit rule for column width inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAutofitColumnsRule {
    /// Disable autofit.
    None,
    /// Infer width from header cells only.
    Header,
    /// Infer width from body cells only.
    Body,
    /// Infer width from both header and body cells (default).
    #[default]
    All,
}

/// Autofit policy for one written sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Autofit width inference rule.
    pub rule_columns: EnumAutofitColumnsRule,
    /// Max body rows inspected when body-based inference is active.
    pub height_body_inferred_max: Option<usize>,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            rule_columns: EnumAutofitColumnsRule::All,
            height_body_inferred_max: Some(20_000),
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Writer-level options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    /// Replacement for illegal sheet-name characters.
    pub sheet_name_replace_to: String,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            sheet_name_replace_to: "_".to_string(),
        }
    }
}

/// Per-sheet options for DataFrame sheets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxSheetWriteOptions {
    /// Freeze the header row.
    pub if_freeze_header: bool,
    /// Column autofit policy.
    pub policy_autofit: SpecAutofitCellsPolicy,
}

impl Default for SpecXlsxSheetWriteOptions {
    fn default() -> Self {
        Self {
            if_freeze_header: true,
            policy_autofit: SpecAutofitCellsPolicy::default(),
        }
    }
}

/// Options for the result sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecResultSheetOptions {
    /// Requested sheet name; a counter is appended when taken.
    pub sheet_name: String,
    /// Header of the tag column.
    pub header_tag: String,
    /// Header of the code column.
    pub header_code: String,
    /// Layout options of the written sheet.
    pub sheet_options: SpecXlsxSheetWriteOptions,
}

impl Default for SpecResultSheetOptions {
    fn default() -> Self {
        Self {
            sheet_name: C_SHEET_RESULT_DEFAULT.to_string(),
            header_tag: C_HEADER_TAG_DEFAULT.to_string(),
            header_code: C_HEADER_CODE_DEFAULT.to_string(),
            sheet_options: SpecXlsxSheetWriteOptions::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region JobSpecification

/// One end-to-end allocation run over workbooks on disk.
#[derive(Debug, Clone)]
pub struct SpecAllocationJob {
    /// Workbook with already-issued codes.
    pub path_file_base: PathBuf,
    /// Workbook with tags needing codes.
    pub path_file_tags: PathBuf,
    /// Output workbook; may equal `path_file_tags` to replace it.
    pub path_file_out: PathBuf,
    /// Suffix width for this session.
    pub digit_width: EnumDigitWidth,
    /// Known-codes location.
    pub source_base: SpecKnownCodesSource,
    /// Tags location.
    pub source_tags: SpecTagSource,
    /// Result sheet options.
    pub result_sheet: SpecResultSheetOptions,
    /// Carry every sheet of the tags workbook into the output (values only).
    pub if_copy_tag_sheets: bool,
}

impl SpecAllocationJob {
    /// Job with default sources and options.
    pub fn new(path_file_base: PathBuf, path_file_tags: PathBuf, path_file_out: PathBuf) -> Self {
        Self {
            path_file_base,
            path_file_tags,
            path_file_out,
            digit_width: EnumDigitWidth::default(),
            source_base: SpecKnownCodesSource::default(),
            source_tags: SpecTagSource::default(),
            result_sheet: SpecResultSheetOptions::default(),
            if_copy_tag_sheets: true,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Outcome of [`crate::job::run_allocation_job`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportAllocationJob {
    /// Written workbook.
    pub path_file_out: PathBuf,
    /// Actual result sheet name after collision handling.
    pub sheet_name_result: String,
    /// Known-code cells read (non-blank).
    pub cnt_known_codes: u64,
    /// Sheets carried over from the tags workbook.
    pub cnt_sheets_copied: u64,
    /// Allocation counters.
    pub allocation: ReportAllocation,
    /// Tags paired with their new codes, in row order.
    pub rows: Vec<(Option<String>, Option<String>)>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Errors raised by XLSX reading, writing and jobs.
#[derive(Debug, thiserror::Error)]
pub enum XlsxIoError {
    /// Workbook could not be opened or parsed.
    #[error("Failed to open workbook {}: {message}", path.display())]
    Open {
        /// Workbook path.
        path: PathBuf,
        /// Underlying reader error text.
        message: String,
    },
    /// Requested sheet is missing.
    #[error(
        "Sheet {sheet:?} not found in {} (available: {})",
        path.display(),
        available.join(", ")
    )]
    SheetNotFound {
        /// Workbook path.
        path: PathBuf,
        /// Missing sheet name.
        sheet: String,
        /// Sheets present in the workbook.
        available: Vec<String>,
    },
    /// Column letter is not `A`..`XFD`.
    #[error("Invalid column {0:?}: expected letters A..XFD")]
    InvalidColumn(String),
    /// Row number is not 1-based.
    #[error("Invalid start row {0}: rows are 1-based")]
    InvalidRow(usize),
    /// DataFrame construction or access failed.
    #[error("DataFrame error: {0}")]
    Frame(#[from] polars::error::PolarsError),
    /// Workbook writing failed.
    #[error("xlsx write error: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
    /// Invalid writer input.
    #[error("{0}")]
    InvalidInput(String),
    /// Writer already closed.
    #[error("Cannot write after close().")]
    Closed,
    /// Digit width outside 3 or 4.
    #[error(transparent)]
    DigitWidth(#[from] DigitWidthError),
    /// Failure while reading one of the job inputs.
    #[error("Reading {role}: {inner}")]
    Source {
        /// Input that failed.
        role: EnumSourceRole,
        /// Underlying failure.
        inner: Box<XlsxIoError>,
    },
}

impl XlsxIoError {
    /// Tag `self` with the input it came from; already-tagged errors are kept.
    pub fn in_source(self, role: EnumSourceRole) -> Self {
        match self {
            Self::Source { .. } => self,
            other => Self::Source {
                role,
                inner: Box::new(other),
            },
        }
    }

    /// Input role, when tagged.
    pub fn role(&self) -> Option<EnumSourceRole> {
        match self {
            Self::Source { role, .. } => Some(*role),
            _ => None,
        }
    }

    /// Innermost error, past any role tag.
    pub fn root(&self) -> &XlsxIoError {
        match self {
            Self::Source { inner, .. } => inner.root(),
            other => other,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
