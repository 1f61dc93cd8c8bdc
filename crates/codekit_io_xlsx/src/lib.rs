//! `codekit_io_xlsx` v1:
//! XLSX glue around the `codekit_alloc` kernel.
//!
//! Layout:
//! - `conf`   : Excel limits, default sheet/column names and format presets
//! - `spec`   : sources, options, reports and errors
//! - `util`   : column-letter arithmetic, sheet-name and path helpers
//! - `reader` : calamine-backed readers for known codes and tags
//! - `writer` : rust_xlsxwriter-backed workbook writer
//! - `job`    : end-to-end allocation job
pub mod conf;
pub mod job;
pub mod reader;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_HEADER_CODE_DEFAULT, C_HEADER_TAG_DEFAULT, C_SHEET_BASE_DEFAULT, C_SHEET_RESULT_DEFAULT,
    C_SHEET_TAGS_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL, derive_default_xlsx_formats,
};
pub use job::{derive_result_dataframe, run_allocation_job};
pub use reader::{
    read_known_codes, read_sheet_grid, read_sheet_names, read_tags, read_workbook_grids,
};
pub use spec::{
    EnumAutofitColumnsRule, EnumCellValue, EnumSourceRole, ReportAllocationJob, SpecAllocationJob,
    SpecAutofitCellsPolicy, SpecCellFormat, SpecKnownCodesSource, SpecResultSheetOptions,
    SpecTagSource, SpecXlsxSheetWriteOptions, SpecXlsxWriteOptions, XlsxIoError,
};
pub use util::{
    column_index_to_letter, column_letter_to_index, derive_default_output_path,
    derive_unique_sheet_name, sanitize_sheet_name,
};
pub use writer::XlsxWriter;
