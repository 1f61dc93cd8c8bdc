//! `codekit_alloc` v1:
//! Gap-filling code allocation kernel.
//!
//! Layout:
//! - `conf`   : code-shape constants
//! - `spec`   : digit-width model and errors
//! - `util`   : code validation, splitting and formatting
//! - `index`  : per-prefix used-number index
//! - `alloc`  : one-shot and batch allocation
//! - `report` : per-batch allocation report
pub mod alloc;
pub mod conf;
pub mod index;
pub mod report;
pub mod spec;
pub mod util;

pub use alloc::{
    allocate_batch, allocate_batch_with_report, allocate_next, allocate_one, build_index,
    merge_allocated_codes,
};
pub use conf::{N_CODE_NUMBER_FIRST, N_LEN_CODE_PREFIX, TUP_DIGIT_WIDTHS};
pub use index::{PrefixIndex, SpecPrefixEntry};
pub use report::ReportAllocation;
pub use spec::{DigitWidthError, EnumDigitWidth};
pub use util::{
    derive_request_prefix, format_code, is_valid_code, is_valid_code_any_width, split_code,
};
