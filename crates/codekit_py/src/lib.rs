use std::path::PathBuf;

use codekit_alloc::{
    DigitWidthError, EnumDigitWidth, PrefixIndex as RsPrefixIndex, allocate_batch, allocate_one,
    is_valid_code as rs_is_valid_code,
};
use codekit_io_xlsx::{
    EnumAutofitColumnsRule, SpecAllocationJob, XlsxIoError as RsXlsxIoError,
    derive_default_output_path, run_allocation_job as rs_run_allocation_job,
};
use pyo3::create_exception;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyAny, PyDict};

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "codekit.alloc.v1";

create_exception!(
    _codekit_rs,
    XlsxIoError,
    PyRuntimeError,
    "Workbook read/write failure."
);

#[pyclass(name = "PrefixIndex")]
struct PyPrefixIndex {
    inner: RsPrefixIndex,
}

#[pymethods]
impl PyPrefixIndex {
    #[new]
    #[pyo3(signature = (known_codes = None, digit_width = 4))]
    fn new(known_codes: Option<&Bound<'_, PyAny>>, digit_width: usize) -> PyResult<Self> {
        let digit_width = parse_digit_width(digit_width)?;
        let l_known_codes = match known_codes {
            Some(obj) => extract_optional_strings(obj)?,
            None => Vec::new(),
        };
        Ok(Self {
            inner: RsPrefixIndex::from_known_codes(
                l_known_codes.iter().map(Option::as_deref),
                digit_width,
            ),
        })
    }

    #[getter]
    fn digit_width(&self) -> usize {
        self.inner.digit_width().n_digits()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    /// Reserve and return the next code; `None` for absent or short tags.
    fn allocate_next(&mut self, tag: &Bound<'_, PyAny>) -> Option<String> {
        let c_tag = extract_optional_string(tag);
        self.inner.allocate_next(c_tag.as_deref())
    }

    /// Next number `prefix` would receive, without reserving it.
    fn peek_next(&self, prefix: &str) -> u64 {
        self.inner.peek_next(prefix)
    }

    /// Register an externally issued code; `True` if it was new.
    fn insert_code(&mut self, code: &str) -> bool {
        self.inner.insert_code(code)
    }

    /// Sorted used numbers under `prefix`.
    fn used(&self, prefix: &str) -> Vec<u64> {
        self.inner
            .used(prefix)
            .map(|set_used| set_used.iter().copied().collect())
            .unwrap_or_default()
    }

    fn __repr__(&self) -> String {
        format!(
            "PrefixIndex(digit_width={}, prefixes={})",
            self.inner.digit_width(),
            self.inner.len()
        )
    }
}

/// `False` for anything that is not a well-formed code, including non-`str`.
#[pyfunction]
#[pyo3(signature = (code, digit_width = 4))]
fn is_valid_code(code: &Bound<'_, PyAny>, digit_width: usize) -> PyResult<bool> {
    let digit_width = parse_digit_width(digit_width)?;
    Ok(extract_optional_string(code)
        .is_some_and(|c_code| rs_is_valid_code(&c_code, digit_width)))
}

#[pyfunction]
#[pyo3(name = "allocate_batch", signature = (tags, known_codes, digit_width = 4))]
fn py_allocate_batch(
    tags: &Bound<'_, PyAny>,
    known_codes: &Bound<'_, PyAny>,
    digit_width: usize,
) -> PyResult<Vec<Option<String>>> {
    let digit_width = parse_digit_width(digit_width)?;
    let l_tags = extract_optional_strings(tags)?;
    let l_known_codes = extract_optional_strings(known_codes)?;
    Ok(allocate_batch(
        l_tags.iter().map(Option::as_deref),
        l_known_codes.iter().map(Option::as_deref),
        digit_width,
    ))
}

#[pyfunction]
#[pyo3(name = "allocate_one", signature = (tag, known_codes, digit_width = 4))]
fn py_allocate_one(
    tag: &Bound<'_, PyAny>,
    known_codes: &Bound<'_, PyAny>,
    digit_width: usize,
) -> PyResult<Option<String>> {
    let digit_width = parse_digit_width(digit_width)?;
    let c_tag = extract_optional_string(tag);
    let l_known_codes = extract_optional_strings(known_codes)?;
    Ok(allocate_one(
        c_tag.as_deref(),
        l_known_codes.iter().map(Option::as_deref),
        digit_width,
    ))
}

#[pyfunction]
#[pyo3(name = "run_allocation_job", signature = (
    file_base,
    file_tags,
    file_out = None,
    digit_width = 4,
    base_sheet = None,
    base_columns = None,
    tags_sheet = None,
    tags_column = None,
    result_sheet = None,
    rule_autofit = "all",
    if_copy_tag_sheets = true
))]
#[allow(clippy::too_many_arguments)]
fn py_run_allocation_job<'py>(
    py: Python<'py>,
    file_base: PathBuf,
    file_tags: PathBuf,
    file_out: Option<PathBuf>,
    digit_width: usize,
    base_sheet: Option<String>,
    base_columns: Option<Vec<String>>,
    tags_sheet: Option<String>,
    tags_column: Option<String>,
    result_sheet: Option<String>,
    rule_autofit: &str,
    if_copy_tag_sheets: bool,
) -> PyResult<Bound<'py, PyDict>> {
    let path_file_out = file_out.unwrap_or_else(|| derive_default_output_path(&file_tags));

    let mut job = SpecAllocationJob::new(file_base, file_tags, path_file_out);
    job.digit_width = parse_digit_width(digit_width)?;
    if let Some(val) = base_sheet {
        job.source_base.sheet_name = val;
    }
    if let Some(val) = base_columns {
        job.source_base.cols = val;
    }
    if let Some(val) = tags_sheet {
        job.source_tags.sheet_name = val;
    }
    if let Some(val) = tags_column {
        job.source_tags.col = val;
    }
    if let Some(val) = result_sheet {
        job.result_sheet.sheet_name = val;
    }
    job.result_sheet.sheet_options.policy_autofit.rule_columns =
        parse_rule_autofit_columns(rule_autofit)?;
    job.if_copy_tag_sheets = if_copy_tag_sheets;

    let report = rs_run_allocation_job(&job).map_err(derive_py_err_from_xlsx_io)?;

    let dict_report = PyDict::new(py);
    dict_report.set_item("file_out", report.path_file_out.to_string_lossy().to_string())?;
    dict_report.set_item("sheet_name_result", report.sheet_name_result)?;
    dict_report.set_item("cnt_known_codes", report.cnt_known_codes)?;
    dict_report.set_item("cnt_sheets_copied", report.cnt_sheets_copied)?;
    for (c_key, n_count) in report.allocation.to_dict() {
        dict_report.set_item(c_key, n_count)?;
    }
    dict_report.set_item("warnings", report.allocation.warnings)?;
    dict_report.set_item("rows", report.rows)?;
    Ok(dict_report)
}

fn parse_digit_width(value: usize) -> PyResult<EnumDigitWidth> {
    EnumDigitWidth::try_from(value).map_err(|err: DigitWidthError| {
        PyValueError::new_err(err.to_string())
    })
}

fn parse_rule_autofit_columns(value: &str) -> PyResult<EnumAutofitColumnsRule> {
    match value {
        "none" => Ok(EnumAutofitColumnsRule::None),
        "header" => Ok(EnumAutofitColumnsRule::Header),
        "body" => Ok(EnumAutofitColumnsRule::Body),
        "all" => Ok(EnumAutofitColumnsRule::All),
        _ => Err(PyValueError::new_err(
            "rule_autofit must be one of: 'none', 'header', 'body', 'all'.",
        )),
    }
}

fn derive_py_err_from_xlsx_io(err: RsXlsxIoError) -> PyErr {
    let c_msg = err.to_string();
    match err {
        RsXlsxIoError::DigitWidth(_) => PyValueError::new_err(c_msg),
        _ => XlsxIoError::new_err(c_msg),
    }
}

/// `str` items become values; anything else (None, numbers, ...) is absent.
fn extract_optional_string(obj: &Bound<'_, PyAny>) -> Option<String> {
    obj.extract::<String>().ok()
}

fn extract_optional_strings(obj: &Bound<'_, PyAny>) -> PyResult<Vec<Option<String>>> {
    let mut l_values = Vec::new();
    for item in obj.try_iter()? {
        l_values.push(extract_optional_string(&item?));
    }
    Ok(l_values)
}

#[pymodule]
fn _codekit_rs(py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyPrefixIndex>()?;
    module.add_function(wrap_pyfunction!(is_valid_code, module)?)?;
    module.add_function(wrap_pyfunction!(py_allocate_batch, module)?)?;
    module.add_function(wrap_pyfunction!(py_allocate_one, module)?)?;
    module.add_function(wrap_pyfunction!(py_run_allocation_job, module)?)?;
    module.add("XlsxIoError", py.get_type::<XlsxIoError>())?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    Ok(())
}
