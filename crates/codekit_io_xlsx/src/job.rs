//! End-to-end allocation job over workbooks on disk.

use polars::prelude::{Column, DataFrame};

use codekit_alloc::allocate_batch_with_report;

use crate::reader::{read_known_codes, read_tags, read_workbook_grids};
use crate::spec::{EnumSourceRole, ReportAllocationJob, SpecAllocationJob, XlsxIoError};
use crate::writer::XlsxWriter;

/// Build the two-column result frame `(header_tag, header_code)`.
pub fn derive_result_dataframe(
    tags: &[Option<String>],
    codes: &[Option<String>],
    header_tag: &str,
    header_code: &str,
) -> Result<DataFrame, XlsxIoError> {
    if tags.len() != codes.len() {
        return Err(XlsxIoError::InvalidInput(format!(
            "tags and codes must have equal length, got {} and {}",
            tags.len(),
            codes.len()
        )));
    }
    let df = DataFrame::new(vec![
        Column::new(header_tag.into(), tags.to_vec()),
        Column::new(header_code.into(), codes.to_vec()),
    ])?;
    Ok(df)
}

/// Read known codes and tags, allocate, and write the output workbook.
///
/// The output holds every sheet of the tags workbook (values only, when
/// `if_copy_tag_sheets` is set) followed by the result sheet, renamed with a
/// counter suffix if its name is taken.
pub fn run_allocation_job(job: &SpecAllocationJob) -> Result<ReportAllocationJob, XlsxIoError> {
    let l_known_codes = read_known_codes(&job.path_file_base, &job.source_base)
        .map_err(|err| err.in_source(EnumSourceRole::KnownCodes))?;
    let l_tags = read_tags(&job.path_file_tags, &job.source_tags)
        .map_err(|err| err.in_source(EnumSourceRole::Tags))?;

    let (l_codes, report_alloc) = allocate_batch_with_report(
        l_tags.iter().map(Option::as_deref),
        l_known_codes.iter().map(Option::as_deref),
        job.digit_width,
    );

    let l_sheets_copied = if job.if_copy_tag_sheets {
        read_workbook_grids(&job.path_file_tags)
            .map_err(|err| err.in_source(EnumSourceRole::Tags))?
    } else {
        Vec::new()
    };

    let mut writer = XlsxWriter::with_defaults(job.path_file_out.clone());
    for (c_sheet_name, l_grid) in &l_sheets_copied {
        writer.write_sheet_from_grid(l_grid, c_sheet_name)?;
    }

    let df_result = derive_result_dataframe(
        &l_tags,
        &l_codes,
        &job.result_sheet.header_tag,
        &job.result_sheet.header_code,
    )?;
    let sheet_name_result = writer.write_sheet_from_dataframe(
        &df_result,
        &job.result_sheet.sheet_name,
        &job.result_sheet.sheet_options,
    )?;
    writer.close()?;

    tracing::info!(
        path = %job.path_file_out.display(),
        sheet = %sheet_name_result,
        digit_width = %job.digit_width,
        "{report_alloc}"
    );

    Ok(ReportAllocationJob {
        path_file_out: job.path_file_out.clone(),
        sheet_name_result,
        cnt_known_codes: l_known_codes.iter().flatten().count() as u64,
        cnt_sheets_copied: l_sheets_copied.len() as u64,
        allocation: report_alloc,
        rows: l_tags.into_iter().zip(l_codes).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_result_dataframe() {
        let l_tags = vec![Some("ABC".to_string()), None];
        let l_codes = vec![Some("ABC0001".to_string()), None];

        let df = derive_result_dataframe(&l_tags, &l_codes, "Sigla", "Proximo_Codigo").unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.get_column_names_str(), vec!["Sigla", "Proximo_Codigo"]);
        assert_eq!(df.column("Proximo_Codigo").unwrap().null_count(), 1);

        assert!(derive_result_dataframe(&l_tags, &l_codes[..1], "Sigla", "Proximo_Codigo").is_err());
    }

    #[test]
    fn test_in_source_tags_once() {
        let err = XlsxIoError::InvalidColumn("1".to_string())
            .in_source(EnumSourceRole::KnownCodes)
            .in_source(EnumSourceRole::Tags);
        assert_eq!(err.role(), Some(EnumSourceRole::KnownCodes));
        assert!(matches!(err.root(), XlsxIoError::InvalidColumn(_)));
        assert_eq!(
            err.to_string(),
            "Reading known codes: Invalid column \"1\": expected letters A..XFD"
        );
        assert_eq!(XlsxIoError::Closed.role(), None);
    }
}
