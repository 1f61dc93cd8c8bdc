//! XLSX constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Sheet holding the already-issued codes.
pub const C_SHEET_BASE_DEFAULT: &str = "aba1";
/// Columns of the base sheet scanned for codes.
pub const TUP_COLS_BASE_DEFAULT: [&str; 2] = ["A", "B"];
/// First base-sheet row with data (1-based; row 1 is the header).
pub const N_ROW_BASE_START_DEFAULT: usize = 2;

/// Sheet holding the tags that need codes.
pub const C_SHEET_TAGS_DEFAULT: &str = "SIGLAS";
/// Column of the tags sheet holding the tags.
pub const C_COL_TAGS_DEFAULT: &str = "A";
/// First tags-sheet row read (1-based).
pub const N_ROW_TAGS_START_DEFAULT: usize = 1;

/// Name of the result sheet before collision handling.
pub const C_SHEET_RESULT_DEFAULT: &str = "RESULTADO";
/// Result column header for tags.
pub const C_HEADER_TAG_DEFAULT: &str = "Sigla";
/// Result column header for allocated codes.
pub const C_HEADER_CODE_DEFAULT: &str = "Proximo_Codigo";

/// Build default named format presets used by [`crate::writer::XlsxWriter`].
pub fn derive_default_xlsx_formats() -> BTreeMap<String, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        align: Some("left".to_string()),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert("text".to_string(), cfg_base_fmt_spec.clone());
    dict_fmt.insert(
        "header".to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            align: Some("center".to_string()),
            border: Some(true),
            ..Default::default()
        }),
    );

    dict_fmt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_preset_overlays_text_preset() {
        let dict_fmt = derive_default_xlsx_formats();
        let fmt_text = &dict_fmt["text"];
        let fmt_header = &dict_fmt["header"];

        assert_eq!(fmt_text.border, None);
        assert_eq!(fmt_header.border, Some(true));
        assert_eq!(fmt_header.bold, Some(true));
        assert_eq!(fmt_header.align.as_deref(), Some("center"));
        assert_eq!(fmt_header.font_name, fmt_text.font_name);
        assert_eq!(fmt_header.font_size, Some(11));
    }
}
