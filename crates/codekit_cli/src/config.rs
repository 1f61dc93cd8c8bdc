//! `codekit.toml` configuration.
//!
//! Every field is optional; missing sections and keys take the library
//! defaults. Command-line flags override file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use codekit_alloc::EnumDigitWidth;
use codekit_io_xlsx::conf::{
    C_COL_TAGS_DEFAULT, N_ROW_BASE_START_DEFAULT, N_ROW_TAGS_START_DEFAULT, TUP_COLS_BASE_DEFAULT,
};
use codekit_io_xlsx::{
    C_HEADER_CODE_DEFAULT, C_HEADER_TAG_DEFAULT, C_SHEET_BASE_DEFAULT, C_SHEET_RESULT_DEFAULT,
    C_SHEET_TAGS_DEFAULT, SpecKnownCodesSource, SpecResultSheetOptions, SpecTagSource,
};

/// File looked up in the working directory when `--config` is not given.
pub const C_CONFIG_FILE_DEFAULT: &str = "codekit.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Allocation settings
    pub allocation: AllocationConfig,
    /// Known-codes workbook layout
    pub base: BaseConfig,
    /// Tags workbook layout
    pub tags: TagsConfig,
    /// Output workbook layout
    pub output: OutputConfig,
}

/// `[allocation]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Suffix width, 3 or 4
    pub digit_width: usize,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            digit_width: EnumDigitWidth::default().n_digits(),
        }
    }
}

/// `[base]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    /// Sheet with already-issued codes
    pub sheet: String,
    /// Column letters scanned, in order
    pub columns: Vec<String>,
    /// First data row (1-based)
    pub row_start: usize,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            sheet: C_SHEET_BASE_DEFAULT.to_string(),
            columns: TUP_COLS_BASE_DEFAULT.iter().map(ToString::to_string).collect(),
            row_start: N_ROW_BASE_START_DEFAULT,
        }
    }
}

/// `[tags]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagsConfig {
    /// Sheet with tags to code
    pub sheet: String,
    /// Column letter holding the tags
    pub column: String,
    /// First row read (1-based)
    pub row_start: usize,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            sheet: C_SHEET_TAGS_DEFAULT.to_string(),
            column: C_COL_TAGS_DEFAULT.to_string(),
            row_start: N_ROW_TAGS_START_DEFAULT,
        }
    }
}

/// `[output]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Result sheet name; a counter is appended when taken
    pub result_sheet: String,
    /// Header of the tag column
    pub header_tag: String,
    /// Header of the code column
    pub header_code: String,
    /// Carry the tags workbook's sheets into the output
    pub copy_tag_sheets: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            result_sheet: C_SHEET_RESULT_DEFAULT.to_string(),
            header_tag: C_HEADER_TAG_DEFAULT.to_string(),
            header_code: C_HEADER_CODE_DEFAULT.to_string(),
            copy_tag_sheets: true,
        }
    }
}

impl Config {
    /// Path consulted for `explicit`, falling back to `./codekit.toml`.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit.map_or_else(|| PathBuf::from(C_CONFIG_FILE_DEFAULT), Path::to_path_buf)
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, a missing `./codekit.toml`
    /// yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(explicit);
        if explicit.is_none() && !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parse configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.digit_width()?;
        Ok(config)
    }

    /// Render as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Write configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }
        std::fs::write(path, self.to_toml_string()?)
            .with_context(|| format!("Failed to write config {}", path.display()))
    }

    /// Validated digit width.
    pub fn digit_width(&self) -> Result<EnumDigitWidth> {
        EnumDigitWidth::try_from(self.allocation.digit_width)
            .context("Invalid [allocation] digit_width")
    }

    /// Known-codes source described by `[base]`.
    pub fn known_codes_source(&self) -> SpecKnownCodesSource {
        SpecKnownCodesSource {
            sheet_name: self.base.sheet.clone(),
            cols: self.base.columns.clone(),
            row_start: self.base.row_start,
        }
    }

    /// Tag source described by `[tags]`.
    pub fn tag_source(&self) -> SpecTagSource {
        SpecTagSource {
            sheet_name: self.tags.sheet.clone(),
            col: self.tags.column.clone(),
            row_start: self.tags.row_start,
        }
    }

    /// Result sheet options described by `[output]`.
    pub fn result_sheet_options(&self) -> SpecResultSheetOptions {
        SpecResultSheetOptions {
            sheet_name: self.output.result_sheet.clone(),
            header_tag: self.output.header_tag.clone(),
            header_code: self.output.header_code.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let config = Config::from_toml_str(
            r#"
            [allocation]
            digit_width = 3

            [base]
            sheet = "Codes"
            "#,
        )
        .unwrap();

        assert_eq!(config.digit_width().unwrap(), EnumDigitWidth::Three);
        assert_eq!(config.base.sheet, "Codes");
        assert_eq!(config.base.columns, vec!["A", "B"]);
        assert_eq!(config.base.row_start, 2);
        assert_eq!(config.tags, TagsConfig::default());
        assert_eq!(config.output.result_sheet, "RESULTADO");
    }

    #[test]
    fn invalid_digit_width_is_rejected() {
        assert!(Config::from_toml_str("[allocation]\ndigit_width = 5\n").is_err());
    }

    #[test]
    fn save_then_load_returns_same_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("codekit.toml");

        let mut config = Config::default();
        config.tags.column = "C".to_string();
        config.output.copy_tag_sheets = false;
        config.save(&path).unwrap();

        assert_eq!(Config::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn sources_follow_sections() {
        let config = Config::default();
        assert_eq!(config.known_codes_source(), SpecKnownCodesSource::default());
        assert_eq!(config.tag_source(), SpecTagSource::default());
        assert_eq!(config.result_sheet_options(), SpecResultSheetOptions::default());
    }
}
