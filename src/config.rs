//! Dataset descriptors.
//!
//! A descriptor file names the columns and dialect of the GDP and crosswalk
//! datasets so commands do not need a dozen flags. Files ending in `.json`
//! are read as JSON, anything else as YAML. Every field is optional and falls
//! back to the World Bank layout.
//!
//! ```yaml
//! gdp:
//!   file: isp_gdp.csv
//!   min_year: 1960
//!   max_year: 2015
//! codes:
//!   file: isp_country_codes.csv
//!   plot_codes: ISO3166-1-Alpha-2
//!   data_codes: ISO3166-1-Alpha-3
//! ```

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::io_utils::{CsvFormat, DEFAULT_CSV_DELIMITER, DEFAULT_QUOTE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GdpInfo {
    pub file: Option<PathBuf>,
    pub separator: char,
    pub quote: char,
    pub min_year: i32,
    pub max_year: i32,
    pub country_name: String,
    pub country_code: String,
}

impl Default for GdpInfo {
    fn default() -> Self {
        Self {
            file: None,
            separator: DEFAULT_CSV_DELIMITER as char,
            quote: DEFAULT_QUOTE as char,
            min_year: 1960,
            max_year: 2015,
            country_name: "Country Name".to_string(),
            country_code: "Country Code".to_string(),
        }
    }
}

impl GdpInfo {
    pub fn format(&self) -> Result<CsvFormat> {
        Ok(CsvFormat::new(
            ascii_byte(self.separator, "separator")?,
            ascii_byte(self.quote, "quote")?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeInfo {
    pub file: Option<PathBuf>,
    pub separator: char,
    pub quote: char,
    pub plot_codes: String,
    pub data_codes: String,
}

impl Default for CodeInfo {
    fn default() -> Self {
        Self {
            file: None,
            separator: DEFAULT_CSV_DELIMITER as char,
            quote: DEFAULT_QUOTE as char,
            plot_codes: "ISO3166-1-Alpha-2".to_string(),
            data_codes: "ISO3166-1-Alpha-3".to_string(),
        }
    }
}

impl CodeInfo {
    pub fn format(&self) -> Result<CsvFormat> {
        Ok(CsvFormat::new(
            ascii_byte(self.separator, "separator")?,
            ascii_byte(self.quote, "quote")?,
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub gdp: GdpInfo,
    pub codes: CodeInfo,
}

impl DatasetConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("Reading config {path:?}"))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&text).with_context(|| format!("Parsing JSON config {path:?}"))
        } else {
            serde_yaml::from_str(&text).with_context(|| format!("Parsing YAML config {path:?}"))
        }
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

fn ascii_byte(value: char, what: &str) -> Result<u8> {
    if value.is_ascii() {
        Ok(value as u8)
    } else {
        anyhow::bail!("Configured {what} '{value}' must be ASCII")
    }
}
