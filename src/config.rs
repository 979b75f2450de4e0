//! `api-documenter.json` configuration.
//!
//! Every key is optional; missing keys take the documented defaults.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{DocumenterError, Result};
use crate::kinds::Granularity;

/// Config file picked up from the working directory when none is given.
pub const CONFIG_FILENAME: &str = "api-documenter.json";

/// Either one concrete granularity or every granularity side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum FileLevelSetting {
    Single(Granularity),
    All,
}

impl FileLevelSetting {
    pub fn granularities(self) -> Vec<Granularity> {
        match self {
            FileLevelSetting::Single(g) => vec![g],
            FileLevelSetting::All => Granularity::ALL.to_vec(),
        }
    }
}

impl Default for FileLevelSetting {
    fn default() -> Self {
        FileLevelSetting::Single(Granularity::Member)
    }
}

impl FromStr for FileLevelSetting {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(FileLevelSetting::All);
        }
        s.parse::<Granularity>()
            .map(FileLevelSetting::Single)
            .map_err(|_| {
                format!("unknown file level: {s}. Use model, package, namespace, export, member, or all")
            })
    }
}

impl TryFrom<String> for FileLevelSetting {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for FileLevelSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileLevelSetting::Single(g) => write!(f, "{g}"),
            FileLevelSetting::All => f.write_str("all"),
        }
    }
}

/// Line ending convention for written pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewlineKind {
    #[default]
    Crlf,
    Lf,
    Os,
}

impl NewlineKind {
    /// Convert `\n`-separated text to this convention.
    pub fn apply(self, text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        let crlf = match self {
            NewlineKind::Crlf => true,
            NewlineKind::Lf => false,
            NewlineKind::Os => cfg!(windows),
        };
        if crlf {
            normalized.replace('\n', "\r\n")
        } else {
            normalized
        }
    }
}

impl FromStr for NewlineKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crlf" => Ok(NewlineKind::Crlf),
            "lf" => Ok(NewlineKind::Lf),
            "os" => Ok(NewlineKind::Os),
            _ => Err(format!("unknown newline kind: {s}. Use crlf, lf, or os")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkdownOptions {
    pub file_level: FileLevelSetting,
    pub index_filename: String,
    pub index_title: String,
    pub index_breadcrumb_title: String,
    pub index_breadcrumb_url: String,
    pub hide_empty_table_columns: bool,
    pub show_property_defaults: bool,
    pub show_breadcrumb: bool,
    pub use_index: bool,
    pub show_rules: bool,
    pub show_line_breaks: bool,
    pub show_call_signatures: bool,
    pub collapse_call_signatures: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            file_level: FileLevelSetting::default(),
            index_filename: "index".to_string(),
            index_title: "API Reference".to_string(),
            index_breadcrumb_title: "Home".to_string(),
            index_breadcrumb_url: String::new(),
            hide_empty_table_columns: false,
            show_property_defaults: false,
            show_breadcrumb: true,
            use_index: true,
            show_rules: false,
            show_line_breaks: false,
            show_call_signatures: false,
            collapse_call_signatures: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumenterConfig {
    pub output_target: String,
    pub newline_kind: NewlineKind,
    pub show_inherited_members: bool,
    pub include_package_names: Vec<String>,
    pub exclude_package_names: Vec<String>,
    pub markdown_options: MarkdownOptions,
}

impl Default for DocumenterConfig {
    fn default() -> Self {
        Self {
            output_target: "markdown".to_string(),
            newline_kind: NewlineKind::default(),
            show_inherited_members: false,
            include_package_names: Vec::new(),
            exclude_package_names: Vec::new(),
            markdown_options: MarkdownOptions::default(),
        }
    }
}

impl DocumenterConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| DocumenterError::io(format!("failed to read {}", path.display()), e))?;
        let config: DocumenterConfig =
            serde_json::from_str(&content).map_err(|source| DocumenterError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_target != "markdown" {
            return Err(DocumenterError::Config(format!(
                "unsupported output target: {}. Only markdown is supported",
                self.output_target
            )));
        }
        let index = &self.markdown_options.index_filename;
        if index.is_empty() || index.contains(['/', '\\']) {
            return Err(DocumenterError::Config(format!(
                "indexFilename must be a plain file name, got {index:?}"
            )));
        }
        Ok(())
    }
}
