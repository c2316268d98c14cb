use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::report::AggregateReport;

/// A numeric field declared in the body of a schema class
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumericField {
    /// Name of the annotated attribute
    pub field: String,

    /// Resolved type tag, always one of the numeric tags
    #[serde(rename = "type")]
    pub type_tag: String,
}

impl NumericField {
    pub fn new(field: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            type_tag: type_tag.into(),
        }
    }
}

/// Which extraction backend to run over each file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Build a syntax tree and visit class definitions exactly
    #[default]
    Structural,

    /// Scan raw text with regular expressions
    Pattern,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Structural => write!(f, "structural"),
            Strategy::Pattern => write!(f, "pattern"),
        }
    }
}

/// Configuration options for schema scanning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanOptions {
    /// Directory to scan recursively
    pub root_path: PathBuf,

    /// Extraction backend
    pub strategy: Strategy,

    /// Base class name that marks a class as a schema
    pub marker: String,

    /// Source file extension, without the leading dot
    pub extension: String,

    /// Visit directory entries sorted by file name instead of filesystem order
    pub sort_paths: bool,

    /// Whether to follow symbolic links while walking
    pub follow_links: bool,

    /// Show a progress bar on stderr for larger trees
    pub show_progress: bool,

    /// Indentation width of the JSON report
    pub indent: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            strategy: Strategy::Structural,
            marker: "BaseModel".to_string(),
            extension: "py".to_string(),
            sort_paths: true,
            follow_links: false,
            show_progress: false,
            indent: 4,
        }
    }
}

/// Statistics about a scan
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Number of source files read and extracted
    pub total_files: usize,

    /// Number of files that contributed at least one numeric field
    pub files_with_fields: usize,

    /// Number of distinct class names in the report
    pub total_classes: usize,

    /// Number of numeric fields in the report
    pub total_fields: usize,
}

/// Result of a scan
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Merged numeric fields, keyed by class name
    pub report: AggregateReport,

    /// Statistics about the scan
    pub stats: ScanStats,

    /// Files visited, in visitation order
    pub files: Vec<PathBuf>,
}
