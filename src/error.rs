use std::path::PathBuf;
use thiserror::Error;

/// Location and description of the first syntax error found in a source file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at line {line}, column {column}: {message}")]
pub struct SyntaxError {
    /// 1-based line of the offending token
    pub line: usize,

    /// 1-based column of the offending token
    pub column: usize,

    /// Short description of what went wrong
    pub message: String,
}

/// Fatal conditions that abort a scan
#[derive(Debug, Error)]
pub enum ScanError {
    /// A source file is not valid Python (structural strategy only)
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: SyntaxError,
    },

    /// A source file could not be opened or read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The root directory itself could not be walked
    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A configuration value was rejected
    #[error("invalid configuration: {0}")]
    Config(String),
}
