use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::error::ScanError;
use crate::schema::types::{ScanOptions, Strategy};
use crate::utils::file_utils;

/// Load scan options from a TOML file; missing keys keep their defaults
pub fn load_options(path: impl AsRef<Path>) -> Result<ScanOptions> {
    let path = path.as_ref();
    debug!("Loading configuration from {}", path.display());

    let content = file_utils::read_source(path)?;
    let options: ScanOptions = toml::from_str(&content)
        .with_context(|| format!("Failed to parse configuration file {}", path.display()))?;
    validate(&options)?;
    Ok(options)
}

/// Values given on the command line; `None` keeps the value from the
/// configuration file or the defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub root_path: Option<PathBuf>,
    pub strategy: Option<Strategy>,
    pub marker: Option<String>,
    pub extension: Option<String>,
    pub sort_paths: Option<bool>,
    pub follow_links: Option<bool>,
    pub show_progress: Option<bool>,
    pub indent: Option<usize>,
}

impl CliOverrides {
    /// Apply every value that was given on top of `options`
    pub fn apply(&self, mut options: ScanOptions) -> ScanOptions {
        if let Some(root) = &self.root_path {
            options.root_path = root.clone();
        }
        if let Some(strategy) = self.strategy {
            options.strategy = strategy;
        }
        if let Some(marker) = &self.marker {
            options.marker = marker.clone();
        }
        if let Some(extension) = &self.extension {
            options.extension = extension.clone();
        }
        if let Some(sort_paths) = self.sort_paths {
            options.sort_paths = sort_paths;
        }
        if let Some(follow_links) = self.follow_links {
            options.follow_links = follow_links;
        }
        if let Some(show_progress) = self.show_progress {
            options.show_progress = show_progress;
        }
        if let Some(indent) = self.indent {
            options.indent = indent;
        }
        options
    }
}

/// Resolve the options for a run: defaults, then the file, then the overrides
pub fn resolve_options(config_file: Option<&Path>, overrides: &CliOverrides) -> Result<ScanOptions> {
    let options = match config_file {
        Some(path) => load_options(path)?,
        None => ScanOptions::default(),
    };
    let options = overrides.apply(options);
    validate(&options)?;
    Ok(options)
}

/// Reject option values the scanner cannot work with
pub fn validate(options: &ScanOptions) -> Result<(), ScanError> {
    let marker = options.marker.as_str();
    let mut chars = marker.chars();
    let is_identifier = chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric());
    if !is_identifier {
        return Err(ScanError::Config(format!("marker {:?} is not an identifier", marker)));
    }

    if options.extension.trim_start_matches('.').is_empty() {
        return Err(ScanError::Config("extension must not be empty".to_string()));
    }

    Ok(())
}
