use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, info};

use crate::error::ScanError;
use crate::schema::report::AggregateReport;
use crate::schema::scanner::{FieldExtractor, FileCollector, LogObserver, ProgressTracker, ScanObserver, extractor_for};
use crate::schema::types::{ScanOptions, ScanResult};
use crate::utils::file_utils;

use super::stats::ProcessingStats;

/// Walks a source tree and merges the numeric fields of every file
pub struct SchemaProcessor {
    /// Configuration options for processing
    options: ScanOptions,

    /// Backend used on each file
    extractor: Box<dyn FieldExtractor>,

    /// File collector for finding source files
    file_collector: FileCollector,

    /// Progress tracker for displaying progress
    progress_tracker: ProgressTracker,

    /// Receiver of scan diagnostics
    observer: Box<dyn ScanObserver>,
}

impl SchemaProcessor {
    /// Create a new schema processor with the given options, logging through `log`
    pub fn new(options: ScanOptions) -> Result<Self> {
        Self::with_observer(options, Box::new(LogObserver))
    }

    /// Create a new schema processor with default options
    pub fn with_defaults() -> Result<Self> {
        Self::new(ScanOptions::default())
    }

    /// Create a new schema processor reporting diagnostics to `observer`
    pub fn with_observer(options: ScanOptions, observer: Box<dyn ScanObserver>) -> Result<Self> {
        Ok(Self {
            extractor: extractor_for(&options)?,
            file_collector: FileCollector::from_options(&options),
            progress_tracker: ProgressTracker::new(options.show_progress),
            observer,
            options,
        })
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Extract the numeric fields of a single file
    pub fn extract_file(&mut self, file: impl AsRef<Path>) -> Result<AggregateReport, ScanError> {
        let file = file.as_ref();
        self.observer.file_started(file);

        let source = file_utils::read_source(file)?;
        let fields = self
            .extractor
            .extract(&source, self.observer.as_mut())
            .map_err(|source| ScanError::Parse {
                path: file.to_path_buf(),
                source,
            })?;

        debug!("Found {} numeric fields in {}", fields.field_count(), file.display());
        Ok(fields)
    }

    /// Process files in order and merge their fields.
    ///
    /// The first unreadable or unparsable file aborts the whole run.
    pub fn process_files(&mut self, files: &[PathBuf]) -> Result<ScanResult> {
        info!("Processing {} files with the {} strategy", files.len(), self.extractor.strategy());

        let mut report = AggregateReport::new();
        let mut stats = ProcessingStats::new();
        let tracker = std::mem::take(&mut self.progress_tracker);

        let outcome = tracker.track_path_progress(files, |file| {
            let fields = self.extract_file(file)?;
            stats.record_file(&fields);
            report.merge(fields);
            Ok::<(), ScanError>(())
        });
        self.progress_tracker = tracker;
        outcome?;

        let stats = stats.finish(&report);
        info!(
            "Processed {} files, found {} numeric fields in {} classes",
            stats.total_files, stats.total_fields, stats.total_classes
        );

        Ok(ScanResult {
            report,
            stats,
            files: files.to_vec(),
        })
    }

    /// Scan a directory recursively
    pub fn scan_directory(&mut self, input_dir: impl AsRef<Path>) -> Result<ScanResult> {
        let input_dir = input_dir.as_ref();
        info!("Scanning directory: {}", input_dir.display());

        let files = self
            .file_collector
            .collect_files(input_dir, self.observer.as_mut())?;
        info!("Found {} files to process", files.len());

        self.process_files(&files)
    }

    /// Scan the configured root directory
    pub fn scan(&mut self) -> Result<ScanResult> {
        let root = self.options.root_path.clone();
        self.scan_directory(root)
    }

    /// Scan specific files
    pub fn scan_specific_files(&mut self, file_paths: &[PathBuf]) -> Result<ScanResult> {
        info!("Scanning {} specific files", file_paths.len());
        self.process_files(file_paths)
    }
}
