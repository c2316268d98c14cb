use crate::schema::report::AggregateReport;
use crate::schema::types::ScanStats;

/// Running statistics while files are processed
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    /// Total number of files processed
    pub total_files: usize,

    /// Number of files that contributed at least one numeric field
    pub files_with_fields: usize,
}

impl ProcessingStats {
    /// Create a new processing stats instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one file's extracted fields
    pub fn record_file(&mut self, fields: &AggregateReport) {
        self.total_files += 1;
        if !fields.is_empty() {
            self.files_with_fields += 1;
        }
    }

    /// Final statistics for a merged report
    pub fn finish(&self, report: &AggregateReport) -> ScanStats {
        ScanStats {
            total_files: self.total_files,
            files_with_fields: self.files_with_fields,
            total_classes: report.len(),
            total_fields: report.field_count(),
        }
    }
}
