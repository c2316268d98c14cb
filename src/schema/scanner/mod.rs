mod file_collector;
mod observer;
mod parser;
mod pattern_parser;
mod progress;

use anyhow::{Context, Result};

use crate::error::SyntaxError;
use crate::schema::classify::{Expr, numeric_tag, resolve_type_tag};
use crate::schema::report::AggregateReport;
use crate::schema::types::{NumericField, ScanOptions, Strategy};

// Re-export from submodules
pub use file_collector::FileCollector;
pub use observer::{LogObserver, NullObserver, ScanObserver};
pub use parser::StructuralExtractor;
pub use pattern_parser::PatternExtractor;
pub use progress::ProgressTracker;

/// Turns the text of one source file into its schema classes' numeric fields
pub trait FieldExtractor {
    /// The backend this extractor implements
    fn strategy(&self) -> Strategy;

    /// Extract numeric fields from one file's contents
    fn extract(&self, source: &str, observer: &mut dyn ScanObserver) -> Result<AggregateReport, SyntaxError>;
}

/// Build the extractor selected by the options
pub fn extractor_for(options: &ScanOptions) -> Result<Box<dyn FieldExtractor>> {
    let extractor: Box<dyn FieldExtractor> = match options.strategy {
        Strategy::Structural => Box::new(StructuralExtractor::new(options.marker.as_str())?),
        Strategy::Pattern => Box::new(
            PatternExtractor::new(options.marker.as_str())
                .with_context(|| format!("Failed to build class pattern for marker {}", options.marker))?,
        ),
    };
    Ok(extractor)
}

/// Record one annotated field of a schema class if its annotation is numeric
pub(crate) fn record_annotated_field(
    report: &mut AggregateReport,
    observer: &mut dyn ScanObserver,
    class_name: &str,
    field_name: &str,
    annotation: &Expr<'_>,
) {
    match numeric_tag(annotation) {
        Some(tag) => {
            let field = NumericField::new(field_name, tag);
            observer.numeric_field(class_name, &field);
            report.push(class_name, field);
        }
        None => observer.field_skipped(class_name, field_name, resolve_type_tag(annotation)),
    }
}
