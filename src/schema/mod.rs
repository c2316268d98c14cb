pub mod classify;
pub mod processor;
pub mod report;
pub mod scanner;
pub mod types;

// Re-export the main API for easier access
pub use processor::SchemaProcessor;
pub use report::AggregateReport;
pub use scanner::{FieldExtractor, PatternExtractor, StructuralExtractor};
pub use types::{NumericField, ScanOptions, ScanResult, ScanStats, Strategy};
