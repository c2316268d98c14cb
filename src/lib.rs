pub mod config;
pub mod error;
pub mod schema;
pub mod utils;

// Re-export main types and functions for easier access
pub use schema::types::{NumericField, ScanOptions, ScanResult, ScanStats, Strategy};
pub use schema::report::AggregateReport;
pub use schema::processor::SchemaProcessor;
pub use schema::scanner::{FieldExtractor, LogObserver, NullObserver, PatternExtractor, ScanObserver, StructuralExtractor};

pub use error::{ScanError, SyntaxError};

// Re-export utility functions
pub use utils::file_utils;
