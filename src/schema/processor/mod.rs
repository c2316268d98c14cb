mod schema_processor;
mod stats;

// Re-export from submodules
pub use schema_processor::SchemaProcessor;
pub use stats::ProcessingStats;
