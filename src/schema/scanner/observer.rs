use std::path::Path;

use log::{debug, trace, warn};

use crate::schema::types::NumericField;

/// Receiver for diagnostic events raised while scanning.
///
/// Extractors and the directory walker report what they see through this
/// trait instead of logging directly. Every method has an empty default so
/// implementors only pick the events they care about.
pub trait ScanObserver {
    /// A source file is about to be extracted
    fn file_started(&mut self, _path: &Path) {}

    /// A class was classified as a schema class
    fn schema_class(&mut self, _class_name: &str) {}

    /// A numeric field was recorded for a schema class
    fn numeric_field(&mut self, _class_name: &str, _field: &NumericField) {}

    /// An annotated field of a schema class was dropped; `tag` is `None` when
    /// the annotation could not be resolved at all
    fn field_skipped(&mut self, _class_name: &str, _field_name: &str, _tag: Option<&str>) {}

    /// A directory entry below the root could not be read and was skipped
    fn walk_error(&mut self, _error: &walkdir::Error) {}
}

/// Observer that forwards every event to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ScanObserver for LogObserver {
    fn file_started(&mut self, path: &Path) {
        debug!("Processing file: {}", path.display());
    }

    fn schema_class(&mut self, class_name: &str) {
        debug!("Found schema class: {}", class_name);
    }

    fn numeric_field(&mut self, class_name: &str, field: &NumericField) {
        trace!("{}.{}: {}", class_name, field.field, field.type_tag);
    }

    fn field_skipped(&mut self, class_name: &str, field_name: &str, tag: Option<&str>) {
        match tag {
            Some(tag) => trace!("Skipping {}.{}: non-numeric type {}", class_name, field_name, tag),
            None => trace!("Skipping {}.{}: unresolved annotation", class_name, field_name),
        }
    }

    fn walk_error(&mut self, error: &walkdir::Error) {
        warn!("Skipping unreadable entry: {}", error);
    }
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ScanObserver for NullObserver {}
