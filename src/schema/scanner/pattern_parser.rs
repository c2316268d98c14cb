use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SyntaxError;
use crate::schema::classify::Expr;
use crate::schema::report::AggregateReport;
use crate::schema::types::Strategy;

use super::observer::ScanObserver;
use super::{FieldExtractor, record_annotated_field};

// `name: type` on a single line; the type must be a bare identifier
static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)[ \t]*:[ \t]*([A-Za-z_][A-Za-z0-9_]*)([.\[]?)").unwrap()
});

/// Extractor that scans raw text with regular expressions.
///
/// Tolerates source that does not parse, at the cost of two known
/// limitations:
///
/// * Field matching for a class starts at the end of its header and runs to
///   the end of the file. Fields of every later class, schema or not, are
///   also attributed to each earlier schema class, and so is any other
///   `name: int` text after the header, such as annotated parameters in
///   `def scale(self, factor: float)`.
/// * Only bare `int`/`float` annotations are seen; qualified (`a.int`) and
///   subscripted (`List[int]`) annotations are ignored.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    marker: String,
    class_re: Regex,
}

impl PatternExtractor {
    /// Create a new pattern extractor recognising `marker` anywhere in a class's base list
    pub fn new(marker: impl Into<String>) -> Result<Self, regex::Error> {
        let marker = marker.into();
        let class_re = Regex::new(&format!(
            r"class[ \t]+([A-Za-z_][A-Za-z0-9_]*)[ \t]*\([^)]*{}[^)]*\)[ \t]*:",
            regex::escape(&marker)
        ))?;
        Ok(Self { marker, class_re })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl FieldExtractor for PatternExtractor {
    fn strategy(&self) -> Strategy {
        Strategy::Pattern
    }

    fn extract(&self, source: &str, observer: &mut dyn ScanObserver) -> Result<AggregateReport, SyntaxError> {
        let mut report = AggregateReport::new();

        for header in self.class_re.captures_iter(source) {
            let (Some(whole), Some(name)) = (header.get(0), header.get(1)) else {
                continue;
            };
            let class_name = name.as_str();
            observer.schema_class(class_name);

            for field in FIELD_RE.captures_iter(&source[whole.end()..]) {
                let (Some(field_name), Some(tag)) = (field.get(1), field.get(2)) else {
                    continue;
                };
                // A trailing `.` or `[` means a qualified or subscripted
                // annotation, which this backend does not resolve
                let annotation = match field.get(3).map(|m| m.as_str()) {
                    Some(".") | Some("[") => Expr::Other,
                    _ => Expr::Name(tag.as_str()),
                };
                record_annotated_field(&mut report, observer, class_name, field_name.as_str(), &annotation);
            }
        }

        Ok(report)
    }
}
