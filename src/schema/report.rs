use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::types::NumericField;

/// Numeric fields grouped by class name, in discovery order.
///
/// Used both for the fields of a single file and for the merged report of a
/// whole tree. Entries are only ever appended: a class name seen again gets
/// its new fields concatenated after the existing ones, without deduplication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    classes: Vec<(String, Vec<NumericField>)>,
    index: HashMap<String, usize>,
}

impl AggregateReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field to a class, creating the class entry on first use
    pub fn push(&mut self, class_name: &str, field: NumericField) {
        self.fields_mut(class_name).push(field);
    }

    /// Append every class of `other` after the current contents
    pub fn merge(&mut self, other: AggregateReport) {
        for (class_name, fields) in other.classes {
            if fields.is_empty() {
                continue;
            }
            self.fields_mut(&class_name).extend(fields);
        }
    }

    /// Fields recorded for a class
    pub fn get(&self, class_name: &str) -> Option<&[NumericField]> {
        self.index
            .get(class_name)
            .map(|&i| self.classes[i].1.as_slice())
    }

    /// Iterate classes in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[NumericField])> {
        self.classes
            .iter()
            .map(|(name, fields)| (name.as_str(), fields.as_slice()))
    }

    /// Class names in discovery order
    pub fn class_names(&self) -> Vec<&str> {
        self.classes.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Total number of fields across all classes
    pub fn field_count(&self) -> usize {
        self.classes.iter().map(|(_, fields)| fields.len()).sum()
    }

    /// Render the report as pretty-printed JSON with the given indentation
    pub fn to_json(&self, indent: usize) -> serde_json::Result<String> {
        let indent = " ".repeat(indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only ever writes valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn fields_mut(&mut self, class_name: &str) -> &mut Vec<NumericField> {
        let i = match self.index.get(class_name) {
            Some(&i) => i,
            None => {
                self.classes.push((class_name.to_string(), Vec::new()));
                let i = self.classes.len() - 1;
                self.index.insert(class_name.to_string(), i);
                i
            }
        };
        &mut self.classes[i].1
    }
}

impl Serialize for AggregateReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.classes.len()))?;
        for (name, fields) in &self.classes {
            map.serialize_entry(name, fields)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AggregateReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ReportVisitor;

        impl<'de> Visitor<'de> for ReportVisitor {
            type Value = AggregateReport;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of class names to lists of numeric fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut report = AggregateReport::new();
                while let Some((name, fields)) = access.next_entry::<String, Vec<NumericField>>()? {
                    report.fields_mut(&name).extend(fields);
                }
                Ok(report)
            }
        }

        deserializer.deserialize_map(ReportVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report_of(entries: &[(&str, &str, &str)]) -> AggregateReport {
        let mut report = AggregateReport::new();
        for (class, field, tag) in entries {
            report.push(class, NumericField::new(*field, *tag));
        }
        report
    }

    #[test]
    fn test_merge_appends_without_dedup() {
        let mut report = report_of(&[("Foo", "a", "int")]);
        report.merge(report_of(&[("Bar", "b", "float"), ("Foo", "a", "int")]));

        assert_eq!(report.class_names(), vec!["Foo", "Bar"]);
        assert_eq!(
            report.get("Foo").unwrap(),
            &[NumericField::new("a", "int"), NumericField::new("a", "int")]
        );
        assert_eq!(report.field_count(), 3);
    }

    #[test]
    fn test_json_layout() {
        let report = report_of(&[("Point", "x", "int"), ("Point", "y", "float")]);
        let expected = r#"{
    "Point": [
        {
            "field": "x",
            "type": "int"
        },
        {
            "field": "y",
            "type": "float"
        }
    ]
}"#;
        assert_eq!(report.to_json(4).unwrap(), expected);
    }

    #[test]
    fn test_reparse_preserves_order() {
        let report = report_of(&[
            ("Zeta", "z", "int"),
            ("Alpha", "a", "float"),
            ("Zeta", "w", "float"),
        ]);
        let json = report.to_json(2).unwrap();
        let parsed: AggregateReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, report);
        assert_eq!(parsed.class_names(), vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_empty_report_is_empty_object() {
        assert_eq!(AggregateReport::new().to_json(4).unwrap(), "{}");
    }
}
