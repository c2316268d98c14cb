use anyhow::{Context, Result};
use tree_sitter::{Node, Parser, Tree};

use crate::error::SyntaxError;
use crate::schema::classify::{Expr, is_schema_base};
use crate::schema::report::AggregateReport;
use crate::schema::types::Strategy;

use super::observer::ScanObserver;
use super::{FieldExtractor, record_annotated_field};

/// Extractor backed by the tree-sitter Python grammar.
///
/// Visits every class definition in the file, nested or decorated ones
/// included, in pre-order. Input that does not parse cleanly is rejected
/// with the position of the first error.
#[derive(Debug, Clone)]
pub struct StructuralExtractor {
    marker: String,
}

impl StructuralExtractor {
    /// Create a new structural extractor recognising `marker` as the schema base
    pub fn new(marker: impl Into<String>) -> Result<Self> {
        // Fail early if the grammar cannot be loaded
        create_parser()?;
        Ok(Self {
            marker: marker.into(),
        })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    fn parse(&self, source: &str) -> Result<Tree, SyntaxError> {
        let mut parser = create_parser().map_err(|e| SyntaxError {
            line: 0,
            column: 0,
            message: e.to_string(),
        })?;
        let tree = parser.parse(source, None).ok_or_else(|| SyntaxError {
            line: 0,
            column: 0,
            message: "parser produced no tree".to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(first_syntax_error(root, source));
        }
        // The grammar recovers from some input Python 3 rejects
        check_python3(root)?;
        Ok(tree)
    }

    fn visit_class(&self, class: Node<'_>, source: &str, report: &mut AggregateReport, observer: &mut dyn ScanObserver) {
        let Some(name) = class.child_by_field_name("name") else {
            return;
        };
        let class_name = node_text(name, source);

        let is_schema = class.child_by_field_name("superclasses").is_some_and(|bases| {
            named_children(bases)
                .into_iter()
                .any(|base| is_schema_base(&lower_expr(base, source), &self.marker))
        });
        if !is_schema {
            return;
        }
        observer.schema_class(class_name);

        let Some(body) = class.child_by_field_name("body") else {
            return;
        };
        for stmt in named_children(body) {
            if let Some((field_name, annotation)) = annotated_target(stmt) {
                let annotation = lower_expr(annotation, source);
                record_annotated_field(report, observer, class_name, node_text(field_name, source), &annotation);
            }
        }
    }
}

impl FieldExtractor for StructuralExtractor {
    fn strategy(&self) -> Strategy {
        Strategy::Structural
    }

    fn extract(&self, source: &str, observer: &mut dyn ScanObserver) -> Result<AggregateReport, SyntaxError> {
        let tree = self.parse(source)?;
        let mut report = AggregateReport::new();

        // Pre-order walk with an explicit stack so deep nesting cannot overflow
        let mut stack = vec![tree.root_node()];
        while let Some(node) = stack.pop() {
            if node.kind() == "class_definition" {
                self.visit_class(node, source, &mut report, observer);
            }
            let mut children = named_children(node);
            children.reverse();
            stack.extend(children);
        }

        Ok(report)
    }
}

fn create_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .context("Failed to load the Python grammar")?;
    Ok(parser)
}

fn node_text<'src>(node: Node<'_>, source: &'src str) -> &'src str {
    source.get(node.byte_range()).unwrap_or_default()
}

/// Named children without comments
fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Target and annotation of an annotated assignment to a plain identifier
fn annotated_target(stmt: Node<'_>) -> Option<(Node<'_>, Node<'_>)> {
    if stmt.kind() != "expression_statement" {
        return None;
    }
    let children = named_children(stmt);
    let [assignment] = children.as_slice() else {
        return None;
    };
    if assignment.kind() != "assignment" {
        return None;
    }

    let mut target = assignment.child_by_field_name("left")?;
    // `(x): int` still targets the name `x`
    while target.kind() == "parenthesized_expression" {
        let inner = named_children(target);
        let [only] = inner.as_slice() else {
            return None;
        };
        target = *only;
    }
    if target.kind() != "identifier" {
        return None;
    }
    let annotation = assignment.child_by_field_name("type")?;
    Some((target, annotation))
}

/// Reduce a base-class or annotation node to the shapes the classifier knows
fn lower_expr<'src>(node: Node<'_>, source: &'src str) -> Expr<'src> {
    match node.kind() {
        "identifier" => Expr::Name(node_text(node, source)),
        "attribute" => match node.child_by_field_name("attribute") {
            Some(attr) => Expr::Attribute(node_text(attr, source)),
            None => Expr::Other,
        },
        // `a.b` written in a type position
        "member_type" => match named_children(node).last() {
            Some(last) if last.kind() == "identifier" => Expr::Attribute(node_text(*last, source)),
            _ => Expr::Other,
        },
        "subscript" => match node.child_by_field_name("value") {
            Some(value) => Expr::Subscript(Box::new(lower_expr(value, source))),
            None => Expr::Other,
        },
        "generic_type" => match named_children(node).first() {
            Some(base) => Expr::Subscript(Box::new(lower_expr(*base, source))),
            None => Expr::Other,
        },
        "type" | "parenthesized_expression" => match named_children(node).as_slice() {
            [inner] => lower_expr(*inner, source),
            _ => Expr::Other,
        },
        _ => Expr::Other,
    }
}

/// Reject Python 2 statements and indentation that does not line up.
///
/// Statements of a block (or of the module) that start their own line must
/// all share one column; the module's start at column 0.
fn check_python3(root: Node<'_>) -> Result<(), SyntaxError> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "print_statement" => return Err(error_at(node, "Missing parentheses in call to 'print'")),
            "exec_statement" => return Err(error_at(node, "Missing parentheses in call to 'exec'")),
            "module" | "block" => check_indentation(node)?,
            _ => {}
        }
        let mut children = named_children(node);
        children.reverse();
        stack.extend(children);
    }
    Ok(())
}

fn check_indentation(body: Node<'_>) -> Result<(), SyntaxError> {
    let mut expected = (body.kind() == "module").then_some(0);
    let mut previous_end_row = None;

    let mut cursor = body.walk();
    for stmt in body.named_children(&mut cursor).filter(|child| !child.is_extra()) {
        let start = stmt.start_position();
        let starts_line = previous_end_row.is_none_or(|row| row < start.row);
        previous_end_row = Some(stmt.end_position().row);
        if !starts_line {
            continue;
        }

        match expected {
            None => expected = Some(start.column),
            Some(column) if column < start.column => return Err(error_at(stmt, "unexpected indent")),
            Some(column) if column > start.column => {
                return Err(error_at(stmt, "unindent does not match any outer indentation level"));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn error_at(node: Node<'_>, message: &str) -> SyntaxError {
    let position = node.start_position();
    SyntaxError {
        line: position.row + 1,
        column: position.column + 1,
        message: message.to_string(),
    }
}

fn first_syntax_error(root: Node<'_>, source: &str) -> SyntaxError {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let position = node.start_position();
            let message = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                let snippet: String = node_text(node, source)
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .chars()
                    .take(40)
                    .collect();
                format!("unexpected `{}`", snippet.trim())
            };
            return SyntaxError {
                line: position.row + 1,
                column: position.column + 1,
                message,
            };
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let mut children: Vec<_> = node.children(&mut cursor).collect();
        children.reverse();
        stack.extend(children);
    }

    SyntaxError {
        line: 1,
        column: 1,
        message: "invalid syntax".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::scanner::observer::NullObserver;
    use crate::schema::types::NumericField;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn extract(source: &str) -> AggregateReport {
        let extractor = StructuralExtractor::new("BaseModel").unwrap();
        extractor.extract(source, &mut NullObserver).unwrap()
    }

    #[test]
    fn test_keeps_only_numeric_fields() {
        let report = extract(
            r#"
from pydantic import BaseModel

class Item(BaseModel):
    x: int
    y: float
    z: str
    w: SomeOther
"#,
        );

        assert_eq!(report.class_names(), vec!["Item"]);
        assert_eq!(
            report.get("Item").unwrap(),
            &[NumericField::new("x", "int"), NumericField::new("y", "float")]
        );
    }

    #[test]
    fn test_no_schema_classes() {
        let report = extract(
            r#"
class Plain:
    x: int

class Other(object):
    y: float

def helper(a: int) -> float:
    return a / 2
"#,
        );
        assert!(report.is_empty());
    }

    #[test]
    fn test_qualified_base_and_subscript_resolves_to_container() {
        let report = extract(
            r#"
import pydantic
from typing import List

class Order(pydantic.BaseModel):
    items: List[int]
    total: float
"#,
        );

        assert_eq!(report.get("Order").unwrap(), &[NumericField::new("total", "float")]);
    }

    #[test_case("count: int = 0", Some("int") ; "with default")]
    #[test_case("ratio: builtins.float", Some("float") ; "attribute annotation")]
    #[test_case("value: int | None", None ; "union")]
    #[test_case("value: 'int'", None ; "string annotation")]
    #[test_case("value: Optional[int]", None ; "optional")]
    #[test_case("value: Integer", None ; "alias")]
    #[test_case("value = 3", None ; "plain assignment")]
    fn test_annotation_shapes(line: &str, expected: Option<&str>) {
        let source = format!("class M(BaseModel):\n    {}\n", line);
        let report = extract(&source);
        let found = report
            .get("M")
            .and_then(|fields| fields.first())
            .map(|f| f.type_tag.as_str());
        assert_eq!(found, expected);
    }

    #[test]
    fn test_ignores_methods_and_attribute_targets() {
        let report = extract(
            r#"
class Point(BaseModel):
    x: int

    def scale(self, factor: float) -> None:
        self.x: int = 0
        local: float = factor

    class Config:
        frozen: int = 1
"#,
        );

        assert_eq!(report.class_names(), vec!["Point"]);
        assert_eq!(report.get("Point").unwrap(), &[NumericField::new("x", "int")]);
    }

    #[test]
    fn test_nested_and_decorated_classes_in_preorder() {
        let report = extract(
            r#"
@dataclass_like
class Outer(BaseModel):
    a: int

    class Inner(BaseModel):
        b: float

    c: float

def factory():
    class Local(models.BaseModel, metaclass=Meta):
        d: int
    return Local
"#,
        );

        assert_eq!(report.class_names(), vec!["Outer", "Inner", "Local"]);
        assert_eq!(
            report.get("Outer").unwrap(),
            &[NumericField::new("a", "int"), NumericField::new("c", "float")]
        );
    }

    #[test]
    fn test_marker_in_keyword_argument_is_ignored() {
        let report = extract("class Odd(Base, metaclass=BaseModel):\n    x: int\n");
        assert!(report.is_empty());
    }

    #[test]
    fn test_custom_marker() {
        let extractor = StructuralExtractor::new("Schema").unwrap();
        let report = extractor
            .extract("class A(Schema):\n    n: int\nclass B(BaseModel):\n    m: int\n", &mut NullObserver)
            .unwrap();
        assert_eq!(report.class_names(), vec!["A"]);
    }

    #[test_case("class Broken(BaseModel:\n    x: int\n", 1 ; "unclosed base list")]
    #[test_case("class A(BaseModel):\n    x: int\n  y: float\n", 3 ; "dedent to unknown level")]
    #[test_case("class A(BaseModel):\n    class B(BaseModel):\n        x: int\n      y: int\n", 4 ; "partial dedent in nested class")]
    #[test_case("  x = 1\nclass A(BaseModel):\n    y: int\n", 1 ; "indented module")]
    #[test_case("print \"hello\"\nclass A(BaseModel):\n    x: int\n", 1 ; "print statement")]
    #[test_case("print >>f, 1\n", 1 ; "print chevron")]
    #[test_case("class A(BaseModel):\n    x: int\nexec \"code\"\n", 3 ; "exec statement")]
    #[test_case("x: int = 1 = 2\n", 1 ; "chained annotated assignment")]
    fn test_invalid_source_reports_position(source: &str, line: usize) {
        let extractor = StructuralExtractor::new("BaseModel").unwrap();
        let err = extractor.extract(source, &mut NullObserver).unwrap_err();
        assert_eq!(err.line, line);
        assert!(err.column >= 1);
    }

    #[test]
    fn test_valid_layouts_are_accepted() {
        let report = extract(
            r#"
import os; import sys

class A(BaseModel):
    x: int; y: float
    # a comment between fields
    z: float = (
        1.0
    )

    def f(self):
        if self.z: return 1
        print("python 3 call")
        return 2
"#,
        );
        assert_eq!(
            report.get("A").unwrap(),
            &[NumericField::new("x", "int"), NumericField::new("y", "float"), NumericField::new("z", "float")]
        );
    }

    #[test]
    fn test_parenthesized_target_is_a_field() {
        let report = extract("class A(BaseModel):\n    (y): int\n    ((z)): float\n    w = 1\n");
        assert_eq!(
            report.get("A").unwrap(),
            &[NumericField::new("y", "int"), NumericField::new("z", "float")]
        );
    }
}
