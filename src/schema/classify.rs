//! Syntactic rules shared by the extraction backends.
//!
//! Nothing here resolves imports or aliases. A base class that happens to be
//! spelled like the marker is accepted even if it comes from an unrelated
//! module, and a class that only reaches the marker through an intermediate
//! subclass is rejected.

/// Type tags that make a field numeric
pub const NUMERIC_TAGS: [&str; 2] = ["int", "float"];

/// The expression shapes the classifier and resolver distinguish
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr<'src> {
    /// A bare identifier, `BaseModel` or `int`
    Name(&'src str),

    /// A dotted reference, holding only its final component (`pydantic.BaseModel` -> `BaseModel`)
    Attribute(&'src str),

    /// A subscripted or generic expression, holding the subscripted base (`List[int]` -> `List`)
    Subscript(Box<Expr<'src>>),

    /// Anything else: calls, strings, unions, keyword arguments
    Other,
}

/// Whether a base-class expression names the marker
pub fn is_schema_base(expr: &Expr<'_>, marker: &str) -> bool {
    match expr {
        Expr::Name(name) | Expr::Attribute(name) => *name == marker,
        Expr::Subscript(_) | Expr::Other => false,
    }
}

/// Resolve an annotation to its type tag.
///
/// Subscripts resolve one level deep to their base, so `List[int]` yields
/// `List` and `Optional[float]` yields `Optional`.
pub fn resolve_type_tag<'src>(annotation: &Expr<'src>) -> Option<&'src str> {
    match annotation {
        Expr::Name(name) | Expr::Attribute(name) => Some(*name),
        Expr::Subscript(base) => match base.as_ref() {
            Expr::Name(name) | Expr::Attribute(name) => Some(*name),
            Expr::Subscript(_) | Expr::Other => None,
        },
        Expr::Other => None,
    }
}

pub fn is_numeric_tag(tag: &str) -> bool {
    NUMERIC_TAGS.contains(&tag)
}

/// Resolve an annotation and keep it only if it is numeric
pub fn numeric_tag<'src>(annotation: &Expr<'src>) -> Option<&'src str> {
    resolve_type_tag(annotation).filter(|tag| is_numeric_tag(tag))
}
