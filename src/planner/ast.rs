//! Query AST structures
//!
//! `Predicate` is the data source's native combinator form: field lookups on
//! storage paths, composed with NOT / AND / OR. `Predicate::All` is the absent
//! condition and is dropped from both AND and OR folds.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{GridError, GridResult};

/// Case policy for substring lookups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    Sensitive,
    #[default]
    Insensitive,
}

/// Lookup applied to one storage path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// field = value
    Exact,
    /// field < value
    Lt,
    /// field <= value
    Lte,
    /// field > value
    Gt,
    /// field >= value
    Gte,
    /// field in [values]
    In,
    /// value is a substring of field
    Contains,
    /// field starts with value
    StartsWith,
    /// field ends with value
    EndsWith,
    /// calendar date of field = value
    Date,
}

impl Lookup {
    /// Returns the lookup name in storage-path syntax
    pub fn name(&self, case: CaseSensitivity) -> &'static str {
        let insensitive = case == CaseSensitivity::Insensitive;
        match self {
            Lookup::Exact => "exact",
            Lookup::Lt => "lt",
            Lookup::Lte => "lte",
            Lookup::Gt => "gt",
            Lookup::Gte => "gte",
            Lookup::In => "in",
            Lookup::Contains if insensitive => "icontains",
            Lookup::Contains => "contains",
            Lookup::StartsWith if insensitive => "istartswith",
            Lookup::StartsWith => "startswith",
            Lookup::EndsWith if insensitive => "iendswith",
            Lookup::EndsWith => "endswith",
            Lookup::Date => "date",
        }
    }
}

/// A single lookup against a resolved storage path
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    /// Resolved storage path
    pub path: String,
    /// Lookup operation
    pub lookup: Lookup,
    /// Operand (an array for `In`)
    pub value: Value,
    /// Case policy, meaningful for substring lookups only
    pub case: CaseSensitivity,
}

/// Predicate in the data source's combinator form
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// No condition
    All,
    /// Matches no record
    Nothing,
    /// Field lookup
    Field(FieldPredicate),
    /// Negation
    Not(Box<Predicate>),
    /// Conjunction, children in order
    And(Vec<Predicate>),
    /// Disjunction, children in order
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Create a case-sensitive field lookup
    pub fn field(path: impl Into<String>, lookup: Lookup, value: Value) -> Self {
        Predicate::Field(FieldPredicate {
            path: path.into(),
            lookup,
            value,
            case: CaseSensitivity::Sensitive,
        })
    }

    /// Create a substring lookup with an explicit case policy
    pub fn text(
        path: impl Into<String>,
        lookup: Lookup,
        value: impl Into<String>,
        case: CaseSensitivity,
    ) -> Self {
        Predicate::Field(FieldPredicate {
            path: path.into(),
            lookup,
            value: Value::String(value.into()),
            case,
        })
    }

    /// Create an equality predicate
    pub fn exact(path: impl Into<String>, value: Value) -> Self {
        Self::field(path, Lookup::Exact, value)
    }

    /// Create a membership predicate; an empty list matches nothing
    pub fn in_list(path: impl Into<String>, values: Vec<Value>) -> Self {
        if values.is_empty() {
            return Predicate::Nothing;
        }
        Self::field(path, Lookup::In, Value::Array(values))
    }

    /// Negate; the absent condition stays absent
    pub fn negate(self) -> Self {
        match self {
            Predicate::All => Predicate::All,
            Predicate::Nothing => Predicate::All,
            Predicate::Not(inner) => *inner,
            other => Predicate::Not(Box::new(other)),
        }
    }

    /// Fold predicates with AND, left to right
    pub fn all_of(predicates: Vec<Predicate>) -> Self {
        let mut kept = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            match predicate {
                Predicate::All => {}
                Predicate::Nothing => return Predicate::Nothing,
                other => kept.push(other),
            }
        }
        Self::collapse(kept, Predicate::And)
    }

    /// Fold predicates with OR, left to right
    ///
    /// `Nothing` adds no rows to a disjunction; it survives only when every
    /// child is `Nothing`.
    pub fn any_of(predicates: Vec<Predicate>) -> Self {
        let mut kept = Vec::with_capacity(predicates.len());
        let mut saw_nothing = false;
        for predicate in predicates {
            match predicate {
                Predicate::All => {}
                Predicate::Nothing => saw_nothing = true,
                other => kept.push(other),
            }
        }
        if kept.is_empty() && saw_nothing {
            return Predicate::Nothing;
        }
        Self::collapse(kept, Predicate::Or)
    }

    fn collapse(mut kept: Vec<Predicate>, wrap: fn(Vec<Predicate>) -> Predicate) -> Self {
        match kept.len() {
            0 => Predicate::All,
            1 => kept.remove(0),
            _ => wrap(kept),
        }
    }

    /// Returns true for the absent condition
    pub fn is_identity(&self) -> bool {
        matches!(self, Predicate::All)
    }

    /// Storage paths referenced by this predicate, in order
    pub fn paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::All | Predicate::Nothing => {}
            Predicate::Field(f) => out.push(&f.path),
            Predicate::Not(inner) => inner.collect_paths(out),
            Predicate::And(children) | Predicate::Or(children) => {
                for child in children {
                    child.collect_paths(out);
                }
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::All => write!(f, "ALL"),
            Predicate::Nothing => write!(f, "NOTHING"),
            Predicate::Field(p) => write!(f, "{}__{}={}", p.path, p.lookup.name(p.case), p.value),
            Predicate::Not(inner) => write!(f, "NOT ({})", inner),
            Predicate::And(children) => write_joined(f, children, " AND "),
            Predicate::Or(children) => write_joined(f, children, " OR "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[Predicate], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", child)?;
    }
    write!(f, ")")
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Sort entry on a logical field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Logical (dotted) field
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Ordering term on a resolved storage path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub path: String,
    pub direction: SortDirection,
}

impl fmt::Display for OrderTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Asc => write!(f, "{}", self.path),
            SortDirection::Desc => write!(f, "-{}", self.path),
        }
    }
}

/// Zero-based row range, `end` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    start: usize,
    end: usize,
}

impl RowRange {
    /// Create a range; requires `0 <= start < end`
    pub fn new(start: i64, end: i64) -> GridResult<Self> {
        if start < 0 {
            return Err(GridError::InvalidRange(format!(
                "startRow must be non-negative, got {}",
                start
            )));
        }
        if end <= start {
            return Err(GridError::InvalidRange(format!(
                "endRow ({}) must be greater than startRow ({})",
                end, start
            )));
        }
        Ok(Self {
            start: start as usize,
            end: end as usize,
        })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Maximum number of rows the range can yield
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false; a valid range holds at least one row
    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_of_drops_identity() {
        let p = Predicate::all_of(vec![
            Predicate::All,
            Predicate::exact("name", json!("a")),
            Predicate::All,
        ]);
        assert_eq!(p, Predicate::exact("name", json!("a")));

        assert!(Predicate::all_of(vec![Predicate::All]).is_identity());
    }

    #[test]
    fn test_all_of_nothing_dominates() {
        let p = Predicate::all_of(vec![
            Predicate::exact("name", json!("a")),
            Predicate::Nothing,
        ]);
        assert_eq!(p, Predicate::Nothing);
    }

    #[test]
    fn test_any_of_preserves_order() {
        let a = Predicate::exact("a", json!(1));
        let b = Predicate::exact("b", json!(2));
        let p = Predicate::any_of(vec![a.clone(), Predicate::Nothing, b.clone()]);
        assert_eq!(p, Predicate::Or(vec![a, b]));

        assert_eq!(
            Predicate::any_of(vec![Predicate::Nothing, Predicate::Nothing]),
            Predicate::Nothing
        );
    }

    #[test]
    fn test_negate() {
        let a = Predicate::exact("a", json!(1));
        assert_eq!(a.clone().negate().negate(), a);
        assert!(Predicate::All.negate().is_identity());
    }

    #[test]
    fn test_empty_in_list_is_nothing() {
        assert_eq!(Predicate::in_list("status", vec![]), Predicate::Nothing);
    }

    #[test]
    fn test_display_uses_lookup_syntax() {
        let p = Predicate::all_of(vec![
            Predicate::text("name", Lookup::Contains, "ex", CaseSensitivity::Insensitive),
            Predicate::field("author__age", Lookup::Gte, json!(30)).negate(),
        ]);
        assert_eq!(
            p.to_string(),
            r#"(name__icontains="ex" AND NOT (author__age__gte=30))"#
        );
    }

    #[test]
    fn test_paths() {
        let p = Predicate::any_of(vec![
            Predicate::exact("a", json!(1)),
            Predicate::exact("b__c", json!(2)).negate(),
        ]);
        assert_eq!(p.paths(), vec!["a", "b__c"]);
    }

    #[test]
    fn test_row_range_validation() {
        let range = RowRange::new(100, 200).unwrap();
        assert_eq!(range.start(), 100);
        assert_eq!(range.len(), 100);

        assert!(matches!(RowRange::new(-1, 10), Err(GridError::InvalidRange(_))));
        assert!(matches!(RowRange::new(10, 10), Err(GridError::InvalidRange(_))));
        assert!(matches!(RowRange::new(10, 5), Err(GridError::InvalidRange(_))));
    }

    #[test]
    fn test_order_term_display() {
        let term = OrderTerm {
            path: "author__name".to_string(),
            direction: SortDirection::Desc,
        };
        assert_eq!(term.to_string(), "-author__name");
    }
}
