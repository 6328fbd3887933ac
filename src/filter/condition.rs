//! Leaf condition compilation
//!
//! One `(filterType, operator, operand)` triple on a resolved storage path
//! becomes one `Predicate`. Compilation is pure; an operand left empty by a
//! half-typed UI condition compiles to `Predicate::All`.

use serde_json::{Number, Value};

use super::model::{FilterType, LeafCondition};
use crate::errors::{GridError, GridResult};
use crate::planner::temporal::parse_temporal;
use crate::planner::{CaseSensitivity, Lookup, Predicate};

/// Compiles leaf conditions to predicates
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionCompiler {
    case: CaseSensitivity,
}

impl ConditionCompiler {
    pub fn new(case: CaseSensitivity) -> Self {
        Self { case }
    }

    /// Compile a leaf against its resolved storage path
    pub fn compile(&self, leaf: &LeafCondition, path: &str) -> GridResult<Predicate> {
        let filter_type = FilterType::parse(&leaf.field, leaf.filter_type.as_deref())?;

        match filter_type {
            FilterType::Text => self.compile_text(leaf, path),
            FilterType::Number => Self::compile_number(leaf, path),
            FilterType::Date => Self::compile_date(leaf, path),
            FilterType::Set => Ok(Self::compile_set(leaf, path)),
            FilterType::Boolean => Self::compile_boolean(leaf, path),
        }
    }

    fn compile_text(&self, leaf: &LeafCondition, path: &str) -> GridResult<Predicate> {
        let operator = Self::operator(leaf, FilterType::Text)?;
        let lookup = match operator {
            "equals" | "notEqual" => Lookup::Exact,
            "contains" | "notContains" => Lookup::Contains,
            "startsWith" => Lookup::StartsWith,
            "endsWith" => Lookup::EndsWith,
            other => return Err(GridError::unsupported_operator(&leaf.field, "text", other)),
        };

        let value = match text_operand(&leaf.field, leaf.operand.as_ref())? {
            Some(value) => value,
            None => return Ok(Predicate::All),
        };

        let predicate = if lookup == Lookup::Exact {
            Predicate::exact(path, Value::String(value))
        } else {
            Predicate::text(path, lookup, value, self.case)
        };

        Ok(match operator {
            "notEqual" | "notContains" => predicate.negate(),
            _ => predicate,
        })
    }

    fn compile_number(leaf: &LeafCondition, path: &str) -> GridResult<Predicate> {
        let operator = Self::operator(leaf, FilterType::Number)?;
        let lookup = match operator {
            "equals" | "notEqual" => Lookup::Exact,
            "lessThan" => Lookup::Lt,
            "lessThanOrEqual" => Lookup::Lte,
            "greaterThan" => Lookup::Gt,
            "greaterThanOrEqual" => Lookup::Gte,
            "inRange" => Lookup::Gte,
            other => return Err(GridError::unsupported_operator(&leaf.field, "number", other)),
        };

        let value = match number_operand(&leaf.field, leaf.operand.as_ref())? {
            Some(value) => value,
            None => return Ok(Predicate::All),
        };

        match operator {
            "notEqual" => Ok(Predicate::exact(path, value).negate()),
            "inRange" => match number_operand(&leaf.field, leaf.operand2.as_ref())? {
                Some(upper) => Ok(inclusive_range(path, value, upper)),
                None => Ok(Predicate::All),
            },
            _ => Ok(Predicate::field(path, lookup, value)),
        }
    }

    fn compile_date(leaf: &LeafCondition, path: &str) -> GridResult<Predicate> {
        let operator = Self::operator(leaf, FilterType::Date)?;
        let lookup = match operator {
            "equals" | "notEqual" => Lookup::Date,
            "lessThan" => Lookup::Lt,
            "greaterThan" => Lookup::Gt,
            "inRange" => Lookup::Gte,
            other => return Err(GridError::unsupported_operator(&leaf.field, "date", other)),
        };

        let value = match date_operand(&leaf.field, leaf.operand.as_ref())? {
            Some(value) => value,
            None => return Ok(Predicate::All),
        };

        match operator {
            "notEqual" => Ok(Predicate::field(path, Lookup::Date, value).negate()),
            "inRange" => match date_operand(&leaf.field, leaf.operand2.as_ref())? {
                Some(upper) => Ok(inclusive_range(path, value, upper)),
                None => Ok(Predicate::All),
            },
            _ => Ok(Predicate::field(path, lookup, value)),
        }
    }

    /// Set filters ignore the operator; no values means no match
    fn compile_set(leaf: &LeafCondition, path: &str) -> Predicate {
        let values = leaf.values.clone().unwrap_or_default();
        Predicate::in_list(path, values)
    }

    fn compile_boolean(leaf: &LeafCondition, path: &str) -> GridResult<Predicate> {
        match leaf.operator.as_deref() {
            None | Some("equals") => {}
            Some(other) => {
                return Err(GridError::unsupported_operator(&leaf.field, "boolean", other))
            }
        }

        let value = match leaf.operand.as_ref() {
            None | Some(Value::Null) => return Ok(Predicate::All),
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) if s.is_empty() => return Ok(Predicate::All),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
            Some(other) => {
                return Err(GridError::malformed_filter(
                    &leaf.field,
                    format!("expected a boolean, got {}", other),
                ))
            }
        };

        Ok(Predicate::exact(path, Value::Bool(value)))
    }

    fn operator(leaf: &LeafCondition, filter_type: FilterType) -> GridResult<&str> {
        leaf.operator.as_deref().ok_or_else(|| {
            GridError::malformed_filter(
                &leaf.field,
                format!("{} filter is missing its type", filter_type),
            )
        })
    }
}

fn inclusive_range(path: &str, lower: Value, upper: Value) -> Predicate {
    Predicate::all_of(vec![
        Predicate::field(path, Lookup::Gte, lower),
        Predicate::field(path, Lookup::Lte, upper),
    ])
}

fn text_operand(field: &str, operand: Option<&Value>) -> GridResult<Option<String>> {
    match operand {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(GridError::malformed_filter(
            field,
            format!("expected a string, got {}", other),
        )),
    }
}

fn number_operand(field: &str, operand: Option<&Value>) -> GridResult<Option<Value>> {
    match operand {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(Value::Number(n.clone()))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse_number(s.trim()).map(Some).ok_or_else(|| {
            GridError::malformed_filter(field, format!("expected a number, got \"{}\"", s))
        }),
        Some(other) => Err(GridError::malformed_filter(
            field,
            format!("expected a number, got {}", other),
        )),
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(i) = raw.parse::<i64>() {
        return Some(Value::Number(i.into()));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn date_operand(field: &str, operand: Option<&Value>) -> GridResult<Option<Value>> {
    match operand {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => match parse_temporal(s) {
            Some(_) => Ok(Some(Value::String(s.trim().to_string()))),
            None => Err(GridError::malformed_filter(
                field,
                format!("cannot parse date \"{}\"", s),
            )),
        },
        Some(other) => Err(GridError::malformed_filter(
            field,
            format!("expected a date string, got {}", other),
        )),
    }
}
