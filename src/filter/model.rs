//! # Filter Tree Model
//!
//! Wire filter model → `FilterNode` tree.
//!
//! The wire model maps each logical field to a condition object:
//!
//! ```json
//! {
//!   "name":   {"filterType": "text", "type": "contains", "filter": "ex"},
//!   "age":    {"filterType": "number", "operator": "OR", "conditions": [
//!               {"filterType": "number", "type": "lessThan", "filter": 18},
//!               {"filterType": "number", "type": "greaterThan", "filter": 65}
//!             ]},
//!   "status": {"filterType": "set", "values": ["active", "pending"]}
//! }
//! ```
//!
//! Top-level entries are ANDed in key order. Composite conditions use
//! `conditions: [...]` or the legacy `condition1` / `condition2` pair.

use std::fmt;

use serde_json::{Map, Value};

use crate::errors::{GridError, GridResult};

const FILTER_PARAM: &str = "filter";

/// Filter type of a leaf condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Text,
    Number,
    Date,
    Set,
    Boolean,
}

impl FilterType {
    /// Parse a wire `filterType`; unknown or missing types are unsupported
    pub fn parse(field: &str, raw: Option<&str>) -> GridResult<Self> {
        match raw {
            Some("text") => Ok(FilterType::Text),
            Some("number") => Ok(FilterType::Number),
            Some("date") => Ok(FilterType::Date),
            Some("set") => Ok(FilterType::Set),
            Some("boolean") => Ok(FilterType::Boolean),
            Some(other) => Err(GridError::unsupported_type(field, other)),
            None => Err(GridError::unsupported_type(field, "<missing>")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::Text => "text",
            FilterType::Number => "number",
            FilterType::Date => "date",
            FilterType::Set => "set",
            FilterType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Boolean combinator of a composite node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOp {
    And,
    Or,
}

impl CombineOp {
    /// Parse `AND` / `OR`, case-insensitive
    fn parse(field: &str, raw: &str) -> GridResult<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "AND" => Ok(CombineOp::And),
            "OR" => Ok(CombineOp::Or),
            _ => Err(GridError::malformed_json(
                FILTER_PARAM,
                format!("operator for '{}' must be AND or OR, got '{}'", field, raw),
            )),
        }
    }
}

/// A single field/operator/operand test
#[derive(Debug, Clone, PartialEq)]
pub struct LeafCondition {
    /// Logical (dotted) field name
    pub field: String,
    /// Raw `filterType`
    pub filter_type: Option<String>,
    /// Raw operator (`type`)
    pub operator: Option<String>,
    /// First operand (`filter`, or `dateFrom` for dates)
    pub operand: Option<Value>,
    /// Second operand (`filterTo`, or `dateTo` for dates)
    pub operand2: Option<Value>,
    /// Set filter values
    pub values: Option<Vec<Value>>,
    /// The condition as received
    pub raw: Value,
}

/// An AND/OR grouping of sibling nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub op: CombineOp,
    /// Children in wire order; never empty
    pub children: Vec<FilterNode>,
    /// Logical field when parsed from a per-field composite condition
    pub scope: Option<String>,
    /// The composite condition as received
    pub raw: Option<Value>,
}

/// Filter tree node
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Leaf(LeafCondition),
    Combination(Combination),
}

impl FilterNode {
    /// Parse the top-level filter model; `None` when it holds no conditions
    pub fn from_model(model: &Value) -> GridResult<Option<FilterNode>> {
        let entries = model.as_object().ok_or_else(|| {
            GridError::malformed_json(FILTER_PARAM, "expected an object keyed by field")
        })?;

        let children = entries
            .iter()
            .map(|(field, condition)| Self::from_condition(field, condition, None))
            .collect::<GridResult<Vec<_>>>()?;

        if children.is_empty() {
            return Ok(None);
        }

        Ok(Some(FilterNode::Combination(Combination {
            op: CombineOp::And,
            children,
            scope: None,
            raw: None,
        })))
    }

    /// Parse one field's condition, leaf or composite
    pub fn from_condition(
        field: &str,
        condition: &Value,
        inherited_type: Option<&str>,
    ) -> GridResult<FilterNode> {
        let object = condition.as_object().ok_or_else(|| {
            GridError::malformed_json(
                FILTER_PARAM,
                format!("condition for '{}' must be an object", field),
            )
        })?;

        let filter_type = match object.get("filterType") {
            None | Some(Value::Null) => inherited_type.map(str::to_string),
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(GridError::malformed_json(
                    FILTER_PARAM,
                    format!("filterType for '{}' must be a string", field),
                ))
            }
        };

        if Self::is_composite(object) {
            return Self::composite(field, condition, object, filter_type.as_deref());
        }

        Self::leaf(field, condition, object, filter_type)
    }

    fn is_composite(object: &Map<String, Value>) -> bool {
        object.contains_key("operator")
            && (object.contains_key("conditions") || object.contains_key("condition1"))
    }

    fn composite(
        field: &str,
        raw: &Value,
        object: &Map<String, Value>,
        filter_type: Option<&str>,
    ) -> GridResult<FilterNode> {
        let op = match object.get("operator") {
            Some(Value::String(s)) => CombineOp::parse(field, s)?,
            _ => {
                return Err(GridError::malformed_json(
                    FILTER_PARAM,
                    format!("operator for '{}' must be a string", field),
                ))
            }
        };

        let conditions: Vec<&Value> = match object.get("conditions") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(_) => {
                return Err(GridError::malformed_json(
                    FILTER_PARAM,
                    format!("conditions for '{}' must be an array", field),
                ))
            }
            None => ["condition1", "condition2"]
                .iter()
                .filter_map(|key| object.get(*key))
                .filter(|v| !v.is_null())
                .collect(),
        };

        if conditions.is_empty() {
            return Err(GridError::malformed_json(
                FILTER_PARAM,
                format!("composite condition for '{}' has no conditions", field),
            ));
        }

        let children = conditions
            .into_iter()
            .map(|c| Self::from_condition(field, c, filter_type))
            .collect::<GridResult<Vec<_>>>()?;

        Ok(FilterNode::Combination(Combination {
            op,
            children,
            scope: Some(field.to_string()),
            raw: Some(raw.clone()),
        }))
    }

    fn leaf(
        field: &str,
        raw: &Value,
        object: &Map<String, Value>,
        filter_type: Option<String>,
    ) -> GridResult<FilterNode> {
        let operator = match object.get("type") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(GridError::malformed_json(
                    FILTER_PARAM,
                    format!("type for '{}' must be a string", field),
                ))
            }
        };

        let present = |key: &str| object.get(key).filter(|v| !v.is_null()).cloned();

        let (operand, operand2) = if filter_type.as_deref() == Some("date") {
            (
                present("dateFrom").or_else(|| present("filter")),
                present("dateTo").or_else(|| present("filterTo")),
            )
        } else {
            (present("filter"), present("filterTo"))
        };

        let values = match object.get("values") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(items.clone()),
            Some(_) => {
                return Err(GridError::malformed_json(
                    FILTER_PARAM,
                    format!("values for '{}' must be an array", field),
                ))
            }
        };

        Ok(FilterNode::Leaf(LeafCondition {
            field: field.to_string(),
            filter_type,
            operator,
            operand,
            operand2,
            values,
            raw: raw.clone(),
        }))
    }

    /// Logical field this subtree filters on, if it targets exactly one
    pub fn field_scope(&self) -> Option<&str> {
        match self {
            FilterNode::Leaf(leaf) => Some(&leaf.field),
            FilterNode::Combination(c) => c.scope.as_deref(),
        }
    }

    /// Wire condition of this subtree, as handed to custom filters
    pub fn raw_condition(&self) -> Option<&Value> {
        match self {
            FilterNode::Leaf(leaf) => Some(&leaf.raw),
            FilterNode::Combination(c) => c.raw.as_ref(),
        }
    }

    /// Number of leaf conditions in the subtree
    pub fn leaf_count(&self) -> usize {
        match self {
            FilterNode::Leaf(_) => 1,
            FilterNode::Combination(c) => c.children.iter().map(FilterNode::leaf_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root_children(model: Value) -> Vec<FilterNode> {
        match FilterNode::from_model(&model).unwrap() {
            Some(FilterNode::Combination(c)) => {
                assert_eq!(c.op, CombineOp::And);
                assert!(c.scope.is_none());
                c.children
            }
            other => panic!("expected root combination, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_model_is_none() {
        assert!(FilterNode::from_model(&json!({})).unwrap().is_none());
    }

    #[test]
    fn test_non_object_model_is_malformed() {
        let err = FilterNode::from_model(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, GridError::MalformedFilterJson { .. }));
    }

    #[test]
    fn test_text_leaf() {
        let children = root_children(json!({
            "name": {"filterType": "text", "type": "contains", "filter": "ex"}
        }));

        let FilterNode::Leaf(leaf) = &children[0] else {
            panic!("expected leaf");
        };
        assert_eq!(leaf.field, "name");
        assert_eq!(leaf.filter_type.as_deref(), Some("text"));
        assert_eq!(leaf.operator.as_deref(), Some("contains"));
        assert_eq!(leaf.operand, Some(json!("ex")));
    }

    #[test]
    fn test_date_leaf_reads_date_from_and_to() {
        let children = root_children(json!({
            "created": {"filterType": "date", "type": "inRange",
                        "dateFrom": "2023-01-01", "dateTo": "2023-12-31"}
        }));

        let FilterNode::Leaf(leaf) = &children[0] else {
            panic!("expected leaf");
        };
        assert_eq!(leaf.operand, Some(json!("2023-01-01")));
        assert_eq!(leaf.operand2, Some(json!("2023-12-31")));
    }

    #[test]
    fn test_top_level_keeps_key_order() {
        let children = root_children(json!({
            "zeta": {"filterType": "text", "type": "equals", "filter": "z"},
            "alpha": {"filterType": "text", "type": "equals", "filter": "a"}
        }));

        let fields: Vec<_> = children.iter().filter_map(FilterNode::field_scope).collect();
        assert_eq!(fields, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_composite_conditions() {
        let children = root_children(json!({
            "age": {"filterType": "number", "operator": "or", "conditions": [
                {"type": "lessThan", "filter": 18},
                {"filterType": "number", "type": "greaterThan", "filter": 65}
            ]}
        }));

        let FilterNode::Combination(c) = &children[0] else {
            panic!("expected combination");
        };
        assert_eq!(c.op, CombineOp::Or);
        assert_eq!(c.scope.as_deref(), Some("age"));
        assert_eq!(c.children.len(), 2);

        // filterType is inherited by children that omit it
        let FilterNode::Leaf(first) = &c.children[0] else {
            panic!("expected leaf");
        };
        assert_eq!(first.filter_type.as_deref(), Some("number"));
        assert_eq!(first.field, "age");
    }

    #[test]
    fn test_legacy_condition_pair() {
        let children = root_children(json!({
            "name": {"filterType": "text", "operator": "AND",
                     "condition1": {"filterType": "text", "type": "startsWith", "filter": "a"},
                     "condition2": {"filterType": "text", "type": "endsWith", "filter": "z"}}
        }));

        assert_eq!(children[0].leaf_count(), 2);
    }

    #[test]
    fn test_empty_composite_is_malformed() {
        let err = FilterNode::from_model(&json!({
            "age": {"filterType": "number", "operator": "AND", "conditions": []}
        }))
        .unwrap_err();
        assert!(matches!(err, GridError::MalformedFilterJson { .. }));
    }

    #[test]
    fn test_bad_operator_is_malformed() {
        let err = FilterNode::from_model(&json!({
            "age": {"filterType": "number", "operator": "XOR", "conditions": [
                {"type": "equals", "filter": 1}
            ]}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("XOR"));
    }

    #[test]
    fn test_non_object_condition_is_malformed() {
        let err = FilterNode::from_model(&json!({"name": "ex"})).unwrap_err();
        assert!(matches!(err, GridError::MalformedFilterJson { .. }));
    }

    #[test]
    fn test_filter_type_parse() {
        assert_eq!(FilterType::parse("a", Some("set")).unwrap(), FilterType::Set);
        assert!(matches!(
            FilterType::parse("a", Some("geo")),
            Err(GridError::UnsupportedFilterType { .. })
        ));
        assert!(FilterType::parse("a", None).is_err());
    }
}
