//! Filter tree compilation
//!
//! Recursive descent over `FilterNode`. Leaves owned by the custom provider
//! are set aside and applied to the query directly; every other leaf is
//! compiled to a predicate and folded with its siblings in wire order.
//!
//! The whole tree is compiled before the query is touched, so a bad leaf
//! anywhere fails the request without running any custom filter.

use serde_json::Value;

use super::condition::ConditionCompiler;
use super::custom::CustomPredicateProvider;
use super::model::{CombineOp, FilterNode};
use crate::config::EngineConfig;
use crate::core::RequestContext;
use crate::errors::{GridError, GridResult};
use crate::observability::{Event, Logger};
use crate::planner::{FieldPathResolver, Predicate};
use crate::query::Queryable;

/// Compiles filter trees and applies them to queries
#[derive(Debug, Clone)]
pub struct FilterTreeCompiler {
    resolver: FieldPathResolver,
    conditions: ConditionCompiler,
    distinct_after_filter: bool,
    logger: Logger,
}

/// Subtree routed to the custom provider
struct CustomNode<'t> {
    field: &'t str,
    condition: &'t Value,
}

impl FilterTreeCompiler {
    pub fn new(config: &EngineConfig, logger: Logger) -> Self {
        Self {
            resolver: FieldPathResolver::new(config.path_delimiter.clone()),
            conditions: ConditionCompiler::new(config.text_case),
            distinct_after_filter: config.distinct_after_filter,
            logger,
        }
    }

    /// Apply a filter tree; `None` leaves the query unchanged
    ///
    /// Custom filters run first, in wire order. The default predicate is
    /// then applied once, followed by `distinct()` when configured.
    pub fn apply<Q: Queryable>(
        &self,
        tree: Option<&FilterNode>,
        query: Q,
        custom: &dyn CustomPredicateProvider<Q>,
        ctx: &RequestContext,
    ) -> GridResult<Q> {
        let tree = match tree {
            Some(tree) => tree,
            None => return Ok(query),
        };

        let mut routed = Vec::new();
        let predicate =
            self.compile_node(tree, false, &|field: &str| custom.handles(field), &mut routed)?;

        let mut query = query;
        for node in routed {
            let resolved = self.resolver.resolve(node.field);
            query = custom.apply(node.field, &resolved, node.condition, query, ctx)?;
            self.logger.info(
                Event::CustomFilterApplied,
                &[
                    ("request_id", Value::from(ctx.request_id.to_string())),
                    ("field", Value::from(node.field)),
                    ("path", Value::from(resolved)),
                ],
            );
        }

        if predicate.is_identity() {
            return Ok(query);
        }

        self.logger.info(
            Event::FilterApplied,
            &[
                ("request_id", Value::from(ctx.request_id.to_string())),
                ("predicate", Value::from(predicate.to_string())),
                ("distinct", Value::from(self.distinct_after_filter)),
            ],
        );

        let query = query.filter(predicate);
        if self.distinct_after_filter {
            Ok(query.distinct())
        } else {
            Ok(query)
        }
    }

    /// Compile a tree without custom filters
    pub fn predicate(&self, tree: &FilterNode) -> GridResult<Predicate> {
        let mut routed = Vec::new();
        self.compile_node(tree, false, &|_: &str| false, &mut routed)
    }

    fn compile_node<'t>(
        &self,
        node: &'t FilterNode,
        in_disjunction: bool,
        handles: &dyn Fn(&str) -> bool,
        routed: &mut Vec<CustomNode<'t>>,
    ) -> GridResult<Predicate> {
        if let Some(field) = node.field_scope().filter(|field| handles(*field)) {
            if in_disjunction {
                return Err(GridError::CustomFilterInDisjunction(field.to_string()));
            }
            if let Some(condition) = node.raw_condition() {
                routed.push(CustomNode { field, condition });
                return Ok(Predicate::All);
            }
        }

        match node {
            FilterNode::Leaf(leaf) => {
                let path = self.resolver.resolve(&leaf.field);
                self.conditions.compile(leaf, &path)
            }
            FilterNode::Combination(combination) => {
                let disjunction = in_disjunction || combination.op == CombineOp::Or;
                let children = combination
                    .children
                    .iter()
                    .map(|child| self.compile_node(child, disjunction, handles, routed))
                    .collect::<GridResult<Vec<_>>>()?;

                Ok(match combination.op {
                    CombineOp::And => Predicate::all_of(children),
                    CombineOp::Or => Predicate::any_of(children),
                })
            }
        }
    }
}
