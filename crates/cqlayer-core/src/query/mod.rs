//! Query model: resource, predicate tree, projection and paging.

mod eval;
mod evaluator;


use crate::{error::InternalError, value::Value};
use std::collections::BTreeSet;

// re-exports
pub use eval::{FieldSource, matches};
pub use evaluator::{Evaluator, EvaluatorKind, FieldEvaluator, Operand};

///
/// LeafId
///
/// Depth-first position of a field evaluator inside a query's predicate.
/// Identifies evaluators by tree position, so two structurally equal
/// evaluators are still distinct.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct LeafId(pub usize);

///
/// ReturnField
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReturnField {
    pub name: String,
    pub alias: Option<String>,
}

impl ReturnField {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    #[must_use]
    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }
}

///
/// Query
///
/// Declarative query against one resource. The root predicate is an
/// implicit conjunction of `predicate`. Builder methods consume and return
/// the query; the resource cannot be changed after construction.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    resource: String,
    predicate: Vec<Evaluator>,
    fields: Vec<ReturnField>,
    limit: Option<u32>,
    start: Option<u32>,
}

impl Query {
    #[must_use]
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            predicate: Vec::new(),
            fields: Vec::new(),
            limit: None,
            start: None,
        }
    }

    /// AND an evaluator into the root conjunction.
    #[must_use]
    pub fn filter(mut self, evaluator: Evaluator) -> Self {
        self.predicate.push(evaluator);
        self
    }

    /// Request a return field. No requested fields means all columns.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(ReturnField::new(name));
        self
    }

    #[must_use]
    pub fn field_as(mut self, name: impl Into<String>, alias: impl Into<String>) -> Self {
        self.fields.push(ReturnField::aliased(name, alias));
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    #[must_use]
    pub fn predicate(&self) -> &[Evaluator] {
        &self.predicate
    }

    #[must_use]
    pub fn fields(&self) -> &[ReturnField] {
        &self.fields
    }

    #[must_use]
    pub const fn limit_value(&self) -> Option<u32> {
        self.limit
    }

    #[must_use]
    pub const fn start_value(&self) -> Option<u32> {
        self.start
    }

    #[must_use]
    pub fn has_predicate(&self) -> bool {
        !self.predicate.is_empty()
    }

    /// Field evaluators reachable from the root through `And` nodes only,
    /// tagged with their depth-first position. Leaves under `Or` consume an
    /// id but are not yielded.
    #[must_use]
    pub fn conjunctive_leaves(&self) -> Vec<(LeafId, &FieldEvaluator)> {
        let mut next = 0;
        let mut out = Vec::new();
        for evaluator in &self.predicate {
            collect_conjunctive(evaluator, &mut next, &mut out);
        }

        out
    }

    /// Copy of this query with every evaluator in `pushed` removed.
    /// `And` groups left empty are dropped; `Or` groups are kept whole.
    #[must_use]
    pub fn reduce(&self, pushed: &BTreeSet<LeafId>) -> Self {
        let mut next = 0;
        let predicate = self
            .predicate
            .iter()
            .filter_map(|evaluator| prune(evaluator, pushed, &mut next))
            .collect();

        Self {
            resource: self.resource.clone(),
            predicate,
            fields: self.fields.clone(),
            limit: self.limit,
            start: self.start,
        }
    }

    /// Copy of this query with every parameter operand resolved.
    pub fn bind(&self, params: &[Value]) -> Result<Self, InternalError> {
        let predicate = self
            .predicate
            .iter()
            .map(|evaluator| evaluator.bind(params))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            predicate,
            ..self.clone()
        })
    }
}

fn collect_conjunctive<'a>(
    evaluator: &'a Evaluator,
    next: &mut usize,
    out: &mut Vec<(LeafId, &'a FieldEvaluator)>,
) {
    match evaluator {
        Evaluator::Field(field) => {
            out.push((LeafId(*next), field));
            *next += 1;
        }
        Evaluator::And(children) => {
            for child in children {
                collect_conjunctive(child, next, out);
            }
        }
        Evaluator::Or(_) => *next += evaluator.leaf_count(),
    }
}

fn prune(evaluator: &Evaluator, pushed: &BTreeSet<LeafId>, next: &mut usize) -> Option<Evaluator> {
    match evaluator {
        Evaluator::Field(_) => {
            let id = LeafId(*next);
            *next += 1;

            (!pushed.contains(&id)).then(|| evaluator.clone())
        }
        Evaluator::And(children) => {
            let kept: Vec<_> = children
                .iter()
                .filter_map(|child| prune(child, pushed, next))
                .collect();

            (!kept.is_empty()).then_some(Evaluator::And(kept))
        }
        Evaluator::Or(_) => {
            *next += evaluator.leaf_count();
            Some(evaluator.clone())
        }
    }
}
