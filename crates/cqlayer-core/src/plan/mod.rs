//! Predicate pushdown planning.
//!
//! Splits a query's predicate into native WHERE fragments over key and
//! indexed columns, and a residual query evaluated client side.

mod keys;

#[cfg(test)]
mod tests;

use crate::{
    error::InternalError,
    naming::Naming,
    query::{EvaluatorKind, LeafId, Query},
    value::{Value, loose_eq},
};
use std::collections::{BTreeMap, BTreeSet};

// re-exports
pub use keys::KeyMetadata;

///
/// PushdownPlan
///
/// Result of planning one query: ordered WHERE fragments with their bind
/// values, the positions of every pushed evaluator, and the residual query.
///

#[derive(Clone, Debug)]
pub struct PushdownPlan {
    fragments: Vec<String>,
    values: Vec<Value>,
    pushed: BTreeSet<LeafId>,
    residual: Query,
}

impl PushdownPlan {
    /// Fragments joined with ` AND `, or `None` when nothing was pushed.
    #[must_use]
    pub fn where_clause(&self) -> Option<String> {
        (!self.fragments.is_empty()).then(|| self.fragments.join(" AND "))
    }

    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Bind values in placeholder order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub const fn pushed(&self) -> &BTreeSet<LeafId> {
        &self.pushed
    }

    #[must_use]
    pub const fn residual(&self) -> &Query {
        &self.residual
    }

    #[must_use]
    pub fn has_residual(&self) -> bool {
        self.residual.has_predicate()
    }

    /// Native LIMIT for this plan.
    #[must_use]
    pub fn native_limit(&self) -> Option<u32> {
        limit_pushdown(
            self.residual.limit_value(),
            self.residual.start_value(),
            self.has_residual(),
        )
    }
}

/// Limit pushdown policy.
///
/// A residual predicate disables the native limit. Otherwise the native
/// limit covers the skipped prefix: `start + limit` when start is set.
#[must_use]
pub fn limit_pushdown(limit: Option<u32>, start: Option<u32>, has_residual: bool) -> Option<u32> {
    if has_residual {
        return None;
    }

    let limit = limit?;
    Some(start.map_or(limit, |start| start.saturating_add(limit)))
}

/// Apply `start`/`limit` client side to fetched (and filtered) rows.
#[must_use]
pub fn client_window<T>(rows: Vec<T>, start: Option<u32>, limit: Option<u32>) -> Vec<T> {
    let skip = start.map_or(0, |start| start as usize);
    let take = limit.map_or(usize::MAX, |limit| limit as usize);

    rows.into_iter().skip(skip).take(take).collect()
}

///
/// Candidate
/// Per-column classification state.
///

struct Candidate {
    column: String,
    kind: EvaluatorKind,
    values: Vec<Value>,
    leaves: Vec<LeafId>,
    pushable: bool,
}

/// Plan a query against the resource's key metadata.
///
/// Parameters are resolved first; an unresolvable parameter or a scalar
/// membership test whose operand is not a sequence is a configuration
/// error.
pub fn plan(
    query: &Query,
    keys: &KeyMetadata,
    naming: &dyn Naming,
    params: &[Value],
) -> Result<PushdownPlan, InternalError> {
    let bound = query.bind(params)?;
    let candidates = classify(&bound, keys, naming);

    let mut fragments = Vec::new();
    let mut values = Vec::new();
    let mut pushed = BTreeSet::new();

    for candidate in candidates.iter().filter(|c| c.pushable) {
        pushed.extend(emit(candidate, keys, &mut fragments, &mut values)?);
    }

    let residual = bound.reduce(&pushed);

    Ok(PushdownPlan {
        fragments,
        values,
        pushed,
        residual,
    })
}

// Group conjunctive key-column evaluators by column, in first-occurrence
// order. A kind conflict disables the column for good.
fn classify(query: &Query, keys: &KeyMetadata, naming: &dyn Naming) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut slots: BTreeMap<String, usize> = BTreeMap::new();

    for (id, leaf) in query.conjunctive_leaves() {
        if !leaf.kind.is_pushable() {
            continue;
        }
        let column = naming.normalize(&leaf.field);
        if !keys.is_pushdown_key(&column) {
            continue;
        }
        let Some(value) = leaf.value() else {
            continue;
        };

        if let Some(slot) = slots.get(&column) {
            let candidate = &mut candidates[*slot];
            if !candidate.pushable {
                continue;
            }
            if candidate.kind == leaf.kind {
                candidate.values.push(value.clone());
                candidate.leaves.push(id);
            } else {
                candidate.pushable = false;
            }
        } else {
            slots.insert(column.clone(), candidates.len());
            candidates.push(Candidate {
                column,
                kind: leaf.kind,
                values: vec![value.clone()],
                leaves: vec![id],
                pushable: true,
            });
        }
    }

    candidates
}

// Emit the fragments for one pushable column; returns the leaves they cover.
fn emit(
    candidate: &Candidate,
    keys: &KeyMetadata,
    fragments: &mut Vec<String>,
    values: &mut Vec<Value>,
) -> Result<Vec<LeafId>, InternalError> {
    let column = &candidate.column;
    let before = fragments.len();

    match candidate.kind {
        // Only the first value is bound; leaves asking for another value
        // stay residual and filter everything out client side.
        EvaluatorKind::Equals => {
            let Some(first) = candidate.values.first() else {
                return Ok(Vec::new());
            };
            fragments.push(format!("{column} = ?"));
            values.push(first.clone());

            return Ok(candidate
                .leaves
                .iter()
                .zip(&candidate.values)
                .filter(|(_, value)| loose_eq(first, value))
                .map(|(leaf, _)| *leaf)
                .collect());
        }
        EvaluatorKind::GreaterThan
        | EvaluatorKind::GreaterThanOrEqual
        | EvaluatorKind::SmallerThan
        | EvaluatorKind::SmallerThanOrEqual => {
            let Some(op) = candidate.kind.operator() else {
                return Ok(Vec::new());
            };
            for value in &candidate.values {
                fragments.push(format!("{column} {op} ?"));
                values.push(value.clone());
            }
        }
        EvaluatorKind::In if keys.is_collection(column) => {
            for operand in &candidate.values {
                let elements = operand
                    .clone()
                    .into_sequence()
                    .unwrap_or_else(|| vec![operand.clone()]);
                for element in elements {
                    fragments.push(format!("{column} CONTAINS ?"));
                    values.push(element);
                }
            }
        }
        EvaluatorKind::In => {
            let list = intersect_membership(column, &candidate.values)?;
            if list.is_empty() {
                return Ok(Vec::new());
            }
            fragments.push(format!("{column} IN ({})", placeholders(list.len())));
            values.extend(list);
        }
        EvaluatorKind::NotEquals | EvaluatorKind::NotIn => {}
    }

    if fragments.len() == before {
        return Ok(Vec::new());
    }

    Ok(candidate.leaves.clone())
}

fn distinct_values(values: &[Value]) -> Vec<Value> {
    let mut distinct: Vec<Value> = Vec::with_capacity(values.len());
    for value in values {
        if !distinct.iter().any(|seen| loose_eq(seen, value)) {
            distinct.push(value.clone());
        }
    }

    distinct
}

// Intersect repeated IN-lists on a scalar column, keeping first-list order.
fn intersect_membership(column: &str, operands: &[Value]) -> Result<Vec<Value>, InternalError> {
    let mut lists = operands.iter().map(|operand| {
        operand.clone().into_sequence().ok_or_else(|| {
            InternalError::planner_config(format!(
                "membership test on scalar column '{column}' needs a list operand, found {operand}"
            ))
        })
    });

    let Some(first) = lists.next() else {
        return Ok(Vec::new());
    };
    let mut current = first?;
    for list in lists {
        let list = list?;
        current.retain(|item| list.iter().any(|other| loose_eq(item, other)));
    }

    Ok(distinct_values(&current))
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
