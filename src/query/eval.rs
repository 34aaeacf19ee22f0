use log::{debug, trace};
use std::cmp::Ordering;
use std::fmt;

use crate::shape::{Getter, RecordShape};
use crate::types::{FieldKind, FieldValue};

use super::parse::parse_filter;
use super::types::{CmpOp, DropReason, DroppedTerm, Term};

/// A compiled condition over one record.
pub type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A filter string bound to a record shape: OR of AND-groups of predicates.
///
/// Terms that could not be turned into a condition are listed in
/// [`CompiledFilter::dropped`]; they never affect matching.
pub struct CompiledFilter<T> {
    groups: Vec<Vec<Predicate<T>>>,
    dropped: Vec<DroppedTerm>,
}

impl<T> fmt::Debug for CompiledFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("groups", &self.groups.iter().map(Vec::len).collect::<Vec<_>>())
            .field("dropped", &self.dropped)
            .finish()
    }
}

impl<T> CompiledFilter<T> {
    /// A filter with no usable groups admits every record.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn dropped(&self) -> &[DroppedTerm] {
        &self.dropped
    }

    #[must_use]
    pub fn matches(&self, record: &T) -> bool {
        self.is_noop() || self.groups.iter().any(|g| g.iter().all(|p| p(record)))
    }
}

/// Parse `input` and bind every term to `shape`.
pub fn compile_filter<T: 'static>(shape: &RecordShape<T>, input: &str) -> CompiledFilter<T> {
    let parsed = parse_filter(input);
    let mut dropped: Vec<DroppedTerm> = parsed
        .rejected
        .into_iter()
        .map(|term| DroppedTerm { term, reason: DropReason::Syntax })
        .collect();
    let mut groups = Vec::with_capacity(parsed.groups.len());
    for group in parsed.groups {
        let mut preds = Vec::with_capacity(group.len());
        for term in group {
            match compile_term(shape, &term) {
                Ok(p) => preds.push(p),
                Err(reason) => {
                    debug!("dropping filter term '{term}' on {}: {reason:?}", shape.name());
                    dropped.push(DroppedTerm { term: term.to_string(), reason });
                }
            }
        }
        if !preds.is_empty() {
            groups.push(preds);
        }
    }
    trace!(
        "compiled filter '{input}' on {}: {} group(s), {} dropped",
        shape.name(),
        groups.len(),
        dropped.len()
    );
    CompiledFilter { groups, dropped }
}

/// Build the condition for one term, or say why it has none.
pub fn compile_term<T: 'static>(
    shape: &RecordShape<T>,
    term: &Term,
) -> Result<Predicate<T>, DropReason> {
    let field = shape.resolve(&term.path).ok_or(DropReason::UnknownField)?;
    let get = field.getter();
    match field.kind {
        FieldKind::String => string_condition(get, term.op, &term.value),
        kind if kind.is_ordered() => {
            if term.op == CmpOp::Contains {
                return Err(DropReason::UnsupportedOperator);
            }
            let literal = kind.parse_literal(&term.value).ok_or(DropReason::InvalidLiteral)?;
            Ok(ordered_condition(get, term.op, literal))
        }
        _ => Err(DropReason::UnsupportedOperator),
    }
}

fn string_condition<T: 'static>(
    get: Getter<T>,
    op: CmpOp,
    value: &str,
) -> Result<Predicate<T>, DropReason> {
    match op {
        CmpOp::Contains => {
            let needle = value.to_string();
            Ok(Box::new(move |r: &T| with_str(&get, r, |s| s.contains(needle.as_str()))))
        }
        CmpOp::Eq => {
            let wanted = value.to_lowercase();
            Ok(Box::new(move |r: &T| with_str(&get, r, |s| s.to_lowercase() == wanted)))
        }
        CmpOp::Ne => {
            let wanted = value.to_lowercase();
            Ok(Box::new(move |r: &T| with_str(&get, r, |s| s.to_lowercase() != wanted)))
        }
        CmpOp::Gt | CmpOp::Gte | CmpOp::Lt | CmpOp::Lte => Err(DropReason::UnsupportedOperator),
    }
}

fn with_str<T>(get: &Getter<T>, record: &T, test: impl Fn(&str) -> bool) -> bool {
    match get(record) {
        Some(FieldValue::String(s)) => test(&s),
        _ => false,
    }
}

fn ordered_condition<T: 'static>(get: Getter<T>, op: CmpOp, literal: FieldValue) -> Predicate<T> {
    Box::new(move |r: &T| match get(r) {
        Some(v) => op_holds(op, v.compare(&literal)),
        None => false,
    })
}

const fn op_holds(op: CmpOp, ord: Ordering) -> bool {
    match op {
        CmpOp::Eq => matches!(ord, Ordering::Equal),
        CmpOp::Ne => !matches!(ord, Ordering::Equal),
        CmpOp::Gt => matches!(ord, Ordering::Greater),
        CmpOp::Gte => matches!(ord, Ordering::Greater | Ordering::Equal),
        CmpOp::Lt => matches!(ord, Ordering::Less),
        CmpOp::Lte => matches!(ord, Ordering::Less | Ordering::Equal),
        CmpOp::Contains => false,
    }
}

/// The `filterField`/`filterValue` fallback.
///
/// Scalar kinds match by exact equality after parsing; strings by substring
/// unless the value starts with `=`, which selects a case-insensitive exact
/// match. Other kinds compare their display text by substring.
pub fn compile_simple_filter<T: 'static>(
    shape: &RecordShape<T>,
    field: &str,
    value: &str,
) -> Result<Predicate<T>, DropReason> {
    let resolved = shape.resolve(field).ok_or(DropReason::UnknownField)?;
    let get = resolved.getter();
    match resolved.kind {
        FieldKind::String => match value.strip_prefix('=') {
            Some(exact) => string_condition(get, CmpOp::Eq, exact),
            None => string_condition(get, CmpOp::Contains, value),
        },
        kind if kind.is_scalar() => {
            let literal = kind.parse_literal(value).ok_or(DropReason::InvalidLiteral)?;
            Ok(ordered_condition(get, CmpOp::Eq, literal))
        }
        _ => {
            let needle = value.to_string();
            Ok(Box::new(move |r: &T| {
                get(r).is_some_and(|v| v.to_string().contains(needle.as_str()))
            }))
        }
    }
}
