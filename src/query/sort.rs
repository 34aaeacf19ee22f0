use log::debug;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use crate::shape::{FieldRef, RecordShape};
use crate::types::FieldValue;

use super::types::{Order, SortSpec};

/// A sort field bound to a record shape.
pub struct SortKey<T> {
    field: FieldRef<T>,
    order: Order,
}

impl<T> Clone for SortKey<T> {
    fn clone(&self) -> Self {
        Self { field: self.field.clone(), order: self.order }
    }
}

impl<T> fmt::Debug for SortKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortKey").field("field", &self.field.path).field("order", &self.order).finish()
    }
}

impl<T> SortKey<T> {
    /// Bind a sort spec. Only single-level field names resolve.
    #[must_use]
    pub fn bind(shape: &RecordShape<T>, spec: &SortSpec) -> Option<Self> {
        match shape.field(&spec.field) {
            Some(field) => Some(Self { field, order: spec.order }),
            None => {
                debug!(
                    "sort field '{}' not found on {}; keeping input order",
                    spec.field,
                    shape.name()
                );
                None
            }
        }
    }

    #[must_use]
    pub const fn order(&self) -> Order {
        self.order
    }

    /// Stable sort; records without a value order first (last when descending).
    pub fn sort<B: Borrow<T>>(&self, records: Vec<B>) -> Vec<B> {
        let mut keyed: Vec<(Option<FieldValue>, B)> =
            records.into_iter().map(|b| (self.field.get(b.borrow()), b)).collect();
        keyed.sort_by(|(a, _), (b, _)| {
            let ord = compare_keys(a.as_ref(), b.as_ref());
            match self.order {
                Order::Asc => ord,
                Order::Desc => ord.reverse(),
            }
        });
        keyed.into_iter().map(|(_, b)| b).collect()
    }
}

fn compare_keys(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.compare(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
