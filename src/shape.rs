//! Field accessor tables for queryable record types.
//!
//! A [`RecordShape`] maps field names (case-insensitively) to typed getters.
//! Nested records are registered with [`ShapeBuilder::nested`], which lifts the
//! child's getters through the parent so a dotted path like `profesor.nombre`
//! resolves to a single getter over the outer record.

use chrono::NaiveDateTime;
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::types::{FieldKind, FieldValue, QueryEnum};

pub type Getter<T> = Arc<dyn Fn(&T) -> Option<FieldValue> + Send + Sync>;

/// A record type with a registered accessor table.
pub trait Record: Sized + 'static {
    fn shape() -> &'static RecordShape<Self>;
}

/// A resolved leaf field: its declared kind and a getter over the root record.
pub struct FieldRef<T> {
    pub path: String,
    pub kind: FieldKind,
    getter: Getter<T>,
}

impl<T> FieldRef<T> {
    /// Read the field from a record. `None` when a nested parent is absent.
    pub fn get(&self, record: &T) -> Option<FieldValue> {
        (self.getter)(record)
    }

    pub(crate) fn getter(&self) -> Getter<T> {
        Arc::clone(&self.getter)
    }
}

impl<T> Clone for FieldRef<T> {
    fn clone(&self) -> Self {
        Self { path: self.path.clone(), kind: self.kind, getter: Arc::clone(&self.getter) }
    }
}

impl<T> fmt::Debug for FieldRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRef").field("path", &self.path).field("kind", &self.kind).finish()
    }
}

enum FieldAccessor<T> {
    Value { kind: FieldKind, getter: Getter<T> },
    Nested(RecordShape<T>),
}

impl<T> Clone for FieldAccessor<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Value { kind, getter } => Self::Value { kind: *kind, getter: Arc::clone(getter) },
            Self::Nested(shape) => Self::Nested(shape.clone()),
        }
    }
}

struct FieldEntry<T> {
    name: &'static str,
    accessor: FieldAccessor<T>,
}

/// Accessor table for one record type.
pub struct RecordShape<T> {
    name: &'static str,
    entries: Vec<FieldEntry<T>>,
    index: HashMap<String, usize>,
}

impl<T> Clone for RecordShape<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            entries: self
                .entries
                .iter()
                .map(|e| FieldEntry { name: e.name, accessor: e.accessor.clone() })
                .collect(),
            index: self.index.clone(),
        }
    }
}

impl<T> fmt::Debug for RecordShape<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordShape")
            .field("name", &self.name)
            .field("fields", &self.field_names())
            .finish()
    }
}

impl<T> RecordShape<T> {
    #[must_use]
    pub fn builder(name: &'static str) -> ShapeBuilder<T> {
        ShapeBuilder { shape: Self { name, entries: Vec::new(), index: HashMap::new() } }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declared field names in registration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    fn entry(&self, name: &str) -> Option<&FieldEntry<T>> {
        self.index.get(&name.to_lowercase()).map(|&i| &self.entries[i])
    }

    /// Single-level lookup. Nested records and dotted names do not resolve.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<FieldRef<T>> {
        match &self.entry(name.trim())?.accessor {
            FieldAccessor::Value { kind, getter } => Some(FieldRef {
                path: name.trim().to_string(),
                kind: *kind,
                getter: Arc::clone(getter),
            }),
            FieldAccessor::Nested(_) => None,
        }
    }

    /// Resolve a dotted path one segment at a time.
    ///
    /// Every segment but the last must name a nested record; the last must
    /// name a value field.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<FieldRef<T>> {
        let segments: Vec<&str> = path.split('.').map(str::trim).collect();
        let (last, parents) = segments.split_last()?;
        let mut cur = self;
        for seg in parents {
            match &cur.entry(seg)?.accessor {
                FieldAccessor::Nested(child) => cur = child,
                FieldAccessor::Value { .. } => return None,
            }
        }
        let leaf = cur.field(last)?;
        Some(FieldRef { path: segments.join("."), ..leaf })
    }

    fn push(&mut self, name: &'static str, accessor: FieldAccessor<T>) {
        let key = name.to_lowercase();
        let entry = FieldEntry { name, accessor };
        if let Some(&i) = self.index.get(&key) {
            self.entries[i] = entry;
        } else {
            self.index.insert(key, self.entries.len());
            self.entries.push(entry);
        }
    }
}

impl<T: 'static> RecordShape<T> {
    /// Re-root a child shape under a parent getter.
    fn lift<P: 'static>(
        &self,
        parent: Arc<dyn Fn(&P) -> Option<&T> + Send + Sync>,
    ) -> RecordShape<P> {
        let entries = self
            .entries
            .iter()
            .map(|e| {
                let accessor = match &e.accessor {
                    FieldAccessor::Value { kind, getter } => {
                        let child = Arc::clone(getter);
                        let outer = Arc::clone(&parent);
                        let getter: Getter<P> =
                            Arc::new(move |p: &P| outer(p).and_then(|c| child(c)));
                        FieldAccessor::Value { kind: *kind, getter }
                    }
                    FieldAccessor::Nested(grandchild) => {
                        FieldAccessor::Nested(grandchild.lift(Arc::clone(&parent)))
                    }
                };
                FieldEntry { name: e.name, accessor }
            })
            .collect();
        RecordShape { name: self.name, entries, index: self.index.clone() }
    }
}

/// Builder for a [`RecordShape`]. Registering a name twice replaces the earlier entry.
pub struct ShapeBuilder<T> {
    shape: RecordShape<T>,
}

impl<T: 'static> ShapeBuilder<T> {
    /// Register a field with an explicit kind and a getter that may yield no value.
    #[must_use]
    pub fn field<F>(mut self, name: &'static str, kind: FieldKind, get: F) -> Self
    where
        F: Fn(&T) -> Option<FieldValue> + Send + Sync + 'static,
    {
        self.shape.push(name, FieldAccessor::Value { kind, getter: Arc::new(get) });
        self
    }

    #[must_use]
    pub fn string<F>(self, name: &'static str, get: F) -> Self
    where
        F: Fn(&T) -> &str + Send + Sync + 'static,
    {
        self.field(name, FieldKind::String, move |t| Some(FieldValue::String(get(t).to_string())))
    }

    #[must_use]
    pub fn opt_string<F>(self, name: &'static str, get: F) -> Self
    where
        F: Fn(&T) -> Option<&str> + Send + Sync + 'static,
    {
        self.field(name, FieldKind::String, move |t| {
            get(t).map(|s| FieldValue::String(s.to_string()))
        })
    }

    #[must_use]
    pub fn int<F>(self, name: &'static str, get: F) -> Self
    where
        F: Fn(&T) -> i32 + Send + Sync + 'static,
    {
        self.field(name, FieldKind::Int, move |t| Some(FieldValue::Int(get(t))))
    }

    #[must_use]
    pub fn long<F>(self, name: &'static str, get: F) -> Self
    where
        F: Fn(&T) -> i64 + Send + Sync + 'static,
    {
        self.field(name, FieldKind::Long, move |t| Some(FieldValue::Long(get(t))))
    }

    #[must_use]
    pub fn float<F>(self, name: &'static str, get: F) -> Self
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        self.field(name, FieldKind::Float, move |t| Some(FieldValue::Float(OrderedFloat(get(t)))))
    }

    #[must_use]
    pub fn decimal<F>(self, name: &'static str, get: F) -> Self
    where
        F: Fn(&T) -> Decimal + Send + Sync + 'static,
    {
        self.field(name, FieldKind::Decimal, move |t| Some(FieldValue::Decimal(get(t))))
    }

    #[must_use]
    pub fn datetime<F>(self, name: &'static str, get: F) -> Self
    where
        F: Fn(&T) -> NaiveDateTime + Send + Sync + 'static,
    {
        self.field(name, FieldKind::DateTime, move |t| Some(FieldValue::DateTime(get(t))))
    }

    #[must_use]
    pub fn boolean<F>(self, name: &'static str, get: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.field(name, FieldKind::Bool, move |t| Some(FieldValue::Bool(get(t))))
    }

    #[must_use]
    pub fn enumeration<E, F>(self, name: &'static str, get: F) -> Self
    where
        E: QueryEnum,
        F: Fn(&T) -> E + Send + Sync + 'static,
    {
        self.field(name, FieldKind::Enum(E::VARIANTS), move |t| Some(get(t).to_field_value()))
    }

    /// Register a nested record reachable through a dotted path segment.
    #[must_use]
    pub fn nested<N, F>(mut self, name: &'static str, child: &RecordShape<N>, get: F) -> Self
    where
        N: 'static,
        F: Fn(&T) -> Option<&N> + Send + Sync + 'static,
    {
        let lifted = child.lift::<T>(Arc::new(get));
        self.shape.push(name, FieldAccessor::Nested(lifted));
        self
    }

    #[must_use]
    pub fn build(self) -> RecordShape<T> {
        self.shape
    }
}
