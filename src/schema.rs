//! Static field tables describing which entity fields exist, how to read them,
//! and which of them may be assigned from untyped input.
//!
//! A [`Schema`] is built once per entity type and never mutated afterwards, so a
//! `&'static Schema<T>` can be shared freely between concurrent requests.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Declared type of an entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Identifier,
    Text,
    Decimal,
    Integer,
    Boolean,
    Timestamp,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Identifier => "identifier",
            FieldKind::Text => "text",
            FieldKind::Decimal => "decimal",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed snapshot of a single field, used for filtering and sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Decimal(f64),
    Integer(i64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Orders two values of compatible kinds. Decimals and integers compare
    /// numerically; any other cross-kind pair is incomparable.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => Some(a.total_cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Decimal(a), FieldValue::Integer(b)) => Some(a.total_cmp(&(*b as f64))),
            (FieldValue::Integer(a), FieldValue::Decimal(b)) => Some((*a as f64).total_cmp(b)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

/// Typed write access to a field that may be assigned from untyped input.
///
/// Only primitive and text kinds have a setter variant, so a descriptor for an
/// identity, timestamp or nested field can never carry one.
pub enum Setter<T> {
    Text(fn(&mut T, String)),
    Decimal(fn(&mut T, f64)),
    Integer(fn(&mut T, i64)),
    Boolean(fn(&mut T, bool)),
}

impl<T> Setter<T> {
    pub fn kind(&self) -> FieldKind {
        match self {
            Setter::Text(_) => FieldKind::Text,
            Setter::Decimal(_) => FieldKind::Decimal,
            Setter::Integer(_) => FieldKind::Integer,
            Setter::Boolean(_) => FieldKind::Boolean,
        }
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Setter<T> {}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Setter::{}", self.kind())
    }
}

/// One row of the schema table.
pub struct FieldDescriptor<T> {
    name: &'static str,
    kind: FieldKind,
    getter: fn(&T) -> FieldValue,
    setter: Option<Setter<T>>,
    sortable: bool,
}

impl<T> FieldDescriptor<T> {
    /// A field that can be read, filtered on and sorted by, but never patched.
    pub fn read_only(name: &'static str, kind: FieldKind, getter: fn(&T) -> FieldValue) -> Self {
        Self {
            name,
            kind,
            getter,
            setter: None,
            sortable: false,
        }
    }

    pub fn text(name: &'static str, getter: fn(&T) -> FieldValue, set: fn(&mut T, String)) -> Self {
        Self::writable(name, getter, Setter::Text(set))
    }

    pub fn decimal(name: &'static str, getter: fn(&T) -> FieldValue, set: fn(&mut T, f64)) -> Self {
        Self::writable(name, getter, Setter::Decimal(set))
    }

    #[allow(dead_code)]
    pub fn integer(name: &'static str, getter: fn(&T) -> FieldValue, set: fn(&mut T, i64)) -> Self {
        Self::writable(name, getter, Setter::Integer(set))
    }

    #[allow(dead_code)]
    pub fn boolean(name: &'static str, getter: fn(&T) -> FieldValue, set: fn(&mut T, bool)) -> Self {
        Self::writable(name, getter, Setter::Boolean(set))
    }

    fn writable(name: &'static str, getter: fn(&T) -> FieldValue, setter: Setter<T>) -> Self {
        Self {
            name,
            kind: setter.kind(),
            getter,
            setter: Some(setter),
            sortable: false,
        }
    }

    /// Marks the field as usable in a sort clause.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn setter(&self) -> Option<Setter<T>> {
        self.setter
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn read(&self, entity: &T) -> FieldValue {
        (self.getter)(entity)
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("patchable", &self.setter.is_some())
            .field("sortable", &self.sortable)
            .finish()
    }
}

/// How a field name resolves against a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    Unknown,
    /// The field exists but is not remotely assignable.
    Protected(FieldKind),
    Patchable(FieldKind),
}

/// The field table for one entity type.
pub struct Schema<T> {
    entity: &'static str,
    fields: Vec<FieldDescriptor<T>>,
    index: HashMap<&'static str, usize>,
}

impl<T> Schema<T> {
    /// Builds the table.
    ///
    /// # Panics
    /// Panics if two descriptors share a name. Schemas are static tables, so a
    /// duplicate is a programming error caught at startup.
    pub fn new(entity: &'static str, fields: Vec<FieldDescriptor<T>>) -> Self {
        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.name, position).is_some() {
                panic!("duplicate field `{}` in {} schema", field.name, entity);
            }
        }
        Self {
            entity,
            fields,
            index,
        }
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        self.index.get(name).map(|&position| &self.fields[position])
    }

    pub fn classify(&self, name: &str) -> FieldClass {
        match self.field(name) {
            None => FieldClass::Unknown,
            Some(field) if field.setter.is_some() => FieldClass::Patchable(field.kind),
            Some(field) => FieldClass::Protected(field.kind),
        }
    }

    pub fn is_sortable(&self, name: &str) -> bool {
        self.field(name).is_some_and(FieldDescriptor::is_sortable)
    }

    pub fn read(&self, entity: &T, name: &str) -> Option<FieldValue> {
        self.field(name).map(|field| field.read(entity))
    }

    pub fn patchable_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|field| field.setter.is_some())
            .map(|field| field.name)
    }

    pub fn sortable_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|field| field.sortable)
            .map(|field| field.name)
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("entity", &self.entity)
            .field("fields", &self.fields)
            .finish()
    }
}
