use std::cmp::Ordering;
use std::ops::{BitAnd, BitOr, Not};

use crate::schema::{FieldValue, Schema};

// =============================================================================
// 1. COMPARISON OPERATORS
// =============================================================================

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
        }
    }
}

// =============================================================================
// 2. THE PREDICATE VALUE
// =============================================================================

/// A filter over entity fields, held as a value and combined with explicit
/// AND/OR/NOT. Fields are resolved by wire name through a [`Schema`] at
/// evaluation time; a field the schema does not know never matches.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    True,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Compare {
        field: String,
        op: CompareOp,
        value: FieldValue,
    },
    /// Case-insensitive substring match on a text field.
    Contains { field: String, needle: String },
    /// Case-insensitive equality on a text field.
    EqIgnoreCase { field: String, value: String },
    In { field: String, values: Vec<FieldValue> },
}

impl Predicate {
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<FieldValue>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    #[allow(dead_code)]
    pub fn eq(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Predicate::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    pub fn eq_ignore_case(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::EqIgnoreCase {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_in<V: Into<FieldValue>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Predicate::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Conjunction. `True` is the identity and nested ANDs are flattened, so
    /// adding a clause never rewrites the ones already present.
    #[must_use]
    pub fn and(self, other: Predicate) -> Self {
        match (self, other) {
            (Predicate::True, p) | (p, Predicate::True) => p,
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), p) => {
                left.push(p);
                Predicate::And(left)
            }
            (p, Predicate::And(mut right)) => {
                right.insert(0, p);
                Predicate::And(right)
            }
            (left, right) => Predicate::And(vec![left, right]),
        }
    }

    #[must_use]
    pub fn or(self, other: Predicate) -> Self {
        match (self, other) {
            (Predicate::True, _) | (_, Predicate::True) => Predicate::True,
            (Predicate::Or(mut left), Predicate::Or(right)) => {
                left.extend(right);
                Predicate::Or(left)
            }
            (Predicate::Or(mut left), p) => {
                left.push(p);
                Predicate::Or(left)
            }
            (left, right) => Predicate::Or(vec![left, right]),
        }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Predicate::Not(inner) => *inner,
            p => Predicate::Not(Box::new(p)),
        }
    }

    pub fn matches<T>(&self, schema: &Schema<T>, entity: &T) -> bool {
        match self {
            Predicate::True => true,
            Predicate::And(clauses) => clauses.iter().all(|p| p.matches(schema, entity)),
            Predicate::Or(clauses) => clauses.iter().any(|p| p.matches(schema, entity)),
            Predicate::Not(inner) => !inner.matches(schema, entity),
            Predicate::Compare { field, op, value } => schema
                .read(entity, field)
                .and_then(|actual| actual.compare(value))
                .is_some_and(|ordering| op.accepts(ordering)),
            Predicate::Contains { field, needle } => read_text(schema, entity, field)
                .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
            Predicate::EqIgnoreCase { field, value } => {
                read_text(schema, entity, field).is_some_and(|text| text.to_lowercase() == value.to_lowercase())
            }
            Predicate::In { field, values } => schema.read(entity, field).is_some_and(|actual| {
                values
                    .iter()
                    .any(|candidate| actual.compare(candidate) == Some(Ordering::Equal))
            }),
        }
    }
}

fn read_text<T>(schema: &Schema<T>, entity: &T, field: &str) -> Option<String> {
    match schema.read(entity, field)? {
        FieldValue::Text(text) => Some(text),
        _ => None,
    }
}

// =============================================================================
// 3. OPERATORS
// =============================================================================

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl Not for Predicate {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

// =============================================================================
// 4. TESTS
// =============================================================================
