//! Field-level partial updates driven by a [`Schema`] allow-list.
//!
//! A patch is applied in two passes. Every entry is first resolved against the
//! schema and converted into a typed [`Assignment`]; only when all entries have
//! validated are the assignments written. A rejected patch therefore leaves the
//! entity exactly as it was.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::schema::{FieldClass, FieldKind, Schema, Setter};

/// Caller-supplied sparse edit set. Keyed by wire field name.
pub type PatchMap = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidFieldReason {
    Unknown,
    Protected,
    TypeMismatch { expected: FieldKind },
}

impl fmt::Display for InvalidFieldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidFieldReason::Unknown => f.write_str("unknown field"),
            InvalidFieldReason::Protected => f.write_str("field is not patchable"),
            InvalidFieldReason::TypeMismatch { expected } => write!(f, "expected a {} value", expected),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PatchError {
    #[error("Invalid field `{field}`: {reason}")]
    InvalidField {
        field: String,
        reason: InvalidFieldReason,
    },
}

impl PatchError {
    pub fn field(&self) -> &str {
        match self {
            PatchError::InvalidField { field, .. } => field,
        }
    }
}

/// A validated, typed write waiting to be committed.
enum Assignment<T> {
    Text(fn(&mut T, String), String),
    Decimal(fn(&mut T, f64), f64),
    Integer(fn(&mut T, i64), i64),
    Boolean(fn(&mut T, bool), bool),
}

impl<T> Assignment<T> {
    /// Converts a raw value for the given setter. `None` when the value does not
    /// have the setter's type; `null` never converts.
    fn prepare(setter: Setter<T>, raw: &Value) -> Option<Self> {
        match setter {
            Setter::Text(set) => raw.as_str().map(|v| Assignment::Text(set, v.to_owned())),
            Setter::Decimal(set) => raw.as_f64().map(|v| Assignment::Decimal(set, v)),
            Setter::Integer(set) => raw.as_i64().map(|v| Assignment::Integer(set, v)),
            Setter::Boolean(set) => raw.as_bool().map(|v| Assignment::Boolean(set, v)),
        }
    }

    fn commit(self, entity: &mut T) {
        match self {
            Assignment::Text(set, v) => set(entity, v),
            Assignment::Decimal(set, v) => set(entity, v),
            Assignment::Integer(set, v) => set(entity, v),
            Assignment::Boolean(set, v) => set(entity, v),
        }
    }
}

fn validate_entry<T>(schema: &Schema<T>, name: &str, raw: &Value) -> Result<Assignment<T>, PatchError> {
    let invalid = |reason| PatchError::InvalidField {
        field: name.to_owned(),
        reason,
    };

    let setter = match schema.classify(name) {
        FieldClass::Unknown => return Err(invalid(InvalidFieldReason::Unknown)),
        FieldClass::Protected(_) => return Err(invalid(InvalidFieldReason::Protected)),
        FieldClass::Patchable(_) => schema
            .field(name)
            .and_then(|field| field.setter())
            .ok_or_else(|| invalid(InvalidFieldReason::Protected))?,
    };

    Assignment::prepare(setter, raw).ok_or_else(|| {
        invalid(InvalidFieldReason::TypeMismatch {
            expected: setter.kind(),
        })
    })
}

/// Applies `patch` to `entity`, all or nothing.
///
/// On error the entity is untouched and the error names the first invalid
/// field in key order.
pub fn apply_patch<T>(schema: &Schema<T>, entity: &mut T, patch: &PatchMap) -> Result<(), PatchError> {
    let assignments = patch
        .iter()
        .map(|(name, raw)| validate_entry(schema, name, raw))
        .collect::<Result<Vec<_>, _>>()?;

    for assignment in assignments {
        assignment.commit(entity);
    }
    Ok(())
}
