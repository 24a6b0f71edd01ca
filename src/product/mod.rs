//! Product records: the schema table, wire DTOs and the catalog error type.

mod dtos;
pub mod entity;
pub mod error;

pub use dtos::*;
pub use error::*;
