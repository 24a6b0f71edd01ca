//! Dynamic search: predicates as values, criteria-driven predicate building,
//! and paginated execution against the store.

pub mod criteria;
pub mod executor;
pub mod page;
pub mod predicate;

pub use criteria::*;
pub use executor::*;
pub use page::*;
pub use predicate::*;
