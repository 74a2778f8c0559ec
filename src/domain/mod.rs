//! Domain types for persisted task status.
//!
//! [`TaskRecord`] is the row the orchestration engine writes for every task
//! it dispatches to a host. [`TaskField`] and [`FieldValue`] name and carry
//! the record's columns; they are the only vocabulary storage queries speak.

pub mod field;
pub mod record;

pub use field::*;
pub use record::*;
