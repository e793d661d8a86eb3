//! Parsing of seqr metadata exports (individuals and saved variant tags).

pub mod subjects;
pub mod tags;

pub use subjects::{Sex, Subject, SubjectRegistry};
pub use tags::{TagRecord, TagRegistry};
