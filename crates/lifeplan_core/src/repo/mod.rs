//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for the stored planner document.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - The repository stores opaque serialized text; it never interprets the
//!   document's JSON.
//! - Repository APIs return semantic readiness errors in addition to DB
//!   transport errors.

pub mod document_repo;
