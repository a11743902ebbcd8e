//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQL/JSON query details from service orchestration.
//!
//! # Invariants
//! - Every repository call issues a single declarative statement.
//! - Repository APIs return semantic errors (`NotFound`, `AlreadyExists`)
//!   in addition to DB transport errors.

pub mod report_repo;
pub mod student_repo;
