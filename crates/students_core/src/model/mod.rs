//! Domain model for student documents and their derived projections.
//!
//! # Responsibility
//! - Define canonical data structures used by repositories and services.
//! - Keep read-only projections (`StudentContact`, `StudentAvgScore`) apart
//!   from the persisted document shape (`Student`).
//!
//! # Invariants
//! - Every student is identified by a unique, immutable `StudentId`.
//! - Marks have no identity of their own; they live inside a student's list.

pub mod student;
