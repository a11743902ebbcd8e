//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Translate repository outcomes into not-found / already-exists errors.
//! - Keep front ends decoupled from storage details.

pub mod student_service;
