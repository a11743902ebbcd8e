//! Core data access and reporting for student records and exam marks.
//! This crate is the single source of truth for store invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget, LoggingError,
};
pub use model::student::{Mark, Student, StudentAvgScore, StudentContact, StudentId};
pub use repo::report_repo::StudentReportRepository;
pub use repo::student_repo::{RepoError, RepoResult, SqliteStudentRepository, StudentRepository};
pub use service::student_service::{ServiceError, ServiceResult, StudentService, BEST_STUDENT_SCORE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
