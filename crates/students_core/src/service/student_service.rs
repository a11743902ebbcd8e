//! Student use-case service.
//!
//! # Responsibility
//! - Provide CRUD entry points for student documents and marks.
//! - Provide reporting entry points backed by repository filters and
//!   aggregation pipelines.
//!
//! # Invariants
//! - Operations addressed to one student fail with `StudentNotFound` when the
//!   id is absent, never with an empty result.
//! - Service layer remains storage-agnostic.

use crate::model::student::{Mark, Student, StudentAvgScore, StudentContact, StudentId};
use crate::repo::report_repo::StudentReportRepository;
use crate::repo::student_repo::{RepoError, StudentRepository};
use chrono::{Datelike, NaiveDate};
use log::{debug, error};

/// Score a mark must exceed to count towards the best-students ranking.
pub const BEST_STUDENT_SCORE: i32 = 80;

/// Years whose `YYYY-MM-DD` text sorts in calendar order.
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Service error for student use-cases.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("student not found: {0}")]
    StudentNotFound(StudentId),
    #[error("student already exists: {0}")]
    StudentAlreadyExists(StudentId),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::StudentNotFound(id),
            RepoError::AlreadyExists(id) => Self::StudentAlreadyExists(id),
            other => Self::Repo(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Student service facade over repository implementations.
pub struct StudentService<R> {
    repo: R,
}

impl<R> StudentService<R>
where
    R: StudentRepository + StudentReportRepository,
{
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores a new student document.
    pub fn add_student(&self, student: Student) -> ServiceResult<Student> {
        for mark in &student.marks {
            ensure_storable_date(mark.date)?;
        }
        match self.repo.insert_student(&student) {
            Ok(()) => {
                debug!(
                    "event=student_add module=service status=ok id={} marks={}",
                    student.id,
                    student.marks.len()
                );
                Ok(student)
            }
            Err(RepoError::AlreadyExists(id)) => {
                error!("event=student_add module=service status=error id={id} error_code=already_exists");
                Err(ServiceError::StudentAlreadyExists(id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Appends one mark to a student's mark list.
    pub fn add_mark(&self, id: StudentId, mark: Mark) -> ServiceResult<Mark> {
        ensure_storable_date(mark.date)?;
        self.repo.push_mark(id, &mark)?;
        debug!(
            "event=mark_add module=service status=ok id={} subject={} score={} date={}",
            id, mark.subject, mark.score, mark.date
        );
        Ok(mark)
    }

    pub fn update_phone_number(&self, id: StudentId, phone: &str) -> ServiceResult<StudentContact> {
        let updated = self.repo.update_phone(id, phone)?;
        debug!(
            "event=phone_update module=service status=ok id={} phone={}",
            updated.id, updated.phone
        );
        Ok(updated)
    }

    /// Deletes a student and returns its id/phone projection.
    pub fn remove_student(&self, id: StudentId) -> ServiceResult<StudentContact> {
        let removed = self.repo.delete_student(id)?;
        debug!("event=student_remove module=service status=ok id={}", removed.id);
        Ok(removed)
    }

    /// Gets one student without marks.
    pub fn get_student(&self, id: StudentId) -> ServiceResult<StudentContact> {
        let student = self
            .repo
            .find_student_no_marks(id)?
            .ok_or(ServiceError::StudentNotFound(id))?;
        debug!("event=student_get module=service status=ok id={}", student.id);
        Ok(student)
    }

    /// Gets only the marks of one student.
    pub fn get_marks(&self, id: StudentId) -> ServiceResult<Vec<Mark>> {
        let marks = self
            .repo
            .find_student_only_marks(id)?
            .ok_or(ServiceError::StudentNotFound(id))?;
        debug!(
            "event=marks_get module=service status=ok id={} count={}",
            id,
            marks.len()
        );
        Ok(marks)
    }

    pub fn get_student_by_phone_number(&self, phone: &str) -> ServiceResult<Option<StudentContact>> {
        let student = self.repo.find_by_phone(phone)?;
        debug!(
            "event=student_by_phone module=service status=ok found={}",
            student.is_some()
        );
        Ok(student)
    }

    /// Students whose phone starts with `prefix` and is strictly longer than it.
    ///
    /// `prefix` is matched literally; regex metacharacters carry no meaning.
    pub fn get_students_by_phone_prefix(&self, prefix: &str) -> ServiceResult<Vec<StudentContact>> {
        let pattern = format!("^{}.+", regex::escape(prefix));
        let students = self.repo.find_by_phone_regex(&pattern)?;
        log_students("students_by_phone_prefix", &students);
        Ok(students)
    }

    /// Students having at least one mark on `date`.
    pub fn get_students_marks_date(&self, date: NaiveDate) -> ServiceResult<Vec<StudentContact>> {
        ensure_storable_date(date)?;
        let students = self.repo.find_by_mark_date(date)?;
        log_students("students_marks_date", &students);
        Ok(students)
    }

    /// Students having at least one mark within the given calendar month.
    ///
    /// Both the first and the last day of the month are included.
    pub fn get_students_marks_month_year(
        &self,
        month: u32,
        year: i32,
    ) -> ServiceResult<Vec<StudentContact>> {
        let (start, end) = month_bounds(month, year)?;
        let students = self.repo.find_by_marks_between_dates(start, end)?;
        log_students("students_marks_month_year", &students);
        Ok(students)
    }

    /// Students having at least one mark in `subject` scored `threshold` or higher.
    pub fn get_students_good_subject_mark(
        &self,
        subject: &str,
        threshold: i32,
    ) -> ServiceResult<Vec<StudentContact>> {
        let students = self.repo.find_good_subject_mark(subject, threshold)?;
        log_students("students_good_subject_mark", &students);
        Ok(students)
    }

    /// Students whose every mark is above `threshold`. Students without marks are excluded.
    pub fn get_students_all_good_marks(&self, threshold: i32) -> ServiceResult<Vec<StudentContact>> {
        let students = self.repo.find_all_good_marks(threshold)?;
        log_students("students_all_good_marks", &students);
        Ok(students)
    }

    /// Students whose every mark in `subject` is above `threshold`.
    pub fn get_students_all_good_marks_subject(
        &self,
        subject: &str,
        threshold: i32,
    ) -> ServiceResult<Vec<StudentContact>> {
        let students = self.repo.find_all_good_marks_in_subject(subject, threshold)?;
        log_students("students_all_good_marks_subject", &students);
        Ok(students)
    }

    /// Students having fewer than `n_marks` marks.
    pub fn get_students_few_marks(&self, n_marks: u32) -> ServiceResult<Vec<StudentContact>> {
        let students = self.repo.find_few_marks(n_marks)?;
        log_students("students_few_marks", &students);
        Ok(students)
    }

    /// Students whose mark count lies in `[min, max]`.
    pub fn get_students_marks_amount_between(
        &self,
        min: u32,
        max: u32,
    ) -> ServiceResult<Vec<StudentContact>> {
        if min > max {
            return Err(ServiceError::InvalidArgument(format!(
                "min marks amount {min} is greater than max {max}"
            )));
        }
        let students = self.repo.find_marks_amount_between(min, max)?;
        log_students("students_marks_amount_between", &students);
        Ok(students)
    }

    /// Marks of one student in one subject, in insertion order.
    pub fn get_student_marks_subject(
        &self,
        id: StudentId,
        subject: &str,
    ) -> ServiceResult<Vec<Mark>> {
        self.ensure_exists(id)?;
        let marks = self.repo.student_marks_by_subject(id, subject)?;
        debug!(
            "event=student_marks_subject module=service status=ok id={} subject={} count={}",
            id,
            subject,
            marks.len()
        );
        Ok(marks)
    }

    /// Marks of one student dated within `[from, to]`.
    pub fn get_student_marks_at_dates(
        &self,
        id: StudentId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ServiceResult<Vec<Mark>> {
        if from > to {
            return Err(ServiceError::InvalidArgument(format!(
                "date range start {from} is after end {to}"
            )));
        }
        ensure_storable_date(from)?;
        ensure_storable_date(to)?;
        self.ensure_exists(id)?;
        let marks = self.repo.student_marks_between_dates(id, from, to)?;
        debug!(
            "event=student_marks_at_dates module=service status=ok id={} from={} to={} count={}",
            id,
            from,
            to,
            marks.len()
        );
        Ok(marks)
    }

    /// Average scores above `threshold`, highest first.
    pub fn get_students_avg_score_greater(
        &self,
        threshold: i32,
    ) -> ServiceResult<Vec<StudentAvgScore>> {
        let scores = self.repo.avg_scores_greater(threshold)?;
        debug!(
            "event=students_avg_score_greater module=service status=ok threshold={} count={}",
            threshold,
            scores.len()
        );
        Ok(scores)
    }

    /// Ids of the `n_students` students with the most marks above [`BEST_STUDENT_SCORE`].
    pub fn get_best_students(&self, n_students: u32) -> ServiceResult<Vec<StudentId>> {
        let ids = self.repo.best_students(n_students, BEST_STUDENT_SCORE)?;
        debug!(
            "event=best_students module=service status=ok requested={} ids={:?}",
            n_students, ids
        );
        Ok(ids)
    }

    /// Ids of the `n_students` students with the lowest total score.
    pub fn get_worst_students(&self, n_students: u32) -> ServiceResult<Vec<StudentId>> {
        let ids = self.repo.worst_students(n_students)?;
        debug!(
            "event=worst_students module=service status=ok requested={} ids={:?}",
            n_students, ids
        );
        Ok(ids)
    }

    fn ensure_exists(&self, id: StudentId) -> ServiceResult<()> {
        if self.repo.exists(id)? {
            Ok(())
        } else {
            Err(ServiceError::StudentNotFound(id))
        }
    }
}

fn log_students(event: &str, students: &[StudentContact]) {
    debug!(
        "event={} module=service status=ok count={} ids={:?}",
        event,
        students.len(),
        students.iter().map(|student| student.id).collect::<Vec<_>>()
    );
}

/// Rejects dates whose stored text would not compare in calendar order.
fn ensure_storable_date(date: NaiveDate) -> ServiceResult<()> {
    if STORABLE_YEARS.contains(&date.year()) {
        Ok(())
    } else {
        Err(ServiceError::InvalidArgument(format!(
            "date {date} is outside years {}..={}",
            STORABLE_YEARS.start(),
            STORABLE_YEARS.end()
        )))
    }
}

/// Returns the first and last day of a calendar month.
fn month_bounds(month: u32, year: i32) -> ServiceResult<(NaiveDate, NaiveDate)> {
    if !STORABLE_YEARS.contains(&year) {
        return Err(ServiceError::InvalidArgument(format!(
            "year {year} is outside {}..={}",
            STORABLE_YEARS.start(),
            STORABLE_YEARS.end()
        )));
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        ServiceError::InvalidArgument(format!("invalid month {month} of year {year}"))
    })?;
    let next_month_start = if start.month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let end = next_month_start
        .and_then(|date| date.pred_opt())
        .ok_or_else(|| {
            ServiceError::InvalidArgument(format!("month {month} of year {year} is out of range"))
        })?;
    Ok((start, end))
}
