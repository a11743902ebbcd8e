//! Student document repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide single-document lookups and mutations over `students`.
//! - Provide declarative filters that return id/phone projections.
//!
//! # Invariants
//! - Marks are appended in place; no call rewrites existing marks.
//! - Filter results are ordered by student id ascending.
//! - Read paths reject malformed persisted documents instead of masking them.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::student::{Mark, Student, StudentContact, StudentId};
use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Params, Row};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for student persistence and query operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("student not found: {0}")]
    NotFound(StudentId),
    #[error("student already exists: {0}")]
    AlreadyExists(StudentId),
    #[error("student repository requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("student repository requires table `{0}`")]
    MissingRequiredTable(&'static str),
    #[error("student repository requires column `{column}` in table `{table}`")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    #[error("invalid persisted student data: {0}")]
    InvalidData(String),
    #[error("failed to serialize marks: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for student documents.
pub trait StudentRepository {
    fn exists(&self, id: StudentId) -> RepoResult<bool>;
    /// Inserts a full document. Fails with `AlreadyExists` on a duplicate id.
    fn insert_student(&self, student: &Student) -> RepoResult<()>;
    fn find_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn find_student_no_marks(&self, id: StudentId) -> RepoResult<Option<StudentContact>>;
    /// Returns `None` when the student is absent, `Some(vec![])` when it has no marks.
    fn find_student_only_marks(&self, id: StudentId) -> RepoResult<Option<Vec<Mark>>>;
    fn push_mark(&self, id: StudentId, mark: &Mark) -> RepoResult<()>;
    fn update_phone(&self, id: StudentId, phone: &str) -> RepoResult<StudentContact>;
    fn delete_student(&self, id: StudentId) -> RepoResult<StudentContact>;
    fn find_by_phone(&self, phone: &str) -> RepoResult<Option<StudentContact>>;
    fn find_by_phone_regex(&self, pattern: &str) -> RepoResult<Vec<StudentContact>>;
    fn find_by_mark_date(&self, date: NaiveDate) -> RepoResult<Vec<StudentContact>>;
    /// Students having at least one mark dated within `[from, to]`.
    fn find_by_marks_between_dates(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<StudentContact>>;
    /// Students having a mark in `subject` scored at least `threshold`.
    fn find_good_subject_mark(
        &self,
        subject: &str,
        threshold: i32,
    ) -> RepoResult<Vec<StudentContact>>;
    /// Students with at least one mark and every score above `threshold`.
    fn find_all_good_marks(&self, threshold: i32) -> RepoResult<Vec<StudentContact>>;
    /// Students with marks in `subject`, every one of them above `threshold`.
    fn find_all_good_marks_in_subject(
        &self,
        subject: &str,
        threshold: i32,
    ) -> RepoResult<Vec<StudentContact>>;
    /// Students with fewer than `n_marks` marks, including students without marks.
    fn find_few_marks(&self, n_marks: u32) -> RepoResult<Vec<StudentContact>>;
    fn find_marks_amount_between(&self, min: u32, max: u32) -> RepoResult<Vec<StudentContact>>;
}

/// SQLite-backed student document repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_students_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &'conn Connection {
        self.conn
    }

    fn query_contacts<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<StudentContact>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }
        Ok(contacts)
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn exists(&self, id: StudentId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM students WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn insert_student(&self, student: &Student) -> RepoResult<()> {
        let marks = serde_json::to_string(&student.marks)?;
        let result = self.conn.execute(
            "INSERT INTO students (id, phone, marks) VALUES (?1, ?2, ?3);",
            params![student.id, student.phone.as_str(), marks],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation
                    && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Err(RepoError::AlreadyExists(student.id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn find_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, phone, marks FROM students WHERE id = ?1;",
                [id],
                |row| {
                    Ok((
                        row.get::<_, StudentId>("id")?,
                        row.get::<_, String>("phone")?,
                        row.get::<_, String>("marks")?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, phone, marks)) => {
                Ok(Some(Student::with_marks(id, phone, parse_marks(id, &marks)?)))
            }
            None => Ok(None),
        }
    }

    fn find_student_no_marks(&self, id: StudentId) -> RepoResult<Option<StudentContact>> {
        let contact = self
            .conn
            .query_row(
                "SELECT id, phone FROM students WHERE id = ?1;",
                [id],
                |row| Ok(StudentContact::new(row.get("id")?, row.get::<_, String>("phone")?)),
            )
            .optional()?;
        Ok(contact)
    }

    fn find_student_only_marks(&self, id: StudentId) -> RepoResult<Option<Vec<Mark>>> {
        let marks = self
            .conn
            .query_row("SELECT marks FROM students WHERE id = ?1;", [id], |row| {
                row.get::<_, String>("marks")
            })
            .optional()?;

        marks.map(|value| parse_marks(id, &value)).transpose()
    }

    fn push_mark(&self, id: StudentId, mark: &Mark) -> RepoResult<()> {
        let mark_json = serde_json::to_string(mark)?;
        let changed = self.conn.execute(
            "UPDATE students
             SET marks = json_insert(marks, '$[#]', json(?2))
             WHERE id = ?1;",
            params![id, mark_json],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn update_phone(&self, id: StudentId, phone: &str) -> RepoResult<StudentContact> {
        self.conn
            .query_row(
                "UPDATE students SET phone = ?2 WHERE id = ?1 RETURNING id, phone;",
                params![id, phone],
                |row| Ok(StudentContact::new(row.get("id")?, row.get::<_, String>("phone")?)),
            )
            .optional()?
            .ok_or(RepoError::NotFound(id))
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<StudentContact> {
        self.conn
            .query_row(
                "DELETE FROM students WHERE id = ?1 RETURNING id, phone;",
                [id],
                |row| Ok(StudentContact::new(row.get("id")?, row.get::<_, String>("phone")?)),
            )
            .optional()?
            .ok_or(RepoError::NotFound(id))
    }

    fn find_by_phone(&self, phone: &str) -> RepoResult<Option<StudentContact>> {
        Ok(self
            .query_contacts(
                "SELECT id, phone FROM students WHERE phone = ?1 ORDER BY id ASC LIMIT 1;",
                [phone],
            )?
            .into_iter()
            .next())
    }

    fn find_by_phone_regex(&self, pattern: &str) -> RepoResult<Vec<StudentContact>> {
        self.query_contacts(
            "SELECT id, phone FROM students WHERE phone REGEXP ?1 ORDER BY id ASC;",
            [pattern],
        )
    }

    fn find_by_mark_date(&self, date: NaiveDate) -> RepoResult<Vec<StudentContact>> {
        self.query_contacts(
            "SELECT s.id, s.phone
             FROM students s
             WHERE EXISTS (
                SELECT 1 FROM json_each(s.marks) m
                WHERE json_extract(m.value, '$.date') = ?1
             )
             ORDER BY s.id ASC;",
            [date],
        )
    }

    fn find_by_marks_between_dates(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<StudentContact>> {
        self.query_contacts(
            "SELECT s.id, s.phone
             FROM students s
             WHERE EXISTS (
                SELECT 1 FROM json_each(s.marks) m
                WHERE json_extract(m.value, '$.date') BETWEEN ?1 AND ?2
             )
             ORDER BY s.id ASC;",
            [from, to],
        )
    }

    fn find_good_subject_mark(
        &self,
        subject: &str,
        threshold: i32,
    ) -> RepoResult<Vec<StudentContact>> {
        self.query_contacts(
            "SELECT s.id, s.phone
             FROM students s
             WHERE EXISTS (
                SELECT 1 FROM json_each(s.marks) m
                WHERE json_extract(m.value, '$.subject') = ?1
                  AND json_extract(m.value, '$.score') >= ?2
             )
             ORDER BY s.id ASC;",
            params![subject, threshold],
        )
    }

    fn find_all_good_marks(&self, threshold: i32) -> RepoResult<Vec<StudentContact>> {
        self.query_contacts(
            "SELECT s.id, s.phone
             FROM students s
             WHERE json_array_length(s.marks) > 0
               AND NOT EXISTS (
                SELECT 1 FROM json_each(s.marks) m
                WHERE json_extract(m.value, '$.score') <= ?1
             )
             ORDER BY s.id ASC;",
            [threshold],
        )
    }

    fn find_all_good_marks_in_subject(
        &self,
        subject: &str,
        threshold: i32,
    ) -> RepoResult<Vec<StudentContact>> {
        self.query_contacts(
            "SELECT s.id, s.phone
             FROM students s
             WHERE EXISTS (
                SELECT 1 FROM json_each(s.marks) m
                WHERE json_extract(m.value, '$.subject') = ?1
             )
               AND NOT EXISTS (
                SELECT 1 FROM json_each(s.marks) m
                WHERE json_extract(m.value, '$.subject') = ?1
                  AND json_extract(m.value, '$.score') <= ?2
             )
             ORDER BY s.id ASC;",
            params![subject, threshold],
        )
    }

    fn find_few_marks(&self, n_marks: u32) -> RepoResult<Vec<StudentContact>> {
        self.query_contacts(
            "SELECT id, phone
             FROM students
             WHERE json_array_length(marks) < ?1
             ORDER BY id ASC;",
            [n_marks],
        )
    }

    fn find_marks_amount_between(&self, min: u32, max: u32) -> RepoResult<Vec<StudentContact>> {
        self.query_contacts(
            "SELECT id, phone
             FROM students
             WHERE json_array_length(marks) BETWEEN ?1 AND ?2
             ORDER BY id ASC;",
            [min, max],
        )
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<StudentContact> {
    Ok(StudentContact::new(
        row.get(0)?,
        row.get::<_, String>(1)?,
    ))
}

fn parse_marks(id: StudentId, value: &str) -> RepoResult<Vec<Mark>> {
    serde_json::from_str(value).map_err(|err| {
        RepoError::InvalidData(format!("invalid marks document for student {id}: {err}"))
    })
}

fn ensure_students_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "students")? {
        return Err(RepoError::MissingRequiredTable("students"));
    }

    for column in ["id", "phone", "marks"] {
        if !table_has_column(conn, "students", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "students",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
