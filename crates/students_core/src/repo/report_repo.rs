//! Aggregation pipelines over student documents.
//!
//! # Responsibility
//! - Express unwind/match/group/sort/limit/project pipelines as single
//!   declarative statements against the document store.
//! - Map aggregation output rows onto read-only projections.
//!
//! # Invariants
//! - Aggregations never mutate documents.
//! - Unwound mark lists keep the document's insertion order.
//! - Ranking ties are broken by student id ascending.

use crate::model::student::{Mark, StudentAvgScore, StudentId};
use crate::repo::student_repo::{RepoResult, SqliteStudentRepository};
use chrono::NaiveDate;
use rusqlite::{params, Params, Row};

/// Repository interface for aggregation queries.
pub trait StudentReportRepository {
    /// match id -> unwind marks -> match subject -> project mark.
    fn student_marks_by_subject(&self, id: StudentId, subject: &str) -> RepoResult<Vec<Mark>>;
    /// match id -> unwind marks -> match `from <= date <= to` -> project mark.
    fn student_marks_between_dates(
        &self,
        id: StudentId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<Mark>>;
    /// unwind -> group by id avg(score) -> match avg > threshold -> sort avg desc.
    fn avg_scores_greater(&self, threshold: i32) -> RepoResult<Vec<StudentAvgScore>>;
    /// unwind -> match score > criteria -> group by id count -> sort count desc -> limit.
    fn best_students(&self, n_students: u32, score_criteria: i32) -> RepoResult<Vec<StudentId>>;
    /// project sum(scores) -> sort sum asc -> limit. Students without marks sum to 0.
    fn worst_students(&self, n_students: u32) -> RepoResult<Vec<StudentId>>;
}

impl SqliteStudentRepository<'_> {
    fn query_marks<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Mark>> {
        let mut stmt = self.conn().prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut marks = Vec::new();
        while let Some(row) = rows.next()? {
            marks.push(parse_mark_row(row)?);
        }
        Ok(marks)
    }

    fn query_ids<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<StudentId>> {
        let mut stmt = self.conn().prepare(sql)?;
        let ids = stmt
            .query_map(params, |row| row.get::<_, StudentId>("id"))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}

impl StudentReportRepository for SqliteStudentRepository<'_> {
    fn student_marks_by_subject(&self, id: StudentId, subject: &str) -> RepoResult<Vec<Mark>> {
        self.query_marks(
            "SELECT
                json_extract(m.value, '$.subject') AS subject,
                json_extract(m.value, '$.score') AS score,
                json_extract(m.value, '$.date') AS date
             FROM students s, json_each(s.marks) m
             WHERE s.id = ?1
               AND json_extract(m.value, '$.subject') = ?2
             ORDER BY m.key ASC;",
            params![id, subject],
        )
    }

    fn student_marks_between_dates(
        &self,
        id: StudentId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<Mark>> {
        self.query_marks(
            "SELECT
                json_extract(m.value, '$.subject') AS subject,
                json_extract(m.value, '$.score') AS score,
                json_extract(m.value, '$.date') AS date
             FROM students s, json_each(s.marks) m
             WHERE s.id = ?1
               AND json_extract(m.value, '$.date') BETWEEN ?2 AND ?3
             ORDER BY m.key ASC;",
            params![id, from, to],
        )
    }

    fn avg_scores_greater(&self, threshold: i32) -> RepoResult<Vec<StudentAvgScore>> {
        let mut stmt = self.conn().prepare(
            "SELECT s.id AS id, AVG(json_extract(m.value, '$.score')) AS avg_score
             FROM students s, json_each(s.marks) m
             GROUP BY s.id
             HAVING avg_score > ?1
             ORDER BY avg_score DESC, s.id ASC;",
        )?;
        let scores = stmt
            .query_map([threshold], |row| {
                let avg: f64 = row.get("avg_score")?;
                Ok(StudentAvgScore {
                    id: row.get("id")?,
                    avg_score: avg.trunc() as i32,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(scores)
    }

    fn best_students(&self, n_students: u32, score_criteria: i32) -> RepoResult<Vec<StudentId>> {
        self.query_ids(
            "SELECT s.id AS id, COUNT(*) AS n_scores
             FROM students s, json_each(s.marks) m
             WHERE json_extract(m.value, '$.score') > ?1
             GROUP BY s.id
             ORDER BY n_scores DESC, s.id ASC
             LIMIT ?2;",
            params![score_criteria, n_students],
        )
    }

    fn worst_students(&self, n_students: u32) -> RepoResult<Vec<StudentId>> {
        self.query_ids(
            "SELECT
                s.id AS id,
                COALESCE(
                    (SELECT SUM(json_extract(m.value, '$.score')) FROM json_each(s.marks) m),
                    0
                ) AS sum_score
             FROM students s
             ORDER BY sum_score ASC, s.id ASC
             LIMIT ?1;",
            [n_students],
        )
    }
}

fn parse_mark_row(row: &Row<'_>) -> RepoResult<Mark> {
    Ok(Mark {
        subject: row.get("subject")?,
        score: row.get("score")?,
        date: row.get("date")?,
    })
}
