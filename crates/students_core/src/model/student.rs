//! Student document model.
//!
//! # Responsibility
//! - Define the persisted student document and its embedded marks.
//! - Define projections returned by lookups and aggregations.
//!
//! # Invariants
//! - `id` never changes once a student is stored.
//! - Marks are only appended; their order is insertion order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Numeric student identifier, unique within the store.
pub type StudentId = i64;

/// One exam result inside a student's mark list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub subject: String,
    pub score: i32,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
}

impl Mark {
    pub fn new(subject: impl Into<String>, score: i32, date: NaiveDate) -> Self {
        Self {
            subject: subject.into(),
            score,
            date,
        }
    }
}

/// Persisted student document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub phone: String,
    #[serde(default)]
    pub marks: Vec<Mark>,
}

impl Student {
    /// Creates a student document with an empty mark list.
    pub fn new(id: StudentId, phone: impl Into<String>) -> Self {
        Self::with_marks(id, phone, Vec::new())
    }

    pub fn with_marks(id: StudentId, phone: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            id,
            phone: phone.into(),
            marks,
        }
    }

    /// Projects this document onto its id/phone pair.
    pub fn contact(&self) -> StudentContact {
        StudentContact {
            id: self.id,
            phone: self.phone.clone(),
        }
    }
}

/// Student projection without marks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentContact {
    pub id: StudentId,
    pub phone: String,
}

impl StudentContact {
    pub fn new(id: StudentId, phone: impl Into<String>) -> Self {
        Self {
            id,
            phone: phone.into(),
        }
    }
}

/// Average score of one student, produced by aggregation only.
///
/// `avg_score` is the arithmetic mean truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAvgScore {
    pub id: StudentId,
    pub avg_score: i32,
}
