//! Command-line surface over `StudentService`.
//!
//! # Responsibility
//! - Parse global configuration (store path, logging) from flags or env.
//! - Map one subcommand onto one service call and print the result as JSON.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use students_core::StudentId;

#[derive(Debug, Clone, Parser)]
#[command(name = "students", version, about = "Student records and exam marks")]
pub struct Cli {
    /// Path of the SQLite document store.
    #[arg(
        long = "db",
        default_value = "students.sqlite3",
        env = "STUDENTS_DB_PATH"
    )]
    pub db_path: PathBuf,

    /// Maximum log level (trace|debug|info|warn|error). Defaults by build mode.
    #[arg(long = "log-level", env = "STUDENTS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files. Logs go to stderr when unset.
    #[arg(long = "log-dir", env = "STUDENTS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Store a new student without marks.
    AddStudent {
        #[arg(long)]
        id: StudentId,
        #[arg(long)]
        phone: String,
    },
    /// Append a mark to a student.
    AddMark {
        #[arg(long)]
        id: StudentId,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        score: i32,
        /// Mark date as YYYY-MM-DD.
        #[arg(long)]
        date: NaiveDate,
    },
    /// Replace a student's phone number.
    UpdatePhone {
        #[arg(long)]
        id: StudentId,
        #[arg(long)]
        phone: String,
    },
    /// Delete a student and print its id and phone.
    Remove {
        #[arg(long)]
        id: StudentId,
    },
    /// Show one student without marks.
    Get {
        #[arg(long)]
        id: StudentId,
    },
    /// Show only the marks of one student.
    Marks {
        #[arg(long)]
        id: StudentId,
    },
    /// Find a student by exact phone number.
    ByPhone {
        #[arg(long)]
        phone: String,
    },
    /// Students whose phone starts with a literal prefix.
    PhonePrefix {
        #[arg(long)]
        prefix: String,
    },
    /// Students with a mark on a date (YYYY-MM-DD).
    MarksDate {
        #[arg(long)]
        date: NaiveDate,
    },
    /// Students with a mark within a calendar month.
    MarksMonth {
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
    },
    /// Students with at least one mark in a subject at or above the threshold.
    GoodSubjectMark {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        threshold: i32,
    },
    /// Students whose every mark is above the threshold.
    AllGoodMarks {
        #[arg(long)]
        threshold: i32,
    },
    /// Students whose every mark in a subject is above the threshold.
    AllGoodMarksSubject {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        threshold: i32,
    },
    /// Students with fewer marks than `count`.
    FewMarks {
        #[arg(long)]
        count: u32,
    },
    /// Students whose mark count lies in [min, max].
    MarksAmountBetween {
        #[arg(long)]
        min: u32,
        #[arg(long)]
        max: u32,
    },
    /// Marks of one student in one subject.
    MarksSubject {
        #[arg(long)]
        id: StudentId,
        #[arg(long)]
        subject: String,
    },
    /// Marks of one student dated within [from, to].
    MarksAtDates {
        #[arg(long)]
        id: StudentId,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Average scores above the threshold, highest first.
    AvgScoreGreater {
        #[arg(long)]
        threshold: i32,
    },
    /// Ids of the students with the most marks above 80.
    Best {
        #[arg(long)]
        count: u32,
    },
    /// Ids of the students with the lowest total score.
    Worst {
        #[arg(long)]
        count: u32,
    },
}
