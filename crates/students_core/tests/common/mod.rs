#![allow(dead_code)]

use chrono::NaiveDate;
use rusqlite::Connection;
use students_core::db::open_db_in_memory;
use students_core::{Mark, SqliteStudentRepository, Student, StudentContact, StudentRepository};

pub const ID_1: i64 = 1;
pub const ID_2: i64 = 2;
pub const ID_3: i64 = 3;
pub const ID_4: i64 = 4;
pub const ID_5: i64 = 5;
pub const ID_NOT_EXIST: i64 = 1000;

pub const PHONE_1: &str = "050-1111111";
pub const PHONE_2: &str = "050-2222222";
pub const PHONE_3: &str = "052-3333333";
pub const PHONE_4: &str = "053-4444444";
pub const PHONE_5: &str = "054-5555555";

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Seed documents shared by service and repository tests.
///
/// | id | marks (subject score date)                                   |
/// |----|--------------------------------------------------------------|
/// | 1  | math 80 01-10, physics 70 01-31, math 90 02-05               |
/// | 2  | math 95 01-10, physics 85 02-15, chemistry 100 03-01         |
/// | 3  | chemistry 60 02-15                                            |
/// | 4  | (none)                                                        |
/// | 5  | math 85 03-20, physics 90 03-21                              |
pub fn students() -> Vec<Student> {
    vec![
        Student::with_marks(
            ID_1,
            PHONE_1,
            vec![
                Mark::new("math", 80, day(2024, 1, 10)),
                Mark::new("physics", 70, day(2024, 1, 31)),
                Mark::new("math", 90, day(2024, 2, 5)),
            ],
        ),
        Student::with_marks(
            ID_2,
            PHONE_2,
            vec![
                Mark::new("math", 95, day(2024, 1, 10)),
                Mark::new("physics", 85, day(2024, 2, 15)),
                Mark::new("chemistry", 100, day(2024, 3, 1)),
            ],
        ),
        Student::with_marks(
            ID_3,
            PHONE_3,
            vec![Mark::new("chemistry", 60, day(2024, 2, 15))],
        ),
        Student::new(ID_4, PHONE_4),
        Student::with_marks(
            ID_5,
            PHONE_5,
            vec![
                Mark::new("math", 85, day(2024, 3, 20)),
                Mark::new("physics", 90, day(2024, 3, 21)),
            ],
        ),
    ]
}

/// Opens an in-memory store populated with [`students`].
pub fn seeded_db() -> Connection {
    let conn = open_db_in_memory().unwrap();
    {
        let repo = SqliteStudentRepository::try_new(&conn).unwrap();
        for student in students() {
            repo.insert_student(&student).unwrap();
        }
    }
    conn
}

pub fn ids(students: &[StudentContact]) -> Vec<i64> {
    students.iter().map(|student| student.id).collect()
}
