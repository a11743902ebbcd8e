mod common;

use common::*;
use students_core::{
    Mark, RepoError, ServiceError, SqliteStudentRepository, Student, StudentContact,
    StudentRepository, StudentService,
};

#[test]
fn add_student_stores_full_document() {
    let conn = seeded_db();
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn).unwrap());

    let student = Student::with_marks(
        10,
        "058-0000010",
        vec![Mark::new("history", 77, day(2024, 4, 2))],
    );
    assert_eq!(service.add_student(student.clone()).unwrap(), student);

    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    assert_eq!(repo.find_student(10).unwrap(), Some(student));
}

#[test]
fn add_student_already_exists_returns_error() {
    let conn = seeded_db();
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn).unwrap());

    let err = service
        .add_student(Student::new(ID_1, "another phone"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::StudentAlreadyExists(ID_1)));

    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let stored = repo.find_student(ID_1).unwrap().unwrap();
    assert_eq!(stored.phone, PHONE_1);
    assert_eq!(stored.marks.len(), 3);
}

#[test]
fn repository_insert_duplicate_returns_already_exists() {
    let conn = seeded_db();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let err = repo.insert_student(&Student::new(ID_2, "x")).unwrap_err();
    assert!(matches!(err, RepoError::AlreadyExists(ID_2)));
}

#[test]
fn update_phone_number_keeps_marks() {
    let conn = seeded_db();
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn).unwrap());

    let updated = service.update_phone_number(ID_1, "new phone").unwrap();
    assert_eq!(updated, StudentContact::new(ID_1, "new phone"));

    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let stored = repo.find_student(ID_1).unwrap().unwrap();
    assert_eq!(stored.phone, "new phone");
    assert_eq!(stored.marks, students()[0].marks);
}

#[test]
fn update_phone_number_not_found_returns_error() {
    let conn = seeded_db();
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn).unwrap());

    let err = service.update_phone_number(ID_NOT_EXIST, "002").unwrap_err();
    assert!(matches!(err, ServiceError::StudentNotFound(ID_NOT_EXIST)));
}

#[test]
fn add_mark_appends_to_end_of_list() {
    let conn = seeded_db();
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn).unwrap());
    let mark = Mark::new("biology", 66, day(2024, 5, 1));

    assert!(!service.get_marks(ID_1).unwrap().contains(&mark));
    assert_eq!(service.add_mark(ID_1, mark.clone()).unwrap(), mark);

    let marks = service.get_marks(ID_1).unwrap();
    assert_eq!(marks.len(), 4);
    assert_eq!(marks.last(), Some(&mark));
}

#[test]
fn add_mark_to_student_without_marks() {
    let conn = seeded_db();
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn).unwrap());
    let mark = Mark::new("math", 50, day(2024, 6, 1));

    service.add_mark(ID_4, mark.clone()).unwrap();
    assert_eq!(service.get_marks(ID_4).unwrap(), vec![mark]);
}

#[test]
fn add_mark_not_found_returns_error() {
    let conn = seeded_db();
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn).unwrap());

    let err = service
        .add_mark(ID_NOT_EXIST, Mark::new("math", 90, day(2024, 1, 1)))
        .unwrap_err();
    assert!(matches!(err, ServiceError::StudentNotFound(ID_NOT_EXIST)));
}

#[test]
fn remove_student_returns_contact_and_deletes_document() {
    let conn = seeded_db();
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn).unwrap());

    assert_eq!(
        service.remove_student(ID_3).unwrap(),
        StudentContact::new(ID_3, PHONE_3)
    );
    assert!(matches!(
        service.get_student(ID_3),
        Err(ServiceError::StudentNotFound(ID_3))
    ));
    assert!(matches!(
        service.remove_student(ID_3),
        Err(ServiceError::StudentNotFound(ID_3))
    ));
}

#[test]
fn get_student_returns_contact_without_marks() {
    let conn = seeded_db();
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn).unwrap());

    assert_eq!(
        service.get_student(ID_2).unwrap(),
        StudentContact::new(ID_2, PHONE_2)
    );
    assert!(matches!(
        service.get_student(ID_NOT_EXIST),
        Err(ServiceError::StudentNotFound(ID_NOT_EXIST))
    ));
}

#[test]
fn get_marks_returns_marks_in_insertion_order() {
    let conn = seeded_db();
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn).unwrap());

    assert_eq!(service.get_marks(ID_2).unwrap(), students()[1].marks);
    assert!(service.get_marks(ID_4).unwrap().is_empty());
    assert!(matches!(
        service.get_marks(ID_NOT_EXIST),
        Err(ServiceError::StudentNotFound(ID_NOT_EXIST))
    ));
}

#[test]
fn repository_reports_corrupt_marks_document() {
    let conn = seeded_db();
    conn.execute("UPDATE students SET marks = '[1, 2]' WHERE id = 1;", [])
        .unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.find_student(ID_1),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn marks_dated_beyond_four_digit_years_are_rejected() {
    let conn = seeded_db();
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn).unwrap());

    assert!(matches!(
        service.add_mark(ID_1, Mark::new("math", 90, day(10000, 1, 1))),
        Err(ServiceError::InvalidArgument(_))
    ));
    assert!(matches!(
        service.add_student(Student::with_marks(
            11,
            "058-0000011",
            vec![Mark::new("math", 90, day(-1, 6, 1))],
        )),
        Err(ServiceError::InvalidArgument(_))
    ));

    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    assert_eq!(repo.find_student(ID_1).unwrap().unwrap().marks.len(), 3);
    assert_eq!(repo.find_student(11).unwrap(), None);
}
