//! `students` command-line entry point.
//!
//! # Responsibility
//! - Bootstrap logging (files or stderr) and the document store from CLI/env configuration.
//! - Run exactly one service operation per invocation.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use log::info;
use serde::Serialize;
use students_core::db::open_db;
use students_core::{
    default_log_level, init_logging, init_stderr_logging, Mark, SqliteStudentRepository, Student,
    StudentService,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    match cli.log_dir.as_ref() {
        Some(log_dir) => {
            let log_dir = log_dir
                .to_str()
                .context("log directory must be valid UTF-8")?;
            init_logging(level, log_dir)
        }
        None => init_stderr_logging(level),
    }
    .context("failed to initialize logging")?;

    info!(
        "event=cli_start module=cli status=ok version={} db={}",
        students_core::core_version(),
        cli.db_path.display()
    );

    let conn = open_db(&cli.db_path)
        .with_context(|| format!("failed to open store `{}`", cli.db_path.display()))?;
    let repo = SqliteStudentRepository::try_new(&conn)?;
    let service = StudentService::new(repo);

    run(&service, cli.command)
}

fn run(
    service: &StudentService<SqliteStudentRepository<'_>>,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::AddStudent { id, phone } => {
            print_json(&service.add_student(Student::new(id, phone))?)
        }
        Command::AddMark {
            id,
            subject,
            score,
            date,
        } => print_json(&service.add_mark(id, Mark::new(subject, score, date))?),
        Command::UpdatePhone { id, phone } => {
            print_json(&service.update_phone_number(id, &phone)?)
        }
        Command::Remove { id } => print_json(&service.remove_student(id)?),
        Command::Get { id } => print_json(&service.get_student(id)?),
        Command::Marks { id } => print_json(&service.get_marks(id)?),
        Command::ByPhone { phone } => print_json(&service.get_student_by_phone_number(&phone)?),
        Command::PhonePrefix { prefix } => {
            print_json(&service.get_students_by_phone_prefix(&prefix)?)
        }
        Command::MarksDate { date } => print_json(&service.get_students_marks_date(date)?),
        Command::MarksMonth { month, year } => {
            print_json(&service.get_students_marks_month_year(month, year)?)
        }
        Command::GoodSubjectMark { subject, threshold } => {
            print_json(&service.get_students_good_subject_mark(&subject, threshold)?)
        }
        Command::AllGoodMarks { threshold } => {
            print_json(&service.get_students_all_good_marks(threshold)?)
        }
        Command::AllGoodMarksSubject { subject, threshold } => {
            print_json(&service.get_students_all_good_marks_subject(&subject, threshold)?)
        }
        Command::FewMarks { count } => print_json(&service.get_students_few_marks(count)?),
        Command::MarksAmountBetween { min, max } => {
            print_json(&service.get_students_marks_amount_between(min, max)?)
        }
        Command::MarksSubject { id, subject } => {
            print_json(&service.get_student_marks_subject(id, &subject)?)
        }
        Command::MarksAtDates { id, from, to } => {
            print_json(&service.get_student_marks_at_dates(id, from, to)?)
        }
        Command::AvgScoreGreater { threshold } => {
            print_json(&service.get_students_avg_score_greater(threshold)?)
        }
        Command::Best { count } => print_json(&service.get_best_students(count)?),
        Command::Worst { count } => print_json(&service.get_worst_students(count)?),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
