use chrono::{NaiveDate, NaiveTime};
use exam_organizer::{
    Exam, ExamField, ExamForm, parse_csv_time, parse_entry_time, parse_iso_date, validate_exam,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn sample_exam() -> Exam {
    Exam::new(
        "CS101",
        "Programming Fundamentals",
        d(2025, 3, 10),
        t(9, 30),
        "Room 101",
    )
}

#[test]
fn valid_exam_has_no_violations() {
    let violations = validate_exam(&sample_exam(), d(2025, 1, 1));
    assert!(violations.is_empty(), "unexpected: {violations:?}");
}

#[test]
fn blank_course_code_is_rejected() {
    let mut exam = sample_exam();
    exam.course_code = "   ".into();
    let violations = validate_exam(&exam, d(2025, 1, 1));
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, ExamField::CourseCode);
}

#[test]
fn overlong_fields_are_rejected() {
    let mut exam = sample_exam();
    exam.course_code = "x".repeat(51);
    exam.course_name = "y".repeat(101);
    exam.location = "z".repeat(101);
    let violations = validate_exam(&exam, d(2025, 1, 1));
    let fields: Vec<ExamField> = violations.iter().map(|v| v.field).collect();
    assert_eq!(
        fields,
        vec![ExamField::CourseCode, ExamField::CourseName, ExamField::Location]
    );
}

#[test]
fn boundary_lengths_are_accepted() {
    let mut exam = sample_exam();
    exam.course_code = "x".repeat(50);
    exam.course_name = "y".repeat(100);
    exam.location = "z".repeat(100);
    assert!(validate_exam(&exam, d(2025, 1, 1)).is_empty());
}

#[test]
fn past_date_is_rejected_and_today_accepted() {
    let mut exam = sample_exam();
    exam.exam_date = d(2024, 12, 31);
    let violations = validate_exam(&exam, d(2025, 1, 1));
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, ExamField::ExamDate);
    assert_eq!(violations[0].message, "Exam date cannot be in the past");

    exam.exam_date = d(2025, 1, 1);
    assert!(validate_exam(&exam, d(2025, 1, 1)).is_empty());
}

#[test]
fn all_violations_are_aggregated_in_one_pass() {
    let mut exam = sample_exam();
    exam.course_code = "".into();
    exam.course_name = "".into();
    exam.exam_date = d(2024, 6, 1);
    exam.location = "".into();
    let violations = validate_exam(&exam, d(2025, 1, 1));
    assert_eq!(violations.len(), 4);
}

#[test]
fn strict_entry_time_requires_zero_padding() {
    assert_eq!(parse_entry_time("09:00"), Some(t(9, 0)));
    assert_eq!(parse_entry_time(" 14:05 "), Some(t(14, 5)));
    assert_eq!(parse_entry_time("9:00"), None);
    assert_eq!(parse_entry_time("09:0"), None);
    assert_eq!(parse_entry_time("09:00:00"), None);
    assert_eq!(parse_entry_time("ab:cd"), None);
    assert_eq!(parse_entry_time("24:00"), None);
    assert_eq!(parse_entry_time(""), None);
}

#[test]
fn csv_time_accepts_with_and_without_seconds() {
    assert_eq!(parse_csv_time("09:30:00"), Some(t(9, 30)));
    assert_eq!(parse_csv_time("09:30"), Some(t(9, 30)));
    assert_eq!(parse_csv_time("25:00"), None);
    assert_eq!(parse_csv_time("noon"), None);
}

#[test]
fn csv_time_requires_zero_padding_like_the_entry_path() {
    assert_eq!(parse_csv_time("9:30"), None);
    assert_eq!(parse_csv_time("9:30:00"), None);
    assert_eq!(parse_csv_time("09:3"), None);
    assert_eq!(parse_csv_time("09:30:0"), None);
}

#[test]
fn iso_date_requires_the_exact_padded_shape() {
    assert_eq!(parse_iso_date("2025-03-01"), Some(d(2025, 3, 1)));
    assert_eq!(parse_iso_date(" 2025-03-01 "), Some(d(2025, 3, 1)));
    assert_eq!(parse_iso_date("2025-3-1"), None);
    assert_eq!(parse_iso_date("2025/03/01"), None);
    assert_eq!(parse_iso_date("2025-13-01"), None);
    assert_eq!(parse_iso_date(""), None);
}

#[test]
fn form_builds_exam_with_trimmed_fields_and_id_zero() {
    let form = ExamForm {
        course_code: " CS101 ".into(),
        course_name: "Programming Fundamentals".into(),
        exam_date: "2099-03-10".into(),
        exam_time: "09:30".into(),
        location: " Room 101 ".into(),
    };
    let exam = form.build(d(2025, 1, 1)).expect("form should build");
    assert_eq!(exam.id, 0);
    assert_eq!(exam.course_code, "CS101");
    assert_eq!(exam.location, "Room 101");
    assert_eq!(exam.exam_date, d(2099, 3, 10));
    assert_eq!(exam.exam_time, t(9, 30));
}

#[test]
fn form_rejects_unpadded_time_on_the_entry_path() {
    let form = ExamForm {
        course_code: "CS101".into(),
        course_name: "Programming Fundamentals".into(),
        exam_date: "2099-03-10".into(),
        exam_time: "9:00".into(),
        location: "Room 101".into(),
    };
    let violations = form.build(d(2025, 1, 1)).unwrap_err();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, ExamField::ExamTime);
    assert_eq!(violations[0].message, "Exam time must use HH:MM format");
}

#[test]
fn empty_form_reports_every_field() {
    let violations = ExamForm::default().build(d(2025, 1, 1)).unwrap_err();
    let fields: Vec<ExamField> = violations.iter().map(|v| v.field).collect();
    assert_eq!(
        fields,
        vec![
            ExamField::CourseCode,
            ExamField::CourseName,
            ExamField::ExamDate,
            ExamField::ExamTime,
            ExamField::Location,
        ]
    );
}

#[test]
fn form_rejects_malformed_and_past_dates() {
    let mut form = ExamForm {
        course_code: "CS101".into(),
        course_name: "Programming Fundamentals".into(),
        exam_date: "10/03/2099".into(),
        exam_time: "09:30".into(),
        location: "Room 101".into(),
    };
    let violations = form.build(d(2025, 1, 1)).unwrap_err();
    assert_eq!(violations[0].message, "Exam date must use YYYY-MM-DD format");

    form.exam_date = "2024-12-31".into();
    let violations = form.build(d(2025, 1, 1)).unwrap_err();
    assert_eq!(violations[0].message, "Exam date cannot be in the past");
}
