use crate::exam::Exam;
use chrono::{NaiveDate, NaiveTime};
use std::fmt;

pub const MAX_COURSE_CODE_LEN: usize = 50;
pub const MAX_COURSE_NAME_LEN: usize = 100;
pub const MAX_LOCATION_LEN: usize = 100;

// Digits everywhere except the given separator positions.
fn shaped(bytes: &[u8], len: usize, separator: u8, separator_at: &[usize]) -> bool {
    bytes.len() == len
        && bytes.iter().enumerate().all(|(idx, byte)| {
            if separator_at.contains(&idx) {
                *byte == separator
            } else {
                byte.is_ascii_digit()
            }
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamField {
    CourseCode,
    CourseName,
    ExamDate,
    ExamTime,
    Location,
}

impl ExamField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamField::CourseCode => "course_code",
            ExamField::CourseName => "course_name",
            ExamField::ExamDate => "exam_date",
            ExamField::ExamTime => "exam_time",
            ExamField::Location => "location",
        }
    }
}

impl fmt::Display for ExamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One field-level rule violation. Validation collects every violation in
/// a single pass; callers branch on the collected set rather than catching
/// an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: ExamField,
    pub message: String,
}

impl FieldViolation {
    fn new(field: ExamField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Checks an already-typed exam value against the field rules. Returns an
/// empty vec iff the value is acceptable for persistence. The date check
/// rejects dates strictly before `today`.
pub fn validate_exam(exam: &Exam, today: NaiveDate) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    check_text(
        &mut violations,
        ExamField::CourseCode,
        &exam.course_code,
        MAX_COURSE_CODE_LEN,
        "Course code",
    );
    check_text(
        &mut violations,
        ExamField::CourseName,
        &exam.course_name,
        MAX_COURSE_NAME_LEN,
        "Course name",
    );
    if exam.exam_date < today {
        violations.push(FieldViolation::new(
            ExamField::ExamDate,
            "Exam date cannot be in the past",
        ));
    }
    check_text(
        &mut violations,
        ExamField::Location,
        &exam.location,
        MAX_LOCATION_LEN,
        "Location",
    );
    violations
}

/// Strict free-text time grammar: exactly `HH:MM`, zero-padded on both
/// sides. `9:00` is rejected here even though the CSV path accepts it.
pub fn parse_entry_time(input: &str) -> Option<NaiveTime> {
    let trimmed = input.trim();
    if !shaped(trimmed.as_bytes(), 5, b':', &[2]) {
        return None;
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M").ok()
}

/// Lenient time grammar for already-structured CSV fields: zero-padded
/// `HH:MM:SS`, falling back to zero-padded `HH:MM`. Intentionally
/// diverges from the strict entry grammar above only by tolerating the
/// seconds component; `9:30` stays rejected on both paths.
pub fn parse_csv_time(input: &str) -> Option<NaiveTime> {
    let trimmed = input.trim();
    if shaped(trimmed.as_bytes(), 8, b':', &[2, 5]) {
        return NaiveTime::parse_from_str(trimmed, "%H:%M:%S").ok();
    }
    parse_entry_time(trimmed)
}

/// The one date grammar shared by every path: zero-padded `YYYY-MM-DD`.
/// Shapes chrono would also parse, such as `2025-3-1`, are rejected.
pub fn parse_iso_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if !shaped(trimmed.as_bytes(), 10, b'-', &[4, 7]) {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Raw text fields as captured from free-text input, before any typing.
#[derive(Debug, Clone, Default)]
pub struct ExamForm {
    pub course_code: String,
    pub course_name: String,
    pub exam_date: String,
    pub exam_time: String,
    pub location: String,
}

impl ExamForm {
    /// The construct-then-validate entry path: every violation across all
    /// five fields is collected in one pass, and an `Exam` (id 0) is built
    /// only when the set comes back empty.
    pub fn build(&self, today: NaiveDate) -> Result<Exam, Vec<FieldViolation>> {
        let mut violations = Vec::new();
        check_text(
            &mut violations,
            ExamField::CourseCode,
            &self.course_code,
            MAX_COURSE_CODE_LEN,
            "Course code",
        );
        check_text(
            &mut violations,
            ExamField::CourseName,
            &self.course_name,
            MAX_COURSE_NAME_LEN,
            "Course name",
        );
        let date = self.typed_date(today, &mut violations);
        let time = self.typed_time(&mut violations);
        check_text(
            &mut violations,
            ExamField::Location,
            &self.location,
            MAX_LOCATION_LEN,
            "Location",
        );

        match (date, time) {
            (Some(exam_date), Some(exam_time)) if violations.is_empty() => Ok(Exam::new(
                self.course_code.trim(),
                self.course_name.trim(),
                exam_date,
                exam_time,
                self.location.trim(),
            )),
            _ => Err(violations),
        }
    }

    fn typed_date(
        &self,
        today: NaiveDate,
        violations: &mut Vec<FieldViolation>,
    ) -> Option<NaiveDate> {
        let trimmed = self.exam_date.trim();
        if trimmed.is_empty() {
            violations.push(FieldViolation::new(
                ExamField::ExamDate,
                "Exam date is required",
            ));
            return None;
        }
        match parse_iso_date(trimmed) {
            Some(date) => {
                if date < today {
                    violations.push(FieldViolation::new(
                        ExamField::ExamDate,
                        "Exam date cannot be in the past",
                    ));
                }
                Some(date)
            }
            None => {
                violations.push(FieldViolation::new(
                    ExamField::ExamDate,
                    "Exam date must use YYYY-MM-DD format",
                ));
                None
            }
        }
    }

    fn typed_time(&self, violations: &mut Vec<FieldViolation>) -> Option<NaiveTime> {
        let trimmed = self.exam_time.trim();
        if trimmed.is_empty() {
            violations.push(FieldViolation::new(
                ExamField::ExamTime,
                "Exam time is required",
            ));
            return None;
        }
        match parse_entry_time(trimmed) {
            Some(time) => Some(time),
            None => {
                violations.push(FieldViolation::new(
                    ExamField::ExamTime,
                    "Exam time must use HH:MM format",
                ));
                None
            }
        }
    }
}

fn check_text(
    violations: &mut Vec<FieldViolation>,
    field: ExamField,
    value: &str,
    max_len: usize,
    label: &str,
) {
    if value.trim().is_empty() {
        violations.push(FieldViolation::new(field, format!("{label} is required")));
    } else if value.trim().chars().count() > max_len {
        violations.push(FieldViolation::new(
            field,
            format!("{label} must be 1-{max_len} characters"),
        ));
    }
}
