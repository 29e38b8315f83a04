pub mod conflict;
pub mod exam;
pub mod persistence;
pub mod validation;

pub use conflict::{ConflictCheck, check_slot};
pub use exam::Exam;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteExamStore;
pub use persistence::file::{CSV_HEADER, export_exams, import_exams, read_exams, write_exams};
pub use persistence::{
    DEFAULT_UPCOMING_DAYS, ExamStore, PersistenceError, StoreEvent, StoreResult,
};
pub use validation::{
    ExamField, ExamForm, FieldViolation, parse_csv_time, parse_entry_time, parse_iso_date,
    validate_exam,
};
