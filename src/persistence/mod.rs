use crate::exam::Exam;
use chrono::NaiveDate;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Io(io::Error),
    Csv(csv::Error),
    InvalidData(String),
    NotFound { id: i64 },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            PersistenceError::NotFound { id } => write!(f, "no exam stored with id {id}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type StoreResult<T> = Result<T, PersistenceError>;

pub const DEFAULT_UPCOMING_DAYS: i64 = 7;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S";

/// Published after every successful mutation. Callers needing live refresh
/// subscribe to these instead of observing individual record fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added(Exam),
    Updated(Exam),
    Deleted(i64),
}

/// Durable CRUD and ordered retrieval of exam records. Implementations
/// acquire their backend resource per call and release it on every exit
/// path; nothing is held across calls.
pub trait ExamStore {
    /// Persists a new record, ignoring any caller-supplied id, and returns
    /// the freshly assigned id.
    fn add(&self, exam: &Exam) -> StoreResult<i64>;

    /// All records ordered ascending by (exam_date, exam_time). The
    /// tie-break among equal keys is backend-defined.
    fn list(&self) -> StoreResult<Vec<Exam>>;

    /// Full replace of the record with `exam.id`. The caller re-validates
    /// before calling.
    fn update(&self, exam: &Exam) -> StoreResult<()>;

    /// Removes the record with that id. A nonexistent id is a silent
    /// no-op, not an error.
    fn delete(&self, id: i64) -> StoreResult<()>;

    /// Records with `exam_date` in `[reference, reference + days]`
    /// inclusive, ordered as in `list`.
    fn upcoming(&self, reference: NaiveDate, days: i64) -> StoreResult<Vec<Exam>>;

    /// First stored record occupying the candidate's (date, time,
    /// location) slot under a different id, if any.
    fn conflicting_with(&self, candidate: &Exam) -> StoreResult<Option<Exam>>;
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;
