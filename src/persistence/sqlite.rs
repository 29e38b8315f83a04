use super::{DATE_FORMAT, ExamStore, PersistenceError, StoreEvent, StoreResult, TIME_FORMAT};
use crate::exam::Exam;
use chrono::{Duration, NaiveDate, NaiveTime};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::debug;

const SELECT_COLUMNS: &str =
    "SELECT id, course_code, course_name, exam_date, exam_time, location FROM exams";

/// SQLite-backed exam store. Dates are stored as `YYYY-MM-DD` text and
/// times as `HH:MM:SS` text so lexicographic SQL ordering matches
/// chronological ordering.
pub struct SqliteExamStore {
    connection: Mutex<Connection>,
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
}

impl SqliteExamStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> StoreResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    fn initialize_schema(connection: &Connection) -> StoreResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS exams (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_code TEXT NOT NULL,
                course_name TEXT NOT NULL,
                exam_date TEXT NOT NULL,
                exam_time TEXT NOT NULL,
                location TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    /// Registers a subscriber that receives a `StoreEvent` for every
    /// successful mutation. Disconnected subscribers are pruned on the
    /// next publish.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .expect("subscriber mutex poisoned")
            .push(tx);
        rx
    }

    fn publish(&self, event: StoreEvent) {
        let mut subscribers = self.subscribers.lock().expect("subscriber mutex poisoned");
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

type RawRow = (i64, String, String, String, String, String);

fn raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_row(raw: RawRow) -> StoreResult<Exam> {
    let (id, course_code, course_name, date, time, location) = raw;
    let exam_date = NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|err| {
        PersistenceError::InvalidData(format!("exam {id} has invalid date '{date}': {err}"))
    })?;
    let exam_time = NaiveTime::parse_from_str(&time, TIME_FORMAT).map_err(|err| {
        PersistenceError::InvalidData(format!("exam {id} has invalid time '{time}': {err}"))
    })?;
    Ok(Exam {
        id,
        course_code,
        course_name,
        exam_date,
        exam_time,
        location,
    })
}

fn query_exams<P: rusqlite::Params>(
    connection: &Connection,
    sql: &str,
    parameters: P,
) -> StoreResult<Vec<Exam>> {
    let mut stmt = connection.prepare(sql)?;
    let rows = stmt.query_map(parameters, raw_row)?;
    let mut exams = Vec::new();
    for row in rows {
        exams.push(decode_row(row?)?);
    }
    Ok(exams)
}

impl ExamStore for SqliteExamStore {
    fn add(&self, exam: &Exam) -> StoreResult<i64> {
        let id = {
            let connection = self.connection.lock().expect("sqlite mutex poisoned");
            connection.execute(
                "INSERT INTO exams (course_code, course_name, exam_date, exam_time, location) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    exam.course_code,
                    exam.course_name,
                    exam.exam_date.format(DATE_FORMAT).to_string(),
                    exam.exam_time.format(TIME_FORMAT).to_string(),
                    exam.location,
                ],
            )?;
            connection.last_insert_rowid()
        };
        debug!(id, course = %exam.course_code, "exam added");
        self.publish(StoreEvent::Added(exam.with_id(id)));
        Ok(id)
    }

    fn list(&self) -> StoreResult<Vec<Exam>> {
        let connection = self.connection.lock().expect("sqlite mutex poisoned");
        query_exams(
            &connection,
            &format!("{SELECT_COLUMNS} ORDER BY exam_date, exam_time"),
            [],
        )
    }

    fn update(&self, exam: &Exam) -> StoreResult<()> {
        let changed = {
            let connection = self.connection.lock().expect("sqlite mutex poisoned");
            connection.execute(
                "UPDATE exams SET course_code = ?1, course_name = ?2, exam_date = ?3, \
                 exam_time = ?4, location = ?5 WHERE id = ?6",
                params![
                    exam.course_code,
                    exam.course_name,
                    exam.exam_date.format(DATE_FORMAT).to_string(),
                    exam.exam_time.format(TIME_FORMAT).to_string(),
                    exam.location,
                    exam.id,
                ],
            )?
        };
        if changed == 0 {
            return Err(PersistenceError::NotFound { id: exam.id });
        }
        debug!(id = exam.id, "exam updated");
        self.publish(StoreEvent::Updated(exam.clone()));
        Ok(())
    }

    fn delete(&self, id: i64) -> StoreResult<()> {
        let removed = {
            let connection = self.connection.lock().expect("sqlite mutex poisoned");
            connection.execute("DELETE FROM exams WHERE id = ?1", params![id])?
        };
        // Deleting an unknown id is a deliberate no-op.
        if removed > 0 {
            debug!(id, "exam deleted");
            self.publish(StoreEvent::Deleted(id));
        }
        Ok(())
    }

    fn upcoming(&self, reference: NaiveDate, days: i64) -> StoreResult<Vec<Exam>> {
        let end = reference + Duration::days(days);
        let connection = self.connection.lock().expect("sqlite mutex poisoned");
        query_exams(
            &connection,
            &format!(
                "{SELECT_COLUMNS} WHERE exam_date BETWEEN ?1 AND ?2 \
                 ORDER BY exam_date, exam_time"
            ),
            params![
                reference.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string(),
            ],
        )
    }

    fn conflicting_with(&self, candidate: &Exam) -> StoreResult<Option<Exam>> {
        let connection = self.connection.lock().expect("sqlite mutex poisoned");
        let mut stmt = connection.prepare(&format!(
            "{SELECT_COLUMNS} WHERE exam_date = ?1 AND exam_time = ?2 AND location = ?3 \
             AND id != ?4 LIMIT 1"
        ))?;
        let raw = stmt
            .query_row(
                params![
                    candidate.exam_date.format(DATE_FORMAT).to_string(),
                    candidate.exam_time.format(TIME_FORMAT).to_string(),
                    candidate.location,
                    candidate.id,
                ],
                raw_row,
            )
            .optional()?;
        raw.map(decode_row).transpose()
    }
}
