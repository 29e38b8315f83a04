use super::{DATE_FORMAT, ExamStore, StoreResult, TIME_FORMAT};
use crate::exam::Exam;
use crate::validation::{parse_csv_time, parse_iso_date, validate_exam};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::warn;

pub const CSV_HEADER: &str = "id,course_code,course_name,exam_date,exam_time,location";

const FIELD_COUNT: usize = 6;

#[derive(Serialize)]
struct ExamCsvRecord {
    id: i64,
    course_code: String,
    course_name: String,
    exam_date: String,
    exam_time: String,
    location: String,
}

impl From<&Exam> for ExamCsvRecord {
    fn from(exam: &Exam) -> Self {
        Self {
            id: exam.id,
            course_code: exam.course_code.clone(),
            course_name: exam.course_name.clone(),
            exam_date: exam.exam_date.format(DATE_FORMAT).to_string(),
            exam_time: exam.exam_time.format(TIME_FORMAT).to_string(),
            location: exam.location.clone(),
        }
    }
}

/// Writes the fixed header line then one row per exam, date as
/// `YYYY-MM-DD` and time as `HH:MM:SS`. Quoting is disabled to match the
/// flat format: a field containing a comma corrupts its row. Known format
/// limitation, left as is.
pub fn write_exams<W: io::Write>(exams: &[Exam], writer: W) -> StoreResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);
    // Written explicitly so an empty export still carries the header.
    csv_writer.write_record(CSV_HEADER.split(','))?;
    for exam in exams {
        csv_writer.serialize(ExamCsvRecord::from(exam))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Exports every stored record, in store order, to the file at `path`.
pub fn export_exams<S: ExamStore + ?Sized, P: AsRef<Path>>(store: &S, path: P) -> StoreResult<()> {
    let exams = store.list()?;
    let file = File::create(path)?;
    write_exams(&exams, file)
}

/// Partial-failure batch import. The first line is discarded
/// unconditionally as the header. Each remaining line is split on commas;
/// rows with undecodable text, fewer than six fields, unparseable dates
/// or times, or field
/// validation failures (against `today`) are skipped with a diagnostic and
/// processing continues. Valid rows are inserted through `store.add`
/// without any conflict check. Returns the number of records inserted;
/// only a backend or stream failure aborts the import.
pub fn read_exams<S: ExamStore + ?Sized, R: io::Read>(
    store: &S,
    reader: R,
    today: NaiveDate,
) -> StoreResult<usize> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);
    let mut inserted = 0;
    for (index, result) in csv_reader.byte_records().enumerate() {
        let line = index + 2;
        let byte_record = result?;
        // Undecodable text is a per-line failure, not a stream failure.
        let record = match csv::StringRecord::from_byte_record(byte_record) {
            Ok(record) => record,
            Err(err) => {
                warn!(line, error = %err, "skipping undecodable CSV record");
                continue;
            }
        };
        if record.len() < FIELD_COUNT {
            warn!(line, fields = record.len(), "skipping short CSV record");
            continue;
        }
        let Some(exam) = decode_record(&record, line) else {
            continue;
        };
        let violations = validate_exam(&exam, today);
        if !violations.is_empty() {
            warn!(line, ?violations, "skipping invalid CSV record");
            continue;
        }
        store.add(&exam)?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Imports from the file at `path`; see [`read_exams`].
pub fn import_exams<S: ExamStore + ?Sized, P: AsRef<Path>>(
    store: &S,
    path: P,
    today: NaiveDate,
) -> StoreResult<usize> {
    let file = File::open(path)?;
    read_exams(store, file, today)
}

fn decode_record(record: &csv::StringRecord, line: usize) -> Option<Exam> {
    // The id column (position 0) is ignored; the store assigns a fresh id.
    let date_field = record[3].trim();
    let Some(exam_date) = parse_iso_date(date_field) else {
        warn!(line, value = date_field, "skipping CSV record with unparseable date");
        return None;
    };
    let time_field = record[4].trim();
    let Some(exam_time) = parse_csv_time(time_field) else {
        warn!(line, value = time_field, "skipping CSV record with unparseable time");
        return None;
    };
    Some(Exam::new(
        record[1].trim(),
        record[2].trim(),
        exam_date,
        exam_time,
        record[5].trim(),
    ))
}
