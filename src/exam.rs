use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A scheduled exam. Plain immutable value; an `id` of 0 marks a record
/// that has not been persisted yet. The store assigns the real id on
/// insert and it never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub course_code: String,
    pub course_name: String,
    pub exam_date: NaiveDate,
    pub exam_time: NaiveTime,
    pub location: String,
}

impl Exam {
    pub fn new(
        course_code: impl Into<String>,
        course_name: impl Into<String>,
        exam_date: NaiveDate,
        exam_time: NaiveTime,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            course_code: course_code.into(),
            course_name: course_name.into(),
            exam_date,
            exam_time,
            location: location.into(),
        }
    }

    /// Same value under a different id, as handed back by the store.
    pub fn with_id(&self, id: i64) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}
