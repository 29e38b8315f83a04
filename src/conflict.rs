use crate::exam::Exam;
use crate::persistence::{ExamStore, StoreResult};

/// Outcome of the advisory slot check. A collision never blocks the
/// caller; committing the record is a separate, caller-gated step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictCheck {
    Clear,
    Collision(Exam),
}

impl ConflictCheck {
    pub fn is_collision(&self) -> bool {
        matches!(self, ConflictCheck::Collision(_))
    }
}

/// Reports a collision iff the store holds a record with the candidate's
/// (date, time, location) under a different id; a candidate with id 0 is
/// compared against every stored record.
///
/// Advisory only. It is not invoked on the update path, and it is not
/// atomic with a following insert: two callers can both observe `Clear`
/// and both commit, leaving a real collision in the data.
pub fn check_slot<S: ExamStore + ?Sized>(
    store: &S,
    candidate: &Exam,
) -> StoreResult<ConflictCheck> {
    Ok(match store.conflicting_with(candidate)? {
        Some(existing) => ConflictCheck::Collision(existing),
        None => ConflictCheck::Clear,
    })
}
