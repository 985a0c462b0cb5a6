//! Recurrence calculator — pure date arithmetic for recurring tasks.
//!
//! Monthly advancement clamps to the last valid day of the target month
//! (`2025-01-31 + 1 month = 2025-02-28`), which is `chrono`'s `Months`
//! behavior.

use chrono::{DateTime, Duration, Months, Utc};

use crate::enums::Recurrence;

/// Compute the next due date for a recurrence pattern.
///
/// `Recurrence::None` returns the input unchanged; callers are expected to
/// skip the recurrence transition entirely for non-recurring tasks.
#[must_use]
pub fn next_due_date(recurrence: Recurrence, current_due: DateTime<Utc>) -> DateTime<Utc> {
    match recurrence {
        Recurrence::Daily => current_due + Duration::days(1),
        Recurrence::Weekly => current_due + Duration::days(7),
        Recurrence::Monthly => current_due + Months::new(1),
        Recurrence::None => current_due,
    }
}

/// Compute the next reminder time, preserving the due-date offset.
///
/// The reminder fires the same interval before the due date on every
/// occurrence: `next_due - (current_due - current_reminder)`. Offsets that
/// span multiple days are preserved exactly.
#[must_use]
pub fn next_reminder_time(
    current_due: DateTime<Utc>,
    current_reminder: DateTime<Utc>,
    next_due: DateTime<Utc>,
) -> DateTime<Utc> {
    let offset = current_due - current_reminder;
    next_due - offset
}
