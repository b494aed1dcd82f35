//! Free/busy arithmetic for doctor availability.

use hms_types::TimeRange;
use uuid::Uuid;

/// A block of free time for one doctor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub doctor_id: Uuid,
    pub range: TimeRange,
}

/// Returns the parts of `window` not covered by any of `busy`, in chronological order.
///
/// Busy ranges may overlap each other and may extend past the window. Gaps of zero length are
/// not reported.
pub fn free_ranges(window: TimeRange, busy: &[TimeRange]) -> Vec<TimeRange> {
    let mut blocking: Vec<TimeRange> = busy
        .iter()
        .filter(|b| b.overlaps(&window))
        .copied()
        .collect();
    blocking.sort_by_key(|b| b.start());

    let mut free = Vec::new();
    let mut cursor = window.start();
    for block in blocking {
        if block.start() > cursor {
            if let Ok(gap) = TimeRange::new(cursor, block.start()) {
                free.push(gap);
            }
        }
        if block.end() > cursor {
            cursor = block.end();
        }
        if cursor >= window.end() {
            break;
        }
    }
    if cursor < window.end() {
        if let Ok(tail) = TimeRange::new(cursor, window.end()) {
            free.push(tail);
        }
    }
    free
}

/// True when `requested` fits entirely inside one of `slots`.
pub fn fits_in_any(slots: &[TimeSlot], requested: &TimeRange) -> bool {
    slots.iter().any(|slot| slot.range.contains(requested))
}
