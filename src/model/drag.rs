use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::TimelineError;
use super::timeline::{pixel_to_date, VisibleWindow};

/// Dates and pointer offset captured when a reposition drag begins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSnapshot {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Distance from the card's top edge to the pointer, in pixels.
    pub grab_offset: f32,
}

impl DragSnapshot {
    /// Dates the task would take if its top edge sat at `top_px`.
    pub fn dates_at(
        &self,
        top_px: f64,
        container_height: f64,
        window: &VisibleWindow,
    ) -> Result<(NaiveDate, NaiveDate), TimelineError> {
        let new_start = pixel_to_date(top_px, container_height, window)?;
        Ok(reschedule(self.start, self.end, new_start))
    }
}

/// Move a task to `new_start` keeping its duration exactly.
pub fn reschedule(
    old_start: NaiveDate,
    old_end: NaiveDate,
    new_start: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let duration = old_end - old_start;
    (new_start, new_start + duration)
}
