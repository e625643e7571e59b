use chrono::{Datelike, Months, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::error::TimelineError;

/// Controls which ruler markers the timeline displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Months,
    Weeks,
    Days,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Months, ViewMode::Weeks, ViewMode::Days];

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Months => "Months",
            ViewMode::Weeks => "Weeks",
            ViewMode::Days => "Days",
        }
    }
}

/// The calendar range currently mapped onto the rendering surface.
///
/// Time maps linearly onto `[0, 100]` percent between `start` and `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl VisibleWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TimelineError> {
        if start >= end {
            return Err(TimelineError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// A window starting at `start` and spanning `months` calendar months.
    pub fn months_from(start: NaiveDate, months: u32) -> Result<Self, TimelineError> {
        let end = start
            .checked_add_months(Months::new(months))
            .unwrap_or(start);
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn span_millis(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }

    /// Position of `date` along the window, unclamped.
    pub fn percent(&self, date: NaiveDate) -> f64 {
        let offset = (date - self.start).num_milliseconds() as f64;
        offset / self.span_millis() as f64 * 100.0
    }

    /// Position of `date` clamped to the visible range.
    pub fn percent_clamped(&self, date: NaiveDate) -> f64 {
        self.percent(date).clamp(0.0, 100.0)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Shift the window by a number of days, keeping its length.
    pub fn scroll_days(&mut self, days: i64) {
        self.start += chrono::Duration::days(days);
        self.end += chrono::Duration::days(days);
    }
}

/// Convert a pixel offset inside the timeline area back into a calendar date.
///
/// The offset is not clamped: a pointer above or below the container maps to a
/// date outside the window.
pub fn pixel_to_date(
    pixel_offset: f64,
    container_height: f64,
    window: &VisibleWindow,
) -> Result<NaiveDate, TimelineError> {
    if !container_height.is_finite() || container_height <= 0.0 {
        return Err(TimelineError::InvalidGeometry {
            height: container_height,
        });
    }
    if !pixel_offset.is_finite() {
        return Err(TimelineError::InvalidOffset {
            offset: pixel_offset,
        });
    }

    let fraction = pixel_offset / container_height;
    let offset_ms = (fraction * window.span_millis() as f64).round();
    if offset_ms.abs() >= i64::MAX as f64 {
        return Err(TimelineError::InvalidOffset {
            offset: pixel_offset,
        });
    }
    window
        .start
        .and_time(NaiveTime::MIN)
        .checked_add_signed(chrono::Duration::milliseconds(offset_ms as i64))
        .map(|instant| instant.date())
        .ok_or(TimelineError::InvalidOffset {
            offset: pixel_offset,
        })
}

/// Pixel offset of `date` in a container of the given height.
pub fn date_to_pixel(date: NaiveDate, container_height: f64, window: &VisibleWindow) -> f64 {
    window.percent(date) / 100.0 * container_height
}

/// A labelled tick on the ruler.
#[derive(Debug, Clone, PartialEq)]
pub struct RulerMarker {
    pub date: NaiveDate,
    pub label: String,
    pub percent: f64,
}

/// Markers for the ruler, from the first boundary at or before the window start
/// up to the window end.
pub fn ruler_markers(window: &VisibleWindow, mode: ViewMode) -> Vec<RulerMarker> {
    let mut markers = Vec::new();
    let marker = |date: NaiveDate, label: String| RulerMarker {
        date,
        label,
        percent: window.percent(date),
    };

    match mode {
        ViewMode::Months => {
            let mut date = window.start.with_day(1).unwrap_or(window.start);
            while date <= window.end {
                markers.push(marker(date, date.format("%b %Y").to_string()));
                date = match date.checked_add_months(Months::new(1)) {
                    Some(next) => next,
                    None => break,
                };
            }
        }
        ViewMode::Weeks => {
            let back = window.start.weekday().num_days_from_sunday() as i64;
            let mut date = window.start - chrono::Duration::days(back);
            while date <= window.end {
                markers.push(marker(date, format!("Week {}", date.iso_week().week())));
                date += chrono::Duration::days(7);
            }
        }
        ViewMode::Days => {
            let mut date = window.start;
            while date <= window.end {
                markers.push(marker(date, date.format("%b %-d").to_string()));
                date += chrono::Duration::days(1);
            }
        }
    }

    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn quarter() -> VisibleWindow {
        VisibleWindow::new(date(2025, 1, 1), date(2025, 4, 1)).unwrap()
    }

    #[test]
    fn window_edges_map_to_exact_percent() {
        let window = quarter();
        assert_eq!(window.percent(window.start()), 0.0);
        assert_eq!(window.percent(window.end()), 100.0);
    }

    #[test]
    fn percent_is_unclamped_outside_window() {
        let window = quarter();
        assert!(window.percent(date(2024, 12, 1)) < 0.0);
        assert!(window.percent(date(2025, 6, 1)) > 100.0);
        assert_eq!(window.percent_clamped(date(2025, 6, 1)), 100.0);
    }

    #[test]
    fn rejects_empty_window() {
        let d = date(2025, 1, 1);
        assert_eq!(
            VisibleWindow::new(d, d),
            Err(TimelineError::InvalidWindow { start: d, end: d })
        );
    }

    #[test]
    fn months_from_spans_calendar_months() {
        let window = VisibleWindow::months_from(date(2025, 1, 31), 3).unwrap();
        assert_eq!(window.end(), date(2025, 4, 30));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-10.0)]
    #[case(f64::NAN)]
    fn non_positive_height_is_invalid_geometry(#[case] height: f64) {
        let result = pixel_to_date(10.0, height, &quarter());
        assert!(matches!(result, Err(TimelineError::InvalidGeometry { .. })));
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    #[case(1e300)]
    #[case(-1e300)]
    #[case(1e12)]
    fn unmappable_offset_is_reported_as_offset(#[case] offset: f64) {
        let err = pixel_to_date(offset, 900.0, &quarter()).unwrap_err();
        assert!(matches!(err, TimelineError::InvalidOffset { .. }));
        assert!(err.to_string().starts_with("invalid pointer offset"));
        assert!(!err.to_string().contains("900"));
    }

    #[test]
    fn pixel_edges_map_to_window_edges() {
        let window = quarter();
        assert_eq!(pixel_to_date(0.0, 900.0, &window).unwrap(), window.start());
        assert_eq!(pixel_to_date(900.0, 900.0, &window).unwrap(), window.end());
    }

    #[test]
    fn offsets_outside_container_are_not_clamped() {
        let window = quarter();
        assert!(pixel_to_date(-50.0, 900.0, &window).unwrap() < window.start());
        assert!(pixel_to_date(950.0, 900.0, &window).unwrap() > window.end());
    }

    #[rstest]
    #[case(date(2025, 1, 1))]
    #[case(date(2025, 1, 17))]
    #[case(date(2025, 2, 28))]
    #[case(date(2025, 3, 31))]
    #[case(date(2025, 5, 10))]
    fn pixel_round_trip_recovers_date(#[case] d: NaiveDate) {
        let window = quarter();
        for height in [600.0, 733.0, 1280.5] {
            let px = date_to_pixel(d, height, &window);
            let back = pixel_to_date(px, height, &window).unwrap();
            assert!((back - d).num_days().abs() <= 1, "{d} -> {back} at {height}");
        }
    }

    #[test]
    fn month_markers_start_at_first_of_month() {
        let window = VisibleWindow::new(date(2025, 1, 15), date(2025, 4, 15)).unwrap();
        let markers = ruler_markers(&window, ViewMode::Months);
        let dates: Vec<_> = markers.iter().map(|m| m.date).collect();
        assert_eq!(
            dates,
            vec![date(2025, 1, 1), date(2025, 2, 1), date(2025, 3, 1), date(2025, 4, 1)]
        );
        assert_eq!(markers[1].label, "Feb 2025");
        assert!(markers[0].percent < 0.0);
    }

    #[test]
    fn week_markers_start_on_sunday_with_iso_numbers() {
        // 2025-01-01 is a Wednesday.
        let window = VisibleWindow::new(date(2025, 1, 1), date(2025, 1, 20)).unwrap();
        let markers = ruler_markers(&window, ViewMode::Weeks);
        assert_eq!(markers[0].date, date(2024, 12, 29));
        assert_eq!(markers[0].label, "Week 52");
        assert_eq!(markers.len(), 4);
    }

    #[test]
    fn day_markers_cover_every_day_inclusive() {
        let window = VisibleWindow::new(date(2025, 1, 1), date(2025, 1, 10)).unwrap();
        let markers = ruler_markers(&window, ViewMode::Days);
        assert_eq!(markers.len(), 10);
        assert_eq!(markers[2].label, "Jan 3");
    }
}
