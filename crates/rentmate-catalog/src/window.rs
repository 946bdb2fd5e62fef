use chrono::NaiveDate;

use crate::error::CatalogError;

/// A validated rental date range.
///
/// Built from the ISO date strings the model supplies. Inverted ranges are
/// rejected at construction, so every `RentalWindow` that exists is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentalWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RentalWindow {
    pub fn parse(start: &str, end: &str) -> Result<Self, CatalogError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if end < start {
            return Err(CatalogError::Window(format!(
                "end date {end} is before start date {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Chargeable days. A same-day pickup and return counts as one day.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days().max(1)
    }

    pub fn start_iso(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_iso(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

/// Accepts `YYYY-MM-DD`, or a full timestamp whose date prefix parses
/// (models occasionally send `2026-01-10T00:00:00Z`).
fn parse_date(raw: &str) -> Result<NaiveDate, CatalogError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Some(prefix) = raw.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Ok(date);
        }
    }
    Err(CatalogError::Window(format!("unparseable date: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_day_window() {
        let window = RentalWindow::parse("2026-01-10", "2026-01-13").unwrap();
        assert_eq!(window.duration_days(), 3);
        assert_eq!(window.start_iso(), "2026-01-10");
        assert_eq!(window.end_iso(), "2026-01-13");
    }

    #[test]
    fn same_day_counts_as_one_day() {
        let window = RentalWindow::parse("2026-01-10", "2026-01-10").unwrap();
        assert_eq!(window.duration_days(), 1);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = RentalWindow::parse("2026-01-13", "2026-01-10").unwrap_err();
        assert!(matches!(err, CatalogError::Window(_)));
        assert!(err.to_string().contains("before start date"));
    }

    #[test]
    fn timestamp_prefix_is_accepted() {
        let window = RentalWindow::parse("2026-01-10T00:00:00Z", "2026-01-12T18:30:00Z").unwrap();
        assert_eq!(window.duration_days(), 2);
    }

    #[test]
    fn garbage_dates_are_rejected() {
        assert!(RentalWindow::parse("next tuesday", "2026-01-10").is_err());
        assert!(RentalWindow::parse("2026-01-10", "").is_err());
    }
}
