// ⏰ Date handling - week defaults and request-level range resolution

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::LedgerError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Inclusive on both ends
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| LedgerError::DateFormat(s.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Monday through Friday of the week containing `today`
pub fn current_week_range(today: NaiveDate) -> DateRange {
    let start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let end = start + Duration::days(4);
    DateRange::new(start, end)
}

/// Outcome of turning the `start_date`/`end_date` parameters into a range.
///
/// `range == None` means "aggregate over everything".
#[derive(Debug)]
pub struct RangeResolution {
    pub range: Option<DateRange>,
    pub error: Option<LedgerError>,
}

/// Both bounds given: use them, or fall back to all data with an error when
/// they do not parse or are reversed. Anything else: the current work week.
pub fn resolve_range(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> RangeResolution {
    let start = start.map(str::trim).filter(|s| !s.is_empty());
    let end = end.map(str::trim).filter(|s| !s.is_empty());

    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return RangeResolution {
                range: Some(current_week_range(today)),
                error: None,
            }
        }
    };

    let parsed = parse_date(start).and_then(|s| parse_date(end).map(|e| (s, e)));

    match parsed {
        Ok((s, e)) if s > e => RangeResolution {
            range: None,
            error: Some(LedgerError::DateRange),
        },
        Ok((s, e)) => RangeResolution {
            range: Some(DateRange::new(s, e)),
            error: None,
        },
        Err(err) => RangeResolution {
            range: None,
            error: Some(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_week_range_midweek() {
        // 2025-04-01 is a Tuesday
        let range = current_week_range(date("2025-04-01"));
        assert_eq!(range.start, date("2025-03-31"));
        assert_eq!(range.end, date("2025-04-04"));
    }

    #[test]
    fn test_week_range_on_monday_and_sunday() {
        let monday = current_week_range(date("2025-03-31"));
        assert_eq!(monday.start, date("2025-03-31"));

        let sunday = current_week_range(date("2025-04-06"));
        assert_eq!(sunday.start, date("2025-03-31"));
        assert_eq!(sunday.end, date("2025-04-04"));
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = DateRange::new(date("2025-03-31"), date("2025-04-04"));
        assert!(range.contains(date("2025-03-31")));
        assert!(range.contains(date("2025-04-04")));
        assert!(!range.contains(date("2025-03-30")));
        assert!(!range.contains(date("2025-04-05")));
    }

    #[test]
    fn test_resolve_uses_supplied_range() {
        let res = resolve_range(Some("2025-01-01"), Some("2025-01-31"), date("2025-04-01"));
        assert!(res.error.is_none());
        assert_eq!(res.range, Some(DateRange::new(date("2025-01-01"), date("2025-01-31"))));
    }

    #[test]
    fn test_resolve_reversed_range_falls_back_to_all_data() {
        let res = resolve_range(Some("2025-02-01"), Some("2025-01-01"), date("2025-04-01"));
        assert!(matches!(res.error, Some(LedgerError::DateRange)));
        assert_eq!(res.range, None);
    }

    #[test]
    fn test_resolve_bad_format_falls_back_to_all_data() {
        let res = resolve_range(Some("2025/01/01"), Some("2025-01-31"), date("2025-04-01"));
        assert!(matches!(res.error, Some(LedgerError::DateFormat(_))));
        assert_eq!(res.range, None);
    }

    #[test]
    fn test_resolve_defaults_to_current_week() {
        let today = date("2025-04-02");
        let week = Some(current_week_range(today));

        assert_eq!(resolve_range(None, None, today).range, week);
        assert_eq!(resolve_range(Some("2025-01-01"), None, today).range, week);
        assert_eq!(resolve_range(Some(""), Some(""), today).range, week);
    }
}
