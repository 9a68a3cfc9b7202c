//! Date filter codec for list endpoints
//!
//! A date filter parameter accepts three encodings:
//!
//! - a single epoch-millisecond string, expanded to the full day
//!   `[start-of-day, end-of-day]` in local server time,
//! - a comma-joined pair of epoch-millisecond strings (explicit range),
//! - a two-element array of epoch-millisecond strings.
//!
//! Malformed input degrades silently to "no constraint": the filter is
//! dropped rather than rejected. Tests below pin this behavior.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use serde::Deserialize;
use utoipa::ToSchema;

/// A date or date-range filter value as it arrives on the wire
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum DateFilter {
    /// Single epoch string, or a comma-joined epoch pair
    Raw(String),
    /// Explicit two-element range
    Pair(Vec<String>),
}

impl DateFilter {
    /// Resolve the filter to an inclusive `[start, end]` range in local
    /// server time. Returns `None` for malformed input.
    pub fn bounds(&self) -> Option<(DateTime<Local>, DateTime<Local>)> {
        match self {
            Self::Raw(raw) => {
                if let Some((a, b)) = raw.split_once(',') {
                    range_bounds(a, b)
                } else {
                    day_bounds(raw)
                }
            }
            Self::Pair(parts) => {
                if parts.len() != 2 {
                    return None;
                }
                range_bounds(parts.first()?, parts.get(1)?)
            }
        }
    }

    /// The range as calendar dates, for filtering `DATE` columns
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let (start, end) = self.bounds()?;
        Some((start.date_naive(), end.date_naive()))
    }
}

fn parse_epoch_millis(raw: &str) -> Option<DateTime<Local>> {
    let millis: i64 = raw.trim().parse().ok()?;
    Local.timestamp_millis_opt(millis).single()
}

/// Expand one timestamp to the whole local day it falls in
fn day_bounds(raw: &str) -> Option<(DateTime<Local>, DateTime<Local>)> {
    let instant = parse_epoch_millis(raw)?;
    let date = instant.date_naive();
    let start_naive = date.and_hms_opt(0, 0, 0)?;
    let end_naive = start_naive + Duration::days(1) - Duration::milliseconds(1);
    let start = Local.from_local_datetime(&start_naive).single()?;
    let end = Local.from_local_datetime(&end_naive).single()?;
    Some((start, end))
}

fn range_bounds(a: &str, b: &str) -> Option<(DateTime<Local>, DateTime<Local>)> {
    Some((parse_epoch_millis(a)?, parse_epoch_millis(b)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_epoch_expands_to_day() {
        // Noon UTC on 2024-03-15; whatever the local zone, the bounds must
        // span exactly one day minus one millisecond.
        let filter = DateFilter::Raw("1710504000000".to_string());
        let (start, end) = filter.bounds().expect("bounds");
        assert_eq!(
            end.signed_duration_since(start),
            Duration::days(1) - Duration::milliseconds(1)
        );
        let (start_date, end_date) = filter.date_bounds().expect("date bounds");
        assert_eq!(start_date, end_date);
    }

    #[test]
    fn test_comma_pair_is_explicit_range() {
        let filter = DateFilter::Raw("1700000000000,1700090000000".to_string());
        let (start, end) = filter.bounds().expect("bounds");
        assert_eq!(start.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(end.timestamp_millis(), 1_700_090_000_000);
    }

    #[test]
    fn test_array_pair_is_explicit_range() {
        let filter = DateFilter::Pair(vec![
            "1700000000000".to_string(),
            "1700090000000".to_string(),
        ]);
        let (start, end) = filter.bounds().expect("bounds");
        assert_eq!(start.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(end.timestamp_millis(), 1_700_090_000_000);
    }

    #[test]
    fn test_malformed_input_degrades_to_no_constraint() {
        assert!(DateFilter::Raw("not-a-number".to_string()).bounds().is_none());
        assert!(DateFilter::Raw("123,abc".to_string()).bounds().is_none());
        assert!(DateFilter::Raw("".to_string()).bounds().is_none());
        assert!(DateFilter::Pair(vec!["1700000000000".to_string()]).bounds().is_none());
        assert!(DateFilter::Pair(vec![]).bounds().is_none());
    }

    #[test]
    fn test_untagged_deserialization() {
        let single: DateFilter = serde_json::from_value(serde_json::json!("1710504000000")).unwrap();
        assert!(matches!(single, DateFilter::Raw(_)));

        let pair: DateFilter =
            serde_json::from_value(serde_json::json!(["1700000000000", "1700090000000"])).unwrap();
        assert!(matches!(pair, DateFilter::Pair(_)));
    }

    #[test]
    fn test_whitespace_tolerated_around_epochs() {
        let filter = DateFilter::Raw(" 1700000000000 , 1700090000000 ".to_string());
        assert!(filter.bounds().is_some());
    }
}
