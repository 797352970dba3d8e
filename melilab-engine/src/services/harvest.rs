//! Harvest-date estimation
//!
//! Drum extraction dates arrive as free-form strings in several upstream
//! forms. An ordered chain of parser strategies normalizes each string to a
//! UTC instant; the suggested harvest date is the mean of the dates that
//! parse. The suggestion is advisory only, the analyst may override it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use melilab_common::models::{PollenRecord, Pool};
use tracing::debug;

/// A date-parsing strategy; `None` means the strategy does not match
type DateParser = fn(&str) -> Option<i64>;

/// Ordered parser chain, first successful match wins
const PARSERS: &[DateParser] = &[parse_iso, parse_day_first, parse_year_first];

fn date_to_ms(date: NaiveDate) -> Option<i64> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight).timestamp_millis())
}

/// Strategy 1: generic machine-parseable forms (RFC 3339, ISO date-time,
/// plain ISO date)
fn parse_iso(value: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt).timestamp_millis());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(date_to_ms)
}

/// Strategy 2: `DD/MM/YYYY` (day first; 1-2 digit day and month accepted)
fn parse_day_first(value: &str) -> Option<i64> {
    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .ok()
        .and_then(date_to_ms)
}

/// Strategy 3: `YYYY sep MM sep DD` with separator `-`, `/` or `.`
fn parse_year_first(value: &str) -> Option<i64> {
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date_to_ms(date);
        }
    }
    None
}

/// Parse one date string through the strategy chain.
///
/// Returns the UTC epoch milliseconds of the first strategy that matches,
/// `None` when no strategy does. Calendar-invalid matches (e.g. day 31 of
/// February) fail the strategy rather than rolling over.
pub fn parse_date_ms(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for parser in PARSERS {
        if let Some(ms) = parser(trimmed) {
            return Some(ms);
        }
    }

    debug!(value = %value, "Date string matched no parser strategy, excluded");
    None
}

fn mean_date(parsed_ms: &[i64]) -> Option<NaiveDate> {
    if parsed_ms.is_empty() {
        return None;
    }

    let sum: i64 = parsed_ms.iter().sum();
    let mean = (sum as f64 / parsed_ms.len() as f64).round() as i64;

    DateTime::<Utc>::from_timestamp_millis(mean).map(|dt| dt.date_naive())
}

/// Estimate a harvest date as the mean of the given date strings.
///
/// Unparseable strings are discarded; zero parsed dates yields `None`
/// (no suggestion), never an error.
pub fn estimate<I, S>(dates: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parsed: Vec<i64> = dates
        .into_iter()
        .filter_map(|value| parse_date_ms(value.as_ref()))
        .collect();

    mean_date(&parsed)
}

/// Suggest a harvest date for a pool.
///
/// The pool's drum extraction dates are preferred; when none of them parse,
/// extraction dates attached to the pool's records are used instead.
pub fn suggest_for_pool(pool: &Pool, records: &[PollenRecord]) -> Option<NaiveDate> {
    let mut parsed: Vec<i64> = pool
        .drums
        .iter()
        .filter_map(|drum| drum.extraction_date.as_deref())
        .filter_map(parse_date_ms)
        .collect();

    if parsed.is_empty() {
        parsed = records
            .iter()
            .filter_map(|record| record.drum.as_ref())
            .filter_map(|drum| drum.extraction_date.as_deref())
            .filter_map(parse_date_ms)
            .collect();
    }

    mean_date(&parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use melilab_common::models::Drum;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn drum(extraction_date: Option<&str>) -> Drum {
        Drum {
            id: 0,
            code: None,
            extraction_date: extraction_date.map(String::from),
            observations: None,
        }
    }

    #[test]
    fn test_iso_date() {
        let ms = parse_date_ms("2024-05-03").unwrap();
        assert_eq!(mean_date(&[ms]), Some(date(2024, 5, 3)));
    }

    #[test]
    fn test_day_first_not_month_first() {
        let ms = parse_date_ms("03/05/2024").unwrap();
        assert_eq!(mean_date(&[ms]), Some(date(2024, 5, 3)));
    }

    #[test]
    fn test_year_first_with_dots() {
        let ms = parse_date_ms("2024.5.3").unwrap();
        assert_eq!(mean_date(&[ms]), Some(date(2024, 5, 3)));
    }

    #[test]
    fn test_year_first_with_slashes() {
        let ms = parse_date_ms("2024/05/03").unwrap();
        assert_eq!(mean_date(&[ms]), Some(date(2024, 5, 3)));
    }

    #[test]
    fn test_rfc3339_datetime() {
        let ms = parse_date_ms("2024-05-03T12:00:00Z").unwrap();
        assert_eq!(mean_date(&[ms]), Some(date(2024, 5, 3)));
    }

    #[test]
    fn test_garbage_excluded() {
        assert!(parse_date_ms("not-a-date").is_none());
        assert!(parse_date_ms("").is_none());
        assert!(parse_date_ms("   ").is_none());
    }

    #[test]
    fn test_invalid_calendar_date_excluded() {
        assert!(parse_date_ms("31/02/2024").is_none());
        assert!(parse_date_ms("2024-13-01").is_none());
    }

    #[test]
    fn test_mean_of_two_dates() {
        let suggestion = estimate(["2024-05-01", "2024-05-03"]);
        assert_eq!(suggestion, Some(date(2024, 5, 2)));
    }

    #[test]
    fn test_unparseable_excluded_from_mean() {
        let suggestion = estimate(["2024-05-01", "not-a-date", "2024-05-03"]);
        assert_eq!(suggestion, Some(date(2024, 5, 2)));
    }

    #[test]
    fn test_no_parseable_dates_is_no_suggestion() {
        assert_eq!(estimate(["not-a-date", "also bad"]), None);
        assert_eq!(estimate(Vec::<String>::new()), None);
    }

    #[test]
    fn test_suggest_prefers_drum_dates() {
        let pool = Pool {
            id: 1,
            registration_number: None,
            analysis_date: None,
            analyst: None,
            drums: vec![drum(Some("2024-05-01")), drum(Some("2024-05-03"))],
            observations: None,
            created_at: None,
        };

        assert_eq!(suggest_for_pool(&pool, &[]), Some(date(2024, 5, 2)));
    }

    #[test]
    fn test_suggest_falls_back_to_record_dates() {
        let pool = Pool {
            id: 1,
            registration_number: None,
            analysis_date: None,
            analyst: None,
            drums: vec![drum(Some("never")), drum(None)],
            observations: None,
            created_at: None,
        };
        let record = PollenRecord {
            id: 0,
            pool: pool.clone(),
            species: None,
            grain_count: 1,
            special_mark: None,
            drum: Some(drum(Some("10/06/2024"))),
        };

        assert_eq!(suggest_for_pool(&pool, &[record]), Some(date(2024, 6, 10)));
    }

    #[test]
    fn test_suggest_no_dates_anywhere() {
        let pool = Pool {
            id: 1,
            registration_number: None,
            analysis_date: None,
            analyst: None,
            drums: vec![],
            observations: None,
            created_at: None,
        };

        assert_eq!(suggest_for_pool(&pool, &[]), None);
    }
}
