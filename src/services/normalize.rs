// src/services/normalize.rs

//! Conversion of upstream records into canonical store records.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

use crate::error::{AppError, Result};
use crate::models::{DemandReading, OutageEvent, SourceEvent, SummaryData, SummarySnapshot};

/// Upper end of the demand scale, in MW.
pub const DEMAND_CEILING: i64 = 5500;

/// Number of demand rating buckets.
pub const RATING_BUCKETS: i64 = 12;

/// Offset every stored timestamp is rendered in (AEST, no daylight saving).
pub const SOURCE_OFFSET_SECS: i32 = 10 * 3600;

const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";
const UPDATED_AT_FORMAT: &str = "%d %B %Y %I:%M %p";
const RESTORE_FORMATS_WITH_OFFSET: [&str; 2] = ["%Y-%m-%dT%H%M%S%z", "%Y-%m-%dT%H%M%S%.f%z"];
const RESTORE_FORMATS_LOCAL: [&str; 2] = ["%Y-%m-%dT%H%M%S", "%Y-%m-%dT%H%M%S%.f"];

fn source_offset() -> FixedOffset {
    FixedOffset::east_opt(SOURCE_OFFSET_SECS).expect("+10:00 is a valid offset")
}

/// Render an instant as `YYYY-MM-DDTHH:MM:SS+10:00`.
pub fn format_timestamp<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    instant
        .with_timezone(&source_offset())
        .format(CANONICAL_FORMAT)
        .to_string()
}

/// Demand rating in `1..=12`.
///
/// The `0..=5500` scale is split into twelve equal buckets and the 1-based
/// bucket index is returned. Values outside the scale clamp.
pub fn rating(demand: i64) -> i64 {
    let bucket = demand.saturating_mul(RATING_BUCKETS).div_euclid(DEMAND_CEILING);
    bucket.saturating_add(1).clamp(1, RATING_BUCKETS)
}

/// Title-case words: the first letter after any non-letter is uppercased and
/// the rest lowercased. Runs of whitespace collapse to one space.
pub fn title_case(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    let mut prev_letter = false;

    for c in collapsed.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

/// Title-case, sort and comma-join street names.
///
/// Sorting makes the value independent of the order upstream lists them in.
pub fn canonical_streets(streets: &[String]) -> String {
    let mut names: Vec<String> = streets
        .iter()
        .map(|s| title_case(s))
        .filter(|s| !s.is_empty())
        .collect();
    names.sort();
    names.join(",")
}

/// Parse an upstream restore time into canonical form.
///
/// Colons are stripped before parsing so `16:30:00+10:00` and `163000+1000`
/// are equivalent. A value without an offset is read as +10:00.
pub fn parse_restore_time(value: &str) -> Result<String> {
    let trimmed = value.trim();
    let compact: String = match trimmed.strip_suffix('Z') {
        Some(rest) => format!("{rest}+0000"),
        None => trimmed.to_string(),
    }
    .chars()
    .filter(|c| *c != ':')
    .collect();

    for format in RESTORE_FORMATS_WITH_OFFSET {
        if let Ok(instant) = DateTime::parse_from_str(&compact, format) {
            return Ok(format_timestamp(&instant));
        }
    }

    let mut last_error = None;
    for format in RESTORE_FORMATS_LOCAL {
        match NaiveDateTime::parse_from_str(&compact, format) {
            Ok(naive) => return localize(value, &naive),
            Err(e) => last_error = Some(e),
        }
    }

    Err(AppError::timestamp(
        value,
        last_error.map_or_else(|| "empty value".to_string(), |e| e.to_string()),
    ))
}

/// Parse the summary's `lastUpdated` value, e.g. `05 January 2023 02:30 PM`.
pub fn parse_updated_at(value: &str) -> Result<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    let naive = NaiveDateTime::parse_from_str(&collapsed, UPDATED_AT_FORMAT)
        .map_err(|e| AppError::timestamp(value, e))?;
    localize(value, &naive)
}

fn localize(value: &str, naive: &NaiveDateTime) -> Result<String> {
    source_offset()
        .from_local_datetime(naive)
        .single()
        .map(|instant| format_timestamp(&instant))
        .ok_or_else(|| AppError::timestamp(value, "ambiguous local time"))
}

/// Parse the demand endpoint's plain-text body.
pub fn parse_demand(text: &str) -> Result<i64> {
    let value = text.trim();
    value
        .parse()
        .map_err(|e| AppError::decode("demand", format!("'{value}' is not an integer: {e}")))
}

/// Shapes every record of one run, stamping them with the run's start time.
#[derive(Debug, Clone)]
pub struct Normalizer {
    retrieved_at: String,
}

impl Normalizer {
    pub fn new<Tz: TimeZone>(run_started: &DateTime<Tz>) -> Self {
        Self {
            retrieved_at: format_timestamp(run_started),
        }
    }

    /// Normalizer stamped with the current wall clock.
    pub fn now() -> Self {
        Self::new(&Utc::now())
    }

    pub fn retrieved_at(&self) -> &str {
        &self.retrieved_at
    }

    pub fn demand(&self, text: &str) -> Result<DemandReading> {
        let demand = parse_demand(text)?;
        Ok(DemandReading {
            demand,
            rating: rating(demand),
            retrieved_at: self.retrieved_at.clone(),
        })
    }

    pub fn summary(&self, data: &SummaryData) -> Result<SummarySnapshot> {
        Ok(SummarySnapshot {
            retrieved_at: self.retrieved_at.clone(),
            updated_at: parse_updated_at(&data.last_updated)?,
            total_customers_affected: data.total_customers_affected,
        })
    }

    pub fn event(&self, source: &SourceEvent) -> Result<OutageEvent> {
        let restore_at = match source.restore_time.as_deref() {
            Some(value) => parse_restore_time(value)?,
            None => {
                return Err(AppError::timestamp(
                    "",
                    format!("event {} has no restore time", source.event),
                ));
            }
        };

        Ok(OutageEvent {
            event_name: source.event.trim().to_lowercase(),
            council: title_case(&source.council),
            suburb: title_case(&source.suburb),
            post_code: source.postcode.trim().to_string(),
            customers_affected: source.customers_affected,
            cause: source.cause.trim().to_string(),
            restore_at,
            streets: canonical_streets(&source.streets),
            retrieved_at: self.retrieved_at.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_event(streets: &[&str]) -> SourceEvent {
        SourceEvent {
            event: "INCD-42-r".to_string(),
            council: "BRISBANE CITY".to_string(),
            suburb: "KANGAROO POINT".to_string(),
            postcode: "4169".to_string(),
            customers_affected: 12,
            cause: "Fault".to_string(),
            restore_time: Some("2023-01-05T16:30:00+10:00".to_string()),
            streets: streets.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn normalizer() -> Normalizer {
        let start = DateTime::parse_from_rfc3339("2023-01-05T04:00:00Z").unwrap();
        Normalizer::new(&start)
    }

    #[test]
    fn rating_boundaries() {
        assert_eq!(rating(0), 1);
        assert_eq!(rating(458), 1);
        assert_eq!(rating(459), 2);
        assert_eq!(rating(2750), 7);
        assert_eq!(rating(5499), 12);
        assert_eq!(rating(5500), 12);
        assert_eq!(rating(6000), 12);
        assert_eq!(rating(-5), 1);
        assert_eq!(rating(i64::MIN), 1);
        assert_eq!(rating(i64::MAX), 12);
    }

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("KANGAROO POINT"), "Kangaroo Point");
        assert_eq!(title_case("o'brien st"), "O'Brien St");
        assert_eq!(title_case("  mt   cotton-road "), "Mt Cotton-Road");
    }

    #[test]
    fn streets_are_stable_under_case_and_order() {
        let first = canonical_streets(&["Oak St".to_string(), "Pine St".to_string()]);
        let second = canonical_streets(&["pine st".to_string(), "OAK ST".to_string()]);
        assert_eq!(first, "Oak St,Pine St");
        assert_eq!(first, second);
    }

    #[test]
    fn restore_time_variants_canonicalize() {
        let expected = "2023-01-05T16:30:00+10:00";
        assert_eq!(parse_restore_time("2023-01-05T16:30:00+10:00").unwrap(), expected);
        assert_eq!(parse_restore_time("2023-01-05T163000+1000").unwrap(), expected);
        assert_eq!(parse_restore_time("2023-01-05T16:30:00").unwrap(), expected);
        assert_eq!(parse_restore_time("2023-01-05T06:30:00Z").unwrap(), expected);
    }

    #[test]
    fn malformed_restore_time_is_rejected() {
        assert!(matches!(
            parse_restore_time("tomorrow"),
            Err(AppError::TimestampParse { .. })
        ));
        assert!(parse_restore_time("").is_err());
    }

    #[test]
    fn updated_at_parses_long_form() {
        assert_eq!(
            parse_updated_at("05 January 2023 02:30 PM").unwrap(),
            "2023-01-05T14:30:00+10:00"
        );
        assert!(parse_updated_at("yesterday").is_err());
    }

    #[test]
    fn demand_text_is_trimmed() {
        assert_eq!(parse_demand(" 2750\n").unwrap(), 2750);
        assert!(matches!(parse_demand("n/a"), Err(AppError::Decode { .. })));
    }

    #[test]
    fn run_timestamp_is_rendered_at_plus_ten() {
        assert_eq!(normalizer().retrieved_at(), "2023-01-05T14:00:00+10:00");
    }

    #[test]
    fn event_is_normalized() {
        let event = normalizer()
            .event(&source_event(&["SHAFSTON AVE", "main st"]))
            .unwrap();

        assert_eq!(event.event_name, "incd-42-r");
        assert_eq!(event.council, "Brisbane City");
        assert_eq!(event.suburb, "Kangaroo Point");
        assert_eq!(event.streets, "Main St,Shafston Ave");
        assert_eq!(event.restore_at, "2023-01-05T16:30:00+10:00");
        assert_eq!(event.retrieved_at, "2023-01-05T14:00:00+10:00");
    }

    #[test]
    fn reordered_streets_share_a_natural_key() {
        let n = normalizer();
        let first = n.event(&source_event(&["Oak St", "Pine St"])).unwrap();
        let second = n.event(&source_event(&["pine st", "OAK ST"])).unwrap();
        assert_eq!(first.natural_key(), second.natural_key());
    }

    #[test]
    fn event_without_restore_time_is_rejected() {
        let mut source = source_event(&[]);
        source.restore_time = None;
        assert!(matches!(
            normalizer().event(&source),
            Err(AppError::TimestampParse { .. })
        ));
    }

    #[test]
    fn demand_and_summary_share_the_run_timestamp() {
        let n = normalizer();
        let demand = n.demand("459").unwrap();
        let summary = n
            .summary(&SummaryData {
                total_customers_affected: 321,
                last_updated: "05 January 2023 01:55 PM".to_string(),
            })
            .unwrap();

        assert_eq!(demand.rating, 2);
        assert_eq!(demand.retrieved_at, summary.retrieved_at);
        assert_eq!(summary.updated_at, "2023-01-05T13:55:00+10:00");
    }
}
