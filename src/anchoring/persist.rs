// src/anchoring/persist.rs

//! The two-line anchor file format.
//!
//! ```text
//! Anchor Time: 2024-03-01T12:00:00.250Z
//! Statevector: [[0.7071067811865476,0.0],[0.7071067811865476,0.0]]
//! ```
//!
//! The vector line is a JSON list of `[re, im]` pairs and is parsed, never
//! evaluated. Timestamps are written as RFC 3339 in UTC with just enough
//! fractional digits to round-trip; timestamps without an offset are read as
//! UTC. Only years `0000` to `9999` fit the format, so anchor times outside
//! that range are refused before anything is written.

use super::AnchorRecord;
use crate::core::{QanchorError, Result, StateVector};
use crate::validation::check_normalization;
use chrono::{DateTime, Datelike, NaiveDateTime, SecondsFormat, Utc};
use std::ops::RangeInclusive;
use std::fs;
use std::path::Path;
use tracing::info;

pub(crate) const TIME_PREFIX: &str = "Anchor Time:";
pub(crate) const STATE_PREFIX: &str = "Statevector:";

/// Source label used when decoding from a string.
const MEMORY_SOURCE: &str = "<memory>";

/// Years representable by an RFC 3339 timestamp.
const TIMESTAMP_YEARS: RangeInclusive<i32> = 0..=9999;

/// Fails with `InvalidState` unless `time` can be written as an anchor timestamp.
pub fn check_timestamp_range(time: &DateTime<Utc>) -> Result<()> {
    if TIMESTAMP_YEARS.contains(&time.year()) {
        Ok(())
    } else {
        Err(QanchorError::invalid_state(format!(
            "anchor time in year {} is outside the persistable range {}..={}",
            time.year(),
            TIMESTAMP_YEARS.start(),
            TIMESTAMP_YEARS.end()
        )))
    }
}

/// Canonical text of an anchor timestamp.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses RFC 3339, or an ISO-8601 date-time without offset taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Renders `record` in the anchor file format, with a trailing newline.
pub fn encode_anchor(record: &AnchorRecord) -> Result<String> {
    check_timestamp_range(&record.anchor_time)?;
    let vector = serde_json::to_string(&record.state)
        .map_err(|e| QanchorError::invalid_state(format!("failed to serialize state vector: {}", e)))?;
    Ok(format!(
        "{} {}\n{} {}\n",
        TIME_PREFIX,
        format_timestamp(&record.anchor_time),
        STATE_PREFIX,
        vector
    ))
}

/// Parses the anchor file format.
///
/// # Errors
/// `MalformedPersistence` if the text is not exactly the two expected lines,
/// the timestamp or vector cannot be parsed, or the vector is not normalized.
pub fn decode_anchor(text: &str) -> Result<AnchorRecord> {
    decode_from(text, MEMORY_SOURCE, None)
}

pub(crate) fn decode_from(text: &str, source: &str, tolerance: Option<f64>) -> Result<AnchorRecord> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() != 2 {
        return Err(QanchorError::malformed(
            source,
            format!("expected 2 lines, found {}", lines.len()),
        ));
    }

    let time_text = lines[0]
        .strip_prefix(TIME_PREFIX)
        .ok_or_else(|| QanchorError::malformed(source, format!("line 1 must start with '{}'", TIME_PREFIX)))?
        .trim();
    let anchor_time = parse_timestamp(time_text)
        .ok_or_else(|| QanchorError::malformed(source, format!("unparsable timestamp '{}'", time_text)))?;

    let vector_text = lines[1]
        .strip_prefix(STATE_PREFIX)
        .ok_or_else(|| QanchorError::malformed(source, format!("line 2 must start with '{}'", STATE_PREFIX)))?
        .trim();
    let state: StateVector = serde_json::from_str(vector_text)
        .map_err(|e| QanchorError::malformed(source, format!("unparsable state vector: {}", e)))?;
    check_normalization(&state, tolerance).map_err(|e| QanchorError::malformed(source, e.to_string()))?;

    Ok(AnchorRecord { state, anchor_time })
}

/// Writes `record` to `path`, replacing any existing file.
pub fn write_anchor_file(record: &AnchorRecord, path: &Path) -> Result<()> {
    let text = encode_anchor(record)?;
    fs::write(path, text).map_err(|source| QanchorError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), anchor_time = %record.timestamp(), "saved anchor");
    Ok(())
}

/// Reads and validates an anchor file.
pub fn read_anchor_file(path: &Path, tolerance: Option<f64>) -> Result<AnchorRecord> {
    let text = fs::read_to_string(path).map_err(|source| QanchorError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let record = decode_from(&text, &path.display().to_string(), tolerance)?;
    info!(path = %path.display(), anchor_time = %record.timestamp(), "loaded anchor");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn record() -> AnchorRecord {
        AnchorRecord {
            state: StateVector::from_pairs(&[(FRAC_1_SQRT_2, 0.0), (0.0, -FRAC_1_SQRT_2)]).unwrap(),
            anchor_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_encoding_layout() {
        let text = encode_anchor(&record()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Anchor Time: 2024-03-01T12:00:00Z"));
        assert!(lines.next().unwrap().starts_with("Statevector: [[0.7071067811865476,0.0],"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_decode_is_exact() {
        let original = record();
        let decoded = decode_anchor(&encode_anchor(&original).unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        let t = parse_timestamp("2024-03-01T12:00:00.123456").unwrap();
        assert_eq!(format_timestamp(&t), "2024-03-01T12:00:00.123456Z");
        let offset = parse_timestamp("2024-03-01T14:00:00+02:00").unwrap();
        assert_eq!(offset, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_years_outside_rfc3339_are_not_encoded() {
        let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        let text = encode_anchor(&AnchorRecord { anchor_time: last, ..record() }).unwrap();
        assert_eq!(decode_anchor(&text).unwrap().anchor_time, last);

        let too_late = last + chrono::TimeDelta::seconds(7200);
        let too_early = DateTime::<Utc>::MIN_UTC + chrono::TimeDelta::days(1);
        for anchor_time in [too_late, too_early] {
            let err = encode_anchor(&AnchorRecord { anchor_time, ..record() }).unwrap_err();
            assert!(matches!(err, QanchorError::InvalidState { .. }), "{:?}", err);
            assert!(check_timestamp_range(&anchor_time).is_err());
        }
    }

    #[test]
    fn test_malformed_inputs() {
        let cases = [
            "",
            "Anchor Time: 2024-03-01T12:00:00Z\n",
            "Time: 2024-03-01T12:00:00Z\nStatevector: [[1.0,0.0],[0.0,0.0]]\n",
            "Anchor Time: soon\nStatevector: [[1.0,0.0],[0.0,0.0]]\n",
            "Anchor Time: 2024-03-01T12:00:00Z\nStatevector: [1.0, 0.0]\n",
            "Anchor Time: 2024-03-01T12:00:00Z\nStatevector: __import__('os')\n",
            "Anchor Time: 2024-03-01T12:00:00Z\nStatevector: [[0.5,0.0],[0.5,0.0]]\n",
            "Anchor Time: 2024-03-01T12:00:00Z\nStatevector: [[1.0,0.0],[0.0,0.0],[0.0,0.0]]\n",
        ];
        for text in cases {
            match decode_anchor(text) {
                Err(QanchorError::MalformedPersistence { path, .. }) => assert_eq!(path, "<memory>"),
                other => panic!("expected malformed error for {:?}, got {:?}", text, other),
            }
        }
    }
}
