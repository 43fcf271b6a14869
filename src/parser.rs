//! Decoding of the flat post dataset and its timestamp column.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::analyzers::types::RawRecord;
use crate::errors::ParseError;

/// Number of characters of the post title or tweet text kept as its topic.
pub const TOPIC_CHARS: usize = 50;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Decodes CSV bytes with a header row into [`RawRecord`]s.
///
/// # Errors
///
/// Returns [`ParseError::Row`] for the first row that does not match the
/// dataset schema. Timestamps are kept as text here and validated by
/// preprocessing.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<RawRecord>, ParseError> {
    let mut rdr = csv::Reader::from_reader(bytes);
    let mut records = Vec::new();

    for (i, result) in rdr.deserialize().enumerate() {
        let record: RawRecord = result.map_err(|e| ParseError::Row {
            row: i + 1,
            reason: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Parses a record's timestamp into a naive UTC date-time.
///
/// Accepts RFC 3339 (normalised to UTC), `YYYY-MM-DD HH:MM:SS` with an
/// optional `T` separator and fractional seconds, and a bare `YYYY-MM-DD`.
pub fn parse_timestamp(record: &RawRecord) -> Result<NaiveDateTime, ParseError> {
    let value = record.timestamp.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    if let Some(dt) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(dt);
    }

    Err(ParseError::Timestamp {
        record_id: record.id.clone(),
        value: record.timestamp.clone(),
    })
}

/// Derives a topic label from free text: the first [`TOPIC_CHARS`]
/// characters followed by `...`.
pub fn topic_from_text(text: &str) -> String {
    let head: String = text.chars().take(TOPIC_CHARS).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_timestamp(ts: &str) -> RawRecord {
        RawRecord {
            id: "p1".to_string(),
            sector: "tech".to_string(),
            sub_entity: "rust".to_string(),
            topic: "t".to_string(),
            engagement: 1,
            secondary_amplifier: 0,
            timestamp: ts.to_string(),
            audience_size: None,
        }
    }

    #[test]
    fn test_parse_rfc3339_normalises_offset() {
        let dt = parse_timestamp(&with_timestamp("2024-03-10T12:00:00+02:00")).unwrap();
        assert_eq!(dt.to_string(), "2024-03-10 10:00:00");
    }

    #[test]
    fn test_parse_naive_formats() {
        assert!(parse_timestamp(&with_timestamp("2024-03-10 12:00:00")).is_ok());
        assert!(parse_timestamp(&with_timestamp("2024-03-10T12:00:00")).is_ok());
        assert!(parse_timestamp(&with_timestamp("2024-03-10 12:00:00.250")).is_ok());
        let midnight = parse_timestamp(&with_timestamp("2024-03-10")).unwrap();
        assert_eq!(midnight.to_string(), "2024-03-10 00:00:00");
    }

    #[test]
    fn test_parse_malformed_timestamp_names_record() {
        let err = parse_timestamp(&with_timestamp("last tuesday")).unwrap_err();
        match err {
            ParseError::Timestamp { record_id, value } => {
                assert_eq!(record_id, "p1");
                assert_eq!(value, "last tuesday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_records_reads_optional_audience() {
        let csv = "id,sector,sub_entity,topic,engagement,secondary_amplifier,timestamp,audience_size\n\
                   a,tech,rust,Hello...,10,2,2024-01-01T00:00:00Z,5000\n\
                   b,tech,#rust,World...,4,1,2024-01-02T00:00:00Z,\n";
        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].audience_size, Some(5000));
        assert_eq!(records[1].audience_size, None);
    }

    #[test]
    fn test_parse_records_rejects_negative_counts() {
        let csv = "id,sector,sub_entity,topic,engagement,secondary_amplifier,timestamp,audience_size\n\
                   a,tech,rust,Hello...,-3,2,2024-01-01T00:00:00Z,\n";
        let err = parse_records(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::Row { row: 1, .. }));
    }

    #[test]
    fn test_parse_empty_dataset() {
        let csv = "id,sector,sub_entity,topic,engagement,secondary_amplifier,timestamp,audience_size\n";
        assert!(parse_records(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_topic_truncates_on_char_boundary() {
        let long = "é".repeat(60);
        let topic = topic_from_text(&long);
        assert_eq!(topic.chars().count(), TOPIC_CHARS + 3);
        assert_eq!(topic_from_text("short"), "short...");
    }
}
