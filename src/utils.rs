/// Utility functions for time handling and cycle summaries
use time::{format_description, OffsetDateTime};

use crate::models::SensorRecord;

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format.
/// Falls back to the default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    format_description::parse("[day].[month].[year] - [hour]:[minute]:[second]")
        .ok()
        .and_then(|format| dt.format(&format).ok())
        .unwrap_or_else(|| dt.to_string())
}

/// Format an epoch-milliseconds device timestamp, if it is representable
pub fn format_epoch_millis(ms: i64) -> Option<String> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .ok()
        .map(|dt| format_datetime(&dt))
}

/// Convert a time::Duration to whole seconds, clamping negatives to zero
pub fn duration_to_seconds(duration: time::Duration) -> u64 {
    duration.whole_seconds().max(0) as u64
}

/// Human-readable lines describing one sensor record
///
/// The first line names the sensor; each following line is one decoded
/// measurement. Offline or undecodable sensors get a single status line.
pub fn summarize_record(record: &SensorRecord) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}) on {} [{}]",
        record.display_name(),
        record.model.as_deref().unwrap_or("unknown model"),
        record.hub_name,
        record.key
    )];

    match &record.decoded {
        Some(reading) => {
            let measurements = reading.measurements();
            if measurements.is_empty() {
                lines.push(format!("  {}: no numeric fields", reading.kind()));
                if !reading.raw_bytes().is_empty() {
                    lines.push(format!("  raw bytes: {}", hex::encode_upper(reading.raw_bytes())));
                }
            }
            for (name, value) in measurements {
                lines.push(format!("  {}: {}", name, value));
            }
        }
        None => lines.push("  no data".to_string()),
    }

    if let Some(seen) = record
        .last_raw_status
        .timestamp
        .and_then(format_epoch_millis)
    {
        lines.push(format!("  reported at {}", seen));
    }

    lines
}
