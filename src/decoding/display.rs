/// HWS019WRF-V2 display hub payload: `flags;token,token,...`
///
/// Example: `1,0,1;788(788/777/1),68(68/64/1),P=9685(9684/9684/1),`
use log::{debug, warn};
use std::collections::BTreeMap;

use crate::decoding::readings::{DisplayHubReading, Reading};

/// Decode a display hub payload. Never fails: problems are carried in `error`.
pub fn decode_display_hub(raw: &str) -> Reading {
    debug!("Decoding display hub payload: {:?}", raw);

    let reading = match parse_display_payload(raw) {
        Ok((flags, readings)) => DisplayHubReading {
            flags,
            readings,
            raw: raw.to_string(),
            error: None,
        },
        Err(e) => {
            warn!("Failed to decode display hub payload: {} (raw: {:?})", e, raw);
            DisplayHubReading {
                raw: raw.to_string(),
                error: Some(e),
                ..Default::default()
            }
        }
    };

    Reading::DisplayHub(reading)
}

type DisplayFields = (Vec<i64>, BTreeMap<String, String>);

fn parse_display_payload(raw: &str) -> Result<DisplayFields, String> {
    let mut parts = raw.split(';');

    let flags = parts
        .next()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|flag| !flag.is_empty() && flag.bytes().all(|b| b.is_ascii_digit()))
        .map(|flag| {
            flag.parse::<i64>()
                .map_err(|e| format!("invalid flag {flag:?}: {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut readings = BTreeMap::new();
    if let Some(tokens) = parts.next() {
        for item in tokens.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            if let Some((key, value)) = item.split_once('(') {
                readings.insert(
                    key.trim().to_string(),
                    value.trim_matches(')').to_string(),
                );
            } else if let Some((key, value)) = item.split_once('=') {
                readings.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    Ok((flags, readings))
}
