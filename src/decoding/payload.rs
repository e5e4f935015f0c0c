/// Parsing of the vendor `10#<hex>` status encoding and byte-level accessors
///
/// Every accessor returns `None` when the bytes it needs lie past the end of the
/// payload, so decoders can omit trailing fields on short payloads. Only
/// [`expect_tag`] turns a missing byte into an error.
use crate::error::PayloadError;

/// Prefix carried by every binary sub-device status value
pub const PAYLOAD_PREFIX: &str = "10#";

/// Full scale of the raw battery counters
const BATTERY_FULL_SCALE: f64 = 4095.0;

/// Turn `10#E1...` into its byte sequence
pub fn parse(raw: &str) -> Result<Vec<u8>, PayloadError> {
    let hex_part = raw.strip_prefix(PAYLOAD_PREFIX).ok_or_else(|| {
        PayloadError::Format(format!("missing {PAYLOAD_PREFIX:?} prefix in {raw:?}"))
    })?;

    if hex_part.len() % 2 != 0 {
        return Err(PayloadError::Format(format!(
            "hex payload length must be even: {hex_part:?}"
        )));
    }

    hex::decode(hex_part).map_err(|e| PayloadError::Format(format!("{e} in {hex_part:?}")))
}

pub fn byte(bytes: &[u8], index: usize) -> Option<u8> {
    bytes.get(index).copied()
}

/// Little-endian unsigned 16-bit read: `bytes[i] | bytes[i+1] << 8`
pub fn le16(bytes: &[u8], index: usize) -> Option<u16> {
    let lo = *bytes.get(index)?;
    let hi = *bytes.get(index + 1)?;
    Some(u16::from_le_bytes([lo, hi]))
}

/// Big-endian unsigned 16-bit read: `bytes[i] << 8 | bytes[i+1]`
pub fn be16(bytes: &[u8], index: usize) -> Option<u16> {
    let hi = *bytes.get(index)?;
    let lo = *bytes.get(index + 1)?;
    Some(u16::from_be_bytes([hi, lo]))
}

/// Little-endian unsigned integer of `width` bytes starting at `index` (LSB first)
pub fn le_multi(bytes: &[u8], index: usize, width: usize) -> Option<u64> {
    let slice = bytes.get(index..index.checked_add(width)?)?;
    if slice.len() > 8 {
        return None;
    }
    Some(
        slice
            .iter()
            .rev()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
    )
}

/// Two's-complement interpretation of a single byte
pub fn signed_byte(b: u8) -> i8 {
    b as i8
}

/// Structural anchor check; a missing byte counts as a mismatch
pub fn expect_tag(bytes: &[u8], index: usize, expected: u8) -> Result<(), PayloadError> {
    match bytes.get(index).copied() {
        Some(found) if found == expected => Ok(()),
        found => Err(PayloadError::TagMismatch {
            offset: index,
            expected,
            found,
        }),
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Fahrenheit tenths to Celsius, rounded to 2 decimal places
pub fn f10_to_celsius(raw_f10: u16) -> f64 {
    let fahrenheit = f64::from(raw_f10) / 10.0;
    round_to((fahrenheit - 32.0) * 5.0 / 9.0, 2)
}

/// Raw 12-bit battery counter to percent, unrounded
pub fn battery_percent(raw: u16) -> f64 {
    f64::from(raw) / BATTERY_FULL_SCALE * 100.0
}

/// Raw tenths to the unit value (mm, liters, lux)
pub fn tenths(raw: u64) -> f64 {
    raw as f64 / 10.0
}
