/// Byte-layout decoders, one per sensor model
///
/// Offsets are 0-based into the parsed payload (after the `10#` prefix).
/// Fields whose bytes lie past the end of a short payload are left as `None`.
/// Anchor tags are checked with `expect_tag` and fail the whole decode.
use crate::decoding::payload::{
    battery_percent, be16, byte, expect_tag, f10_to_celsius, le16, le_multi, round_to,
    signed_byte, tenths,
};
use crate::decoding::readings::{
    Co2Reading, FlowmeterReading, MoistureFullReading, MoistureSimpleReading, PoolReading,
    RainReading, Reading, TempHumReading,
};
use crate::error::PayloadError;

const MOISTURE_TAG: u8 = 0x88;
const LUX_TAG: u8 = 0xC6;
const RAIN_FIELD_TAG: u8 = 0xFD;
const RAIN_TOTAL_TAG: u8 = 0x97;

/// Decode HCS026FRF (moisture only)
///
/// - Byte 1: RSSI (signed)
/// - Byte 5: 0x88 moisture tag
/// - Byte 6: moisture %
/// - Bytes 7-8: battery/status code (big-endian)
pub fn decode_moisture_simple(bytes: &[u8]) -> Result<Reading, PayloadError> {
    expect_tag(bytes, 5, MOISTURE_TAG)?;

    Ok(Reading::MoistureSimple(MoistureSimpleReading {
        rssi_dbm: byte(bytes, 1).map(signed_byte),
        moisture_percent: byte(bytes, 6),
        battery_status_code: be16(bytes, 7),
        raw_bytes: bytes.to_vec(),
    }))
}

/// Decode HCS021FRF (moisture, temperature and illuminance)
///
/// - Byte 1: RSSI (signed)
/// - Bytes 6-7: temperature, Fahrenheit x10 (little-endian)
/// - Byte 8: 0x88 moisture tag, byte 9: moisture %
/// - Byte 10: 0xC6 lux tag, bytes 11-12: lux x10 (little-endian)
/// - Bytes 14-15: battery/status code (big-endian)
pub fn decode_moisture_full(bytes: &[u8]) -> Result<Reading, PayloadError> {
    expect_tag(bytes, 8, MOISTURE_TAG)?;
    expect_tag(bytes, 10, LUX_TAG)?;

    let temperature_f10 = le16(bytes, 6);
    let illuminance_raw10 = le16(bytes, 11);

    Ok(Reading::MoistureFull(MoistureFullReading {
        rssi_dbm: byte(bytes, 1).map(signed_byte),
        temperature_c: temperature_f10.map(f10_to_celsius),
        temperature_f10,
        moisture_percent: byte(bytes, 9),
        illuminance_lux: illuminance_raw10.map(|raw| tenths(u64::from(raw))),
        illuminance_raw10,
        battery_status_code: be16(bytes, 14),
        raw_bytes: bytes.to_vec(),
    }))
}

/// Decode HCS012ARF (rain gauge)
///
/// - Bytes 3-4: FD 04, bytes 5-6: last hour mm x10
/// - Bytes 7-8: FD 05, bytes 9-10: last 24h mm x10
/// - Bytes 11-12: FD 06, bytes 13-14: last 7 days mm x10
/// - Byte 17: 0x97, bytes 18-19: total mm x10
/// - Bytes 22-23: battery/status code (big-endian)
pub fn decode_rain(bytes: &[u8]) -> Result<Reading, PayloadError> {
    for (offset, tag) in [
        (3, RAIN_FIELD_TAG),
        (4, 0x04),
        (7, RAIN_FIELD_TAG),
        (8, 0x05),
        (11, RAIN_FIELD_TAG),
        (12, 0x06),
        (17, RAIN_TOTAL_TAG),
    ] {
        expect_tag(bytes, offset, tag)?;
    }

    let last_hour_raw10 = le16(bytes, 5);
    let last_24h_raw10 = le16(bytes, 9);
    let last_7d_raw10 = le16(bytes, 13);
    let total_raw10 = le16(bytes, 18);
    let mm = |raw: Option<u16>| raw.map(|r| tenths(u64::from(r)));

    Ok(Reading::Rain(RainReading {
        last_hour_mm: mm(last_hour_raw10),
        last_24h_mm: mm(last_24h_raw10),
        last_7d_mm: mm(last_7d_raw10),
        total_mm: mm(total_raw10),
        last_hour_raw10,
        last_24h_raw10,
        last_7d_raw10,
        total_raw10,
        battery_status_code: be16(bytes, 22),
        raw_bytes: bytes.to_vec(),
    }))
}

/// Decode HCS014ARF (temperature/humidity). No anchors are known for this layout.
pub fn decode_temphum(bytes: &[u8]) -> Result<Reading, PayloadError> {
    let temp_low_f10 = le16(bytes, 1);
    let temp_high_f10 = le16(bytes, 3);
    let temp_current_f10 = le16(bytes, 10);
    let battery_raw = le16(bytes, 17);

    Ok(Reading::TempHum(TempHumReading {
        temp_low_c: temp_low_f10.map(f10_to_celsius),
        temp_high_c: temp_high_f10.map(f10_to_celsius),
        temp_current_c: temp_current_f10.map(f10_to_celsius),
        temp_low_f10,
        temp_high_f10,
        temp_current_f10,
        humidity_current: byte(bytes, 13),
        humidity_low: byte(bytes, 15),
        humidity_high: byte(bytes, 16),
        battery_percent: battery_raw.map(|raw| round_to(battery_percent(raw), 2)),
        battery_raw,
        raw_bytes: bytes.to_vec(),
    }))
}

/// Decode HCS008FRF (flow meter)
///
/// Volumes are little-endian litres x10, durations are little-endian seconds:
/// current used @21 (3 bytes), current duration @26 (3), last used @31 (3),
/// last duration @37 (3), total today @42 (3), total @47 (4).
/// Battery is big-endian at 52-53.
pub fn decode_flowmeter(bytes: &[u8]) -> Result<Reading, PayloadError> {
    let current_used_raw10 = le_multi(bytes, 21, 3);
    let last_used_raw10 = le_multi(bytes, 31, 3);
    let total_today_raw10 = le_multi(bytes, 42, 3);
    let total_raw10 = le_multi(bytes, 47, 4);
    let battery_raw = be16(bytes, 52);

    Ok(Reading::Flowmeter(FlowmeterReading {
        current_used_l: current_used_raw10.map(tenths),
        current_duration_s: le_multi(bytes, 26, 3),
        last_used_l: last_used_raw10.map(tenths),
        last_duration_s: le_multi(bytes, 37, 3),
        total_today_l: total_today_raw10.map(tenths),
        total_l: total_raw10.map(tenths),
        current_used_raw10,
        last_used_raw10,
        total_today_raw10,
        total_raw10,
        battery_percent: battery_raw.map(|raw| round_to(battery_percent(raw), 1)),
        battery_raw,
        raw_bytes: bytes.to_vec(),
    }))
}

/// Decode HCS0530THO (CO2, temperature, humidity). No anchors are known for this layout.
pub fn decode_co2(bytes: &[u8]) -> Result<Reading, PayloadError> {
    let temperature_f10 = le16(bytes, 15);
    let battery_raw = le16(bytes, 28);

    Ok(Reading::Co2(Co2Reading {
        co2_ppm: le16(bytes, 1),
        co2_low_ppm: le16(bytes, 24),
        co2_high_ppm: le16(bytes, 26),
        temperature_c: temperature_f10.map(f10_to_celsius),
        temperature_f10,
        humidity_percent: byte(bytes, 18),
        battery_percent: battery_raw.map(|raw| round_to(battery_percent(raw), 2)),
        battery_raw,
        rssi_dbm: byte(bytes, 32).map(signed_byte),
        raw_bytes: bytes.to_vec(),
    }))
}

/// Decode HCS0528ARF (pool thermometer)
///
/// The battery counter takes its high byte from offset 13 and its low byte
/// from offset 11, which it shares with the current temperature.
pub fn decode_pool(bytes: &[u8]) -> Result<Reading, PayloadError> {
    let temp_low_f10 = le16(bytes, 1);
    let temp_high_f10 = le16(bytes, 3);
    let temp_current_f10 = le16(bytes, 10);
    let battery_raw = match (byte(bytes, 13), byte(bytes, 11)) {
        (Some(hi), Some(lo)) => Some(u16::from_be_bytes([hi, lo])),
        _ => None,
    };

    Ok(Reading::Pool(PoolReading {
        temp_low_c: temp_low_f10.map(f10_to_celsius),
        temp_high_c: temp_high_f10.map(f10_to_celsius),
        temp_current_c: temp_current_f10.map(f10_to_celsius),
        temp_low_f10,
        temp_high_f10,
        temp_current_f10,
        battery_percent: battery_raw.map(|raw| round_to(battery_percent(raw), 2)),
        battery_raw,
        raw_bytes: bytes.to_vec(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOISTURE_FULL: [u8; 16] = [
        0xE1, 0xC4, 0x00, 0xDC, 0x01, 0x85, 0x0A, 0x03, 0x88, 0x2A, 0xC6, 0xE8, 0x03, 0x00, 0xFF,
        0x0F,
    ];

    const RAIN: [u8; 24] = [
        0xE1, 0x00, 0x00, 0xFD, 0x04, 0x05, 0x00, 0xFD, 0x05, 0x2C, 0x01, 0xFD, 0x06, 0xE8, 0x03,
        0xDC, 0x01, 0x97, 0x10, 0x27, 0x00, 0x00, 0xFF, 0x0F,
    ];

    #[test]
    fn moisture_simple_layout() {
        let bytes = [0xE1, 0x05, 0x00, 0xDC, 0x01, 0x88, 0x42, 0x00, 0x01];
        let Reading::MoistureSimple(r) = decode_moisture_simple(&bytes).unwrap() else {
            panic!("wrong reading type");
        };
        assert_eq!(r.rssi_dbm, Some(5));
        assert_eq!(r.moisture_percent, Some(66));
        assert_eq!(r.battery_status_code, Some(1));
        assert_eq!(r.raw_bytes, bytes.to_vec());
    }

    #[test]
    fn moisture_simple_rejects_wrong_tag() {
        let bytes = [0xE1, 0x05, 0x00, 0xDC, 0x01, 0x85, 0x42, 0x00, 0x01];
        assert_eq!(
            decode_moisture_simple(&bytes),
            Err(PayloadError::TagMismatch {
                offset: 5,
                expected: 0x88,
                found: Some(0x85)
            })
        );
    }

    #[test]
    fn moisture_simple_without_battery_bytes() {
        let bytes = [0xE1, 0xF6, 0x00, 0xDC, 0x01, 0x88, 0x30];
        let Reading::MoistureSimple(r) = decode_moisture_simple(&bytes).unwrap() else {
            panic!("wrong reading type");
        };
        assert_eq!(r.rssi_dbm, Some(-10));
        assert_eq!(r.moisture_percent, Some(48));
        assert_eq!(r.battery_status_code, None);
    }

    #[test]
    fn moisture_full_layout() {
        let Reading::MoistureFull(r) = decode_moisture_full(&MOISTURE_FULL).unwrap() else {
            panic!("wrong reading type");
        };
        assert_eq!(r.rssi_dbm, Some(-60));
        assert_eq!(r.temperature_f10, Some(778));
        assert_eq!(r.temperature_c, Some(25.44));
        assert_eq!(r.moisture_percent, Some(42));
        assert_eq!(r.illuminance_raw10, Some(1000));
        assert_eq!(r.illuminance_lux, Some(100.0));
        assert_eq!(r.battery_status_code, Some(0xFF0F));
    }

    #[test]
    fn moisture_full_checks_both_anchors() {
        let mut bytes = MOISTURE_FULL;
        bytes[10] = 0x00;
        assert!(matches!(
            decode_moisture_full(&bytes),
            Err(PayloadError::TagMismatch { offset: 10, .. })
        ));

        let mut bytes = MOISTURE_FULL;
        bytes[8] = 0x00;
        assert!(matches!(
            decode_moisture_full(&bytes),
            Err(PayloadError::TagMismatch { offset: 8, .. })
        ));
    }

    #[test]
    fn moisture_full_omits_trailing_battery() {
        let Reading::MoistureFull(r) = decode_moisture_full(&MOISTURE_FULL[..13]).unwrap() else {
            panic!("wrong reading type");
        };
        assert_eq!(r.illuminance_lux, Some(100.0));
        assert_eq!(r.battery_status_code, None);
    }

    #[test]
    fn rain_layout() {
        let Reading::Rain(r) = decode_rain(&RAIN).unwrap() else {
            panic!("wrong reading type");
        };
        assert_eq!(r.last_hour_mm, Some(0.5));
        assert_eq!(r.last_24h_mm, Some(30.0));
        assert_eq!(r.last_7d_mm, Some(100.0));
        assert_eq!(r.total_mm, Some(1000.0));
        assert_eq!(r.total_raw10, Some(10000));
        assert_eq!(r.battery_status_code, Some(0xFF0F));
    }

    #[test]
    fn rain_rejects_each_anchor() {
        for offset in [3, 4, 7, 8, 11, 12, 17] {
            let mut bytes = RAIN;
            bytes[offset] ^= 0xFF;
            match decode_rain(&bytes) {
                Err(PayloadError::TagMismatch { offset: o, .. }) => assert_eq!(o, offset),
                other => panic!("offset {offset}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn rain_short_payload_fails_on_missing_anchor() {
        assert!(matches!(
            decode_rain(&RAIN[..10]),
            Err(PayloadError::TagMismatch {
                offset: 11,
                found: None,
                ..
            })
        ));
    }

    #[test]
    fn temphum_layout() {
        let bytes = [
            0xE1, 0xD0, 0x02, 0x20, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0xEE, 0x02, 0x00, 0x37,
            0x00, 0x28, 0x46, 0xFF, 0x0F,
        ];
        let Reading::TempHum(r) = decode_temphum(&bytes).unwrap() else {
            panic!("wrong reading type");
        };
        assert_eq!(r.temp_low_c, Some(22.22));
        assert_eq!(r.temp_high_c, Some(26.67));
        assert_eq!(r.temp_current_c, Some(23.89));
        assert_eq!(r.temp_current_f10, Some(750));
        assert_eq!(r.humidity_current, Some(55));
        assert_eq!(r.humidity_low, Some(40));
        assert_eq!(r.humidity_high, Some(70));
        assert_eq!(r.battery_raw, Some(4095));
        assert_eq!(r.battery_percent, Some(100.0));

        let Reading::TempHum(short) = decode_temphum(&bytes[..12]).unwrap() else {
            panic!("wrong reading type");
        };
        assert_eq!(short.temp_current_c, Some(23.89));
        assert_eq!(short.humidity_current, None);
        assert_eq!(short.battery_percent, None);
    }

    #[test]
    fn empty_payload_yields_all_fields_absent() {
        let Reading::TempHum(r) = decode_temphum(&[]).unwrap() else {
            panic!("wrong reading type");
        };
        assert_eq!(r, TempHumReading::default());
    }

    #[test]
    fn flowmeter_layout() {
        let mut bytes = vec![0u8; 57];
        bytes[21..24].copy_from_slice(&[0x39, 0x30, 0x00]);
        bytes[26..29].copy_from_slice(&[0x3C, 0x00, 0x00]);
        bytes[31..34].copy_from_slice(&[0xE8, 0x03, 0x00]);
        bytes[37..40].copy_from_slice(&[0x78, 0x00, 0x00]);
        bytes[42..45].copy_from_slice(&[0xD0, 0x07, 0x00]);
        bytes[47..51].copy_from_slice(&[0x40, 0x42, 0x0F, 0x00]);
        bytes[52..54].copy_from_slice(&[0x0F, 0xFF]);

        let Reading::Flowmeter(r) = decode_flowmeter(&bytes).unwrap() else {
            panic!("wrong reading type");
        };
        assert_eq!(r.current_used_l, Some(1234.5));
        assert_eq!(r.current_used_raw10, Some(12345));
        assert_eq!(r.current_duration_s, Some(60));
        assert_eq!(r.last_used_l, Some(100.0));
        assert_eq!(r.last_duration_s, Some(120));
        assert_eq!(r.total_today_l, Some(200.0));
        assert_eq!(r.total_l, Some(100000.0));
        assert_eq!(r.battery_raw, Some(4095));
        assert_eq!(r.battery_percent, Some(100.0));

        let Reading::Flowmeter(short) = decode_flowmeter(&bytes[..35]).unwrap() else {
            panic!("wrong reading type");
        };
        assert_eq!(short.last_used_l, Some(100.0));
        assert_eq!(short.last_duration_s, None);
        assert_eq!(short.total_l, None);
        assert_eq!(short.battery_percent, None);
    }

    #[test]
    fn co2_layout() {
        let mut bytes = vec![0u8; 33];
        bytes[1..3].copy_from_slice(&[0x20, 0x03]);
        bytes[15..17].copy_from_slice(&[0xD0, 0x02]);
        bytes[18] = 45;
        bytes[24..26].copy_from_slice(&[0x90, 0x01]);
        bytes[26..28].copy_from_slice(&[0xB0, 0x04]);
        bytes[28..30].copy_from_slice(&[0x00, 0x08]);
        bytes[32] = 0xB5;

        let Reading::Co2(r) = decode_co2(&bytes).unwrap() else {
            panic!("wrong reading type");
        };
        assert_eq!(r.co2_ppm, Some(800));
        assert_eq!(r.temperature_c, Some(22.22));
        assert_eq!(r.humidity_percent, Some(45));
        assert_eq!(r.co2_low_ppm, Some(400));
        assert_eq!(r.co2_high_ppm, Some(1200));
        assert_eq!(r.battery_raw, Some(2048));
        assert_eq!(r.battery_percent, Some(50.01));
        assert_eq!(r.rssi_dbm, Some(-75));

        let Reading::Co2(short) = decode_co2(&bytes[..20]).unwrap() else {
            panic!("wrong reading type");
        };
        assert_eq!(short.humidity_percent, Some(45));
        assert_eq!(short.co2_low_ppm, None);
        assert_eq!(short.rssi_dbm, None);
    }

    #[test]
    fn pool_battery_uses_split_bytes() {
        let mut bytes = vec![0u8; 14];
        bytes[1..3].copy_from_slice(&[0x58, 0x02]);
        bytes[3..5].copy_from_slice(&[0x84, 0x03]);
        bytes[10..12].copy_from_slice(&[0x20, 0x03]);
        bytes[12] = 0x55;
        bytes[13] = 0x08;

        let Reading::Pool(r) = decode_pool(&bytes).unwrap() else {
            panic!("wrong reading type");
        };
        assert_eq!(r.temp_low_c, Some(15.56));
        assert_eq!(r.temp_high_c, Some(32.22));
        assert_eq!(r.temp_current_c, Some(26.67));
        assert_eq!(r.battery_raw, Some(0x0803));
        assert_eq!(r.battery_percent, Some(50.09));

        let Reading::Pool(short) = decode_pool(&bytes[..13]).unwrap() else {
            panic!("wrong reading type");
        };
        assert_eq!(short.temp_current_c, Some(26.67));
        assert_eq!(short.battery_raw, None);
    }
}
