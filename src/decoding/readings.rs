/// Typed readings produced by the model decoders
///
/// Fields are `Option` because short payloads omit trailing values. `None`
/// means unknown and must never be read as zero. Raw integer fields are kept
/// next to their converted value for diagnostics.
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reading {
    MoistureSimple(MoistureSimpleReading),
    MoistureFull(MoistureFullReading),
    Rain(RainReading),
    TempHum(TempHumReading),
    Flowmeter(FlowmeterReading),
    Co2(Co2Reading),
    Pool(PoolReading),
    DisplayHub(DisplayHubReading),
}

/// HCS026FRF soil moisture probe
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MoistureSimpleReading {
    pub rssi_dbm: Option<i8>,
    pub moisture_percent: Option<u8>,
    pub battery_status_code: Option<u16>,
    pub raw_bytes: Vec<u8>,
}

/// HCS021FRF soil moisture, temperature and light probe
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MoistureFullReading {
    pub rssi_dbm: Option<i8>,
    pub temperature_c: Option<f64>,
    pub temperature_f10: Option<u16>,
    pub moisture_percent: Option<u8>,
    pub illuminance_lux: Option<f64>,
    pub illuminance_raw10: Option<u16>,
    pub battery_status_code: Option<u16>,
    pub raw_bytes: Vec<u8>,
}

/// HCS012ARF rain gauge
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RainReading {
    pub last_hour_mm: Option<f64>,
    pub last_24h_mm: Option<f64>,
    pub last_7d_mm: Option<f64>,
    pub total_mm: Option<f64>,
    pub last_hour_raw10: Option<u16>,
    pub last_24h_raw10: Option<u16>,
    pub last_7d_raw10: Option<u16>,
    pub total_raw10: Option<u16>,
    pub battery_status_code: Option<u16>,
    pub raw_bytes: Vec<u8>,
}

/// HCS014ARF temperature and humidity sensor
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TempHumReading {
    pub temp_low_c: Option<f64>,
    pub temp_high_c: Option<f64>,
    pub temp_current_c: Option<f64>,
    pub temp_low_f10: Option<u16>,
    pub temp_high_f10: Option<u16>,
    pub temp_current_f10: Option<u16>,
    pub humidity_current: Option<u8>,
    pub humidity_low: Option<u8>,
    pub humidity_high: Option<u8>,
    pub battery_percent: Option<f64>,
    pub battery_raw: Option<u16>,
    pub raw_bytes: Vec<u8>,
}

/// HCS008FRF water flow meter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowmeterReading {
    pub current_used_l: Option<f64>,
    pub current_duration_s: Option<u64>,
    pub last_used_l: Option<f64>,
    pub last_duration_s: Option<u64>,
    pub total_today_l: Option<f64>,
    pub total_l: Option<f64>,
    pub current_used_raw10: Option<u64>,
    pub last_used_raw10: Option<u64>,
    pub total_today_raw10: Option<u64>,
    pub total_raw10: Option<u64>,
    pub battery_percent: Option<f64>,
    pub battery_raw: Option<u16>,
    pub raw_bytes: Vec<u8>,
}

/// HCS0530THO CO2, temperature and humidity sensor
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Co2Reading {
    pub co2_ppm: Option<u16>,
    pub co2_low_ppm: Option<u16>,
    pub co2_high_ppm: Option<u16>,
    pub temperature_c: Option<f64>,
    pub temperature_f10: Option<u16>,
    pub humidity_percent: Option<u8>,
    pub battery_percent: Option<f64>,
    pub battery_raw: Option<u16>,
    pub rssi_dbm: Option<i8>,
    pub raw_bytes: Vec<u8>,
}

/// HCS0528ARF pool thermometer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoolReading {
    pub temp_low_c: Option<f64>,
    pub temp_high_c: Option<f64>,
    pub temp_current_c: Option<f64>,
    pub temp_low_f10: Option<u16>,
    pub temp_high_f10: Option<u16>,
    pub temp_current_f10: Option<u16>,
    pub battery_percent: Option<f64>,
    pub battery_raw: Option<u16>,
    pub raw_bytes: Vec<u8>,
}

/// HWS019WRF-V2 display hub, semicolon/CSV text payload
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayHubReading {
    pub flags: Vec<i64>,
    pub readings: BTreeMap<String, String>,
    pub raw: String,
    pub error: Option<String>,
}

impl Reading {
    /// Snake-case type tag, same as the serialized `type` field
    pub fn kind(&self) -> &'static str {
        match self {
            Reading::MoistureSimple(_) => "moisture_simple",
            Reading::MoistureFull(_) => "moisture_full",
            Reading::Rain(_) => "rain",
            Reading::TempHum(_) => "temp_hum",
            Reading::Flowmeter(_) => "flowmeter",
            Reading::Co2(_) => "co2",
            Reading::Pool(_) => "pool",
            Reading::DisplayHub(_) => "display_hub",
        }
    }

    /// Bytes the reading was decoded from; empty for text payloads
    pub fn raw_bytes(&self) -> &[u8] {
        match self {
            Reading::MoistureSimple(r) => &r.raw_bytes,
            Reading::MoistureFull(r) => &r.raw_bytes,
            Reading::Rain(r) => &r.raw_bytes,
            Reading::TempHum(r) => &r.raw_bytes,
            Reading::Flowmeter(r) => &r.raw_bytes,
            Reading::Co2(r) => &r.raw_bytes,
            Reading::Pool(r) => &r.raw_bytes,
            Reading::DisplayHub(_) => &[],
        }
    }

    /// Converted measurements that are present, as `(name, value)` pairs
    pub fn measurements(&self) -> Vec<(&'static str, f64)> {
        let fields: Vec<(&'static str, Option<f64>)> = match self {
            Reading::MoistureSimple(r) => vec![
                ("moisture_percent", r.moisture_percent.map(f64::from)),
                ("rssi_dbm", r.rssi_dbm.map(f64::from)),
            ],
            Reading::MoistureFull(r) => vec![
                ("moisture_percent", r.moisture_percent.map(f64::from)),
                ("temperature_c", r.temperature_c),
                ("illuminance_lux", r.illuminance_lux),
                ("rssi_dbm", r.rssi_dbm.map(f64::from)),
            ],
            Reading::Rain(r) => vec![
                ("rain_last_hour_mm", r.last_hour_mm),
                ("rain_last_24h_mm", r.last_24h_mm),
                ("rain_last_7d_mm", r.last_7d_mm),
                ("rain_total_mm", r.total_mm),
            ],
            Reading::TempHum(r) => vec![
                ("temp_current_c", r.temp_current_c),
                ("temp_low_c", r.temp_low_c),
                ("temp_high_c", r.temp_high_c),
                ("humidity_current", r.humidity_current.map(f64::from)),
                ("humidity_low", r.humidity_low.map(f64::from)),
                ("humidity_high", r.humidity_high.map(f64::from)),
                ("battery_percent", r.battery_percent),
            ],
            Reading::Flowmeter(r) => vec![
                ("current_used_l", r.current_used_l),
                ("current_duration_s", r.current_duration_s.map(|v| v as f64)),
                ("last_used_l", r.last_used_l),
                ("last_duration_s", r.last_duration_s.map(|v| v as f64)),
                ("total_today_l", r.total_today_l),
                ("total_l", r.total_l),
                ("battery_percent", r.battery_percent),
            ],
            Reading::Co2(r) => vec![
                ("co2_ppm", r.co2_ppm.map(f64::from)),
                ("co2_low_ppm", r.co2_low_ppm.map(f64::from)),
                ("co2_high_ppm", r.co2_high_ppm.map(f64::from)),
                ("temperature_c", r.temperature_c),
                ("humidity_percent", r.humidity_percent.map(f64::from)),
                ("battery_percent", r.battery_percent),
                ("rssi_dbm", r.rssi_dbm.map(f64::from)),
            ],
            Reading::Pool(r) => vec![
                ("temp_current_c", r.temp_current_c),
                ("temp_low_c", r.temp_low_c),
                ("temp_high_c", r.temp_high_c),
                ("battery_percent", r.battery_percent),
            ],
            Reading::DisplayHub(_) => Vec::new(),
        };

        fields
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect()
    }
}
