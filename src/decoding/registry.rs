/// Model identifier to decoder lookup
use std::collections::HashMap;

use crate::decoding::decoders::{
    decode_co2, decode_flowmeter, decode_moisture_full, decode_moisture_simple, decode_pool,
    decode_rain, decode_temphum,
};
use crate::decoding::display::decode_display_hub;
use crate::decoding::payload::parse;
use crate::decoding::readings::Reading;
use crate::error::PayloadError;

// Known sensor models
pub const MODEL_MOISTURE_SIMPLE: &str = "HCS026FRF"; // Moisture only
pub const MODEL_MOISTURE_FULL: &str = "HCS021FRF"; // Moisture + temp + lux
pub const MODEL_RAIN: &str = "HCS012ARF"; // Rain gauge
pub const MODEL_TEMPHUM: &str = "HCS014ARF"; // Temperature/Humidity
pub const MODEL_FLOWMETER: &str = "HCS008FRF"; // Flowmeter
pub const MODEL_CO2: &str = "HCS0530THO"; // CO2/Temp/Humidity
pub const MODEL_POOL: &str = "HCS0528ARF"; // Pool/Temperature
pub const MODEL_DISPLAY_HUB: &str = "HWS019WRF-V2"; // Irrigation display hub

pub type BinaryDecoder = fn(&[u8]) -> Result<Reading, PayloadError>;
pub type TextDecoder = fn(&str) -> Reading;

#[derive(Clone, Copy)]
pub enum Decoder {
    /// Takes the bytes behind the `10#` prefix
    Binary(BinaryDecoder),
    /// Takes the raw status string untouched
    Text(TextDecoder),
}

impl Decoder {
    pub fn decode(&self, raw: &str) -> Result<Reading, PayloadError> {
        match self {
            Decoder::Binary(decode) => decode(&parse(raw)?),
            Decoder::Text(decode) => Ok(decode(raw)),
        }
    }
}

#[derive(Clone, Default)]
pub struct DecoderRegistry {
    decoders: HashMap<String, Decoder>,
}

impl DecoderRegistry {
    /// Registry with every model this crate knows how to decode
    pub fn with_builtin_models() -> Self {
        let mut registry = Self::default();
        registry.register(MODEL_MOISTURE_SIMPLE, Decoder::Binary(decode_moisture_simple));
        registry.register(MODEL_MOISTURE_FULL, Decoder::Binary(decode_moisture_full));
        registry.register(MODEL_RAIN, Decoder::Binary(decode_rain));
        registry.register(MODEL_TEMPHUM, Decoder::Binary(decode_temphum));
        registry.register(MODEL_FLOWMETER, Decoder::Binary(decode_flowmeter));
        registry.register(MODEL_CO2, Decoder::Binary(decode_co2));
        registry.register(MODEL_POOL, Decoder::Binary(decode_pool));
        registry.register(MODEL_DISPLAY_HUB, Decoder::Text(decode_display_hub));
        registry
    }

    /// Add or replace the decoder for `model`
    pub fn register(&mut self, model: impl Into<String>, decoder: Decoder) {
        self.decoders.insert(model.into(), decoder);
    }

    pub fn get(&self, model: &str) -> Option<&Decoder> {
        self.decoders.get(model)
    }

    /// `None` when no decoder is registered for `model`
    pub fn decode(&self, model: &str, raw: &str) -> Option<Result<Reading, PayloadError>> {
        self.get(model).map(|decoder| decoder.decode(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoding::readings::PoolReading;

    #[test]
    fn dispatches_by_model() {
        let registry = DecoderRegistry::with_builtin_models();
        let reading = registry
            .decode(MODEL_MOISTURE_SIMPLE, "10#E10500DC0188420001")
            .unwrap()
            .unwrap();
        assert_eq!(reading.kind(), "moisture_simple");

        let display = registry
            .decode(MODEL_DISPLAY_HUB, "1;T=20")
            .unwrap()
            .unwrap();
        assert_eq!(display.kind(), "display_hub");
    }

    #[test]
    fn unknown_model_is_none() {
        let registry = DecoderRegistry::with_builtin_models();
        assert!(registry.decode("HCS999XYZ", "10#E1").is_none());
    }

    #[test]
    fn binary_decoder_reports_format_error() {
        let registry = DecoderRegistry::with_builtin_models();
        assert!(matches!(
            registry.decode(MODEL_RAIN, "not-hex"),
            Some(Err(PayloadError::Format(_)))
        ));
    }

    #[test]
    fn register_extends_without_touching_builtins() {
        fn fixed(_: &[u8]) -> Result<Reading, PayloadError> {
            Ok(Reading::Pool(PoolReading::default()))
        }

        let mut registry = DecoderRegistry::with_builtin_models();
        registry.register("HCS-CUSTOM", Decoder::Binary(fixed));
        assert!(registry.decode("HCS-CUSTOM", "10#00").unwrap().is_ok());
        assert!(registry.get(MODEL_CO2).is_some());
    }
}
