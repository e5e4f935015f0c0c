pub mod decoders;
pub mod display;
pub mod payload;
pub mod readings;
pub mod registry;

pub use readings::Reading;
pub use registry::DecoderRegistry;
