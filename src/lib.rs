//! Poller for the HomGar cloud: keeps a session token alive, fetches hub
//! status and decodes the binary sub-device payloads into typed readings.

pub mod cloud;
pub mod config;
pub mod decoding;
pub mod error;
pub mod models;
pub mod poller;
pub mod utils;
