#![no_std]

//! A decoder for the tag-keyed application payload carried in LoRaWAN uplinks
//! from a family of security and environment sensors.
//!
//! Each payload is a leading marker byte followed by self-describing fields: a
//! one-byte tag, then a payload whose width is fixed by the tag (a big-endian
//! integer, a NUL-terminated string, or a length-prefixed blob). There is no
//! generic length field, so an unknown tag ends decoding.
//!
//! Most users should begin with [`avec::uplink::decode`], which walks a payload
//! into a device's [`DeviceRecord`](avec::record::DeviceRecord), collects a
//! [`TelemetrySummary`](avec::summary::TelemetrySummary) and evaluates the
//! follow-up flags (interval re-send, time sync, clear-voice). To extract
//! values without any device state, implement or derive
//! [`FromTags`](avec::FromTags) and use [`avec::decode_slice`]. The field
//! catalog itself lives in the [`sans`] module.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).
//! - `std`: enable the system clock environment and environment-based
//!   configuration (default).
//! - `serde`: implement `Serialize` and `Deserialize` for configuration, device
//!   records and summaries.

pub mod avec;
pub mod config;
pub mod sans;

pub use config::Config;
