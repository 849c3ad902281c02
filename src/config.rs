//! Tunables of the decoder.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// LoRaWAN port carrying the tagged payload.
    pub app_port: u8,
    /// Offset of device local time from UTC, in seconds.
    pub utc_offset_secs: i64,
    /// Largest clock drift tolerated before a time sync is requested.
    pub drift_threshold_secs: u64,
    /// Window after a clear-voice broadcast during which alarming devices are
    /// flagged for it.
    pub clear_voice_cooldown_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_port: 210,
            utc_offset_secs: 8 * 60 * 60,
            drift_threshold_secs: 5,
            clear_voice_cooldown_secs: 60,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(1..=223).contains(&self.app_port) {
            return Err("app_port must be a LoRaWAN application port (1..=223)");
        }
        if self.clear_voice_cooldown_secs == 0 {
            return Err("clear_voice_cooldown_secs must be > 0");
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
mod std_env {
    extern crate std;

    use core::str::FromStr;
    use std::env;

    use super::Config;

    /// Parse a variable, falling back to `default` when it is unset or empty.
    fn env_or_default<T: FromStr>(
        key: &str,
        default: T,
        invalid: &'static str,
    ) -> Result<T, &'static str> {
        match env::var(key).ok().filter(|v| !v.is_empty()) {
            Some(v) => v.trim().parse().map_err(|_| invalid),
            None => Ok(default),
        }
    }

    impl Config {
        /// Read the configuration from `LPP_*` environment variables.
        ///
        /// _Requires Cargo feature `std`._
        pub fn from_env() -> Result<Self, &'static str> {
            let default = Self::default();
            let config = Self {
                app_port: env_or_default(
                    "LPP_APP_PORT",
                    default.app_port,
                    "LPP_APP_PORT must be an integer in 0..=255",
                )?,
                utc_offset_secs: env_or_default(
                    "LPP_UTC_OFFSET_SECS",
                    default.utc_offset_secs,
                    "LPP_UTC_OFFSET_SECS must be an integer",
                )?,
                drift_threshold_secs: env_or_default(
                    "LPP_DRIFT_THRESHOLD_SECS",
                    default.drift_threshold_secs,
                    "LPP_DRIFT_THRESHOLD_SECS must be a non-negative integer",
                )?,
                clear_voice_cooldown_secs: env_or_default(
                    "LPP_CLEAR_VOICE_COOLDOWN_SECS",
                    default.clear_voice_cooldown_secs,
                    "LPP_CLEAR_VOICE_COOLDOWN_SECS must be a non-negative integer",
                )?,
            };
            config.validate()?;
            Ok(config)
        }
    }
}
