//! Per-device state updated by decoded fields.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tinyvec::ArrayVec;
use tracing::warn;
use zerocopy::TryFromBytes;

use crate::sans::{
    data::Value,
    model,
    table::{Attribute, Rule},
};

/// A short string of fixed capacity, such as a model name or firmware version.
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Label(ArrayVec<[u8; LABEL_CAPACITY]>);

const LABEL_CAPACITY: usize = 32;

impl Label {
    /// Maximum length in bytes.
    pub const CAPACITY: usize = LABEL_CAPACITY;

    /// Replace the contents.
    ///
    /// Returns `false` and keeps the old contents if `s` is longer than
    /// [`Label::CAPACITY`].
    pub fn set(&mut self, s: &[u8]) -> bool {
        if s.len() > Self::CAPACITY {
            return false;
        }

        self.0.clear();
        self.0.extend_from_slice(s);
        true
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The label as a string slice, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.0).ok()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "{s:?}"),
            None => write!(f, "{:?}", self.as_bytes()),
        }
    }
}

/// An 8-byte device EUI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DevEui(pub [u8; 8]);

impl fmt::Display for DevEui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

/// Kind of device, assigned by the registry, selecting follow-up behavior.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, TryFromBytes)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeviceType {
    #[default]
    Undefined = 0,
    Smoke = 1,
    Infrared = 2,
    DoorSensor = 3,
    Gas = 4,
    Sos = 5,
    Doorbell = 6,
    SmartButton = 7,
    TemperatureHumidity = 8,
    TemperatureHumidityScreen = 9,
    TemperatureHumidityAn303 = 10,
    Flood = 11,
}

impl DeviceType {
    /// Convert a registry code into a device type.
    pub fn from_code(code: u8) -> Option<Self> {
        zerocopy::try_transmute!(code).ok()
    }
}

/// Progress of reconciling a device's reported interval with a commanded one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IntervalState {
    #[default]
    Unset,
    /// The device reported an interval other than the commanded one.
    Checking,
    /// The device reported the commanded interval.
    Ok,
}

/// The state kept for one device.
///
/// Records are owned by the registry. Decoding borrows one record for the
/// duration of a call, and only overwrites attributes carried by the uplink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceRecord {
    pub dev_eui: DevEui,
    pub device_type: DeviceType,

    pub model: Label,
    pub boot_version: Label,
    pub main_version: Label,
    pub app_version: Label,
    pub hardware_version: Label,

    /// Downlink frame count last acknowledged by the device.
    pub downlink_count: u32,

    pub tamper: bool,
    pub door: bool,
    pub smoke: bool,
    pub gas: bool,
    pub flood: bool,
    pub infrared: bool,

    pub battery_millivolts: u16,
    pub battery_state: u8,
    /// Battery charge in percent.
    pub battery_level: u8,

    /// Centi-degrees Celsius.
    pub temperature: i32,
    pub temperature_state: u8,
    /// Per-mille relative humidity.
    pub humidity: u16,
    pub humidity_state: u8,

    pub sensor_state: u8,
    pub flood_soaking_minutes: u16,
    pub liquid_level: u16,
    pub liquid_level_state: u8,
    pub radar_distance: u32,

    /// Interval reported by the device, in seconds.
    pub uplink_interval: u32,
    /// Interval last commanded to the device, or 0 once confirmed.
    pub downlink_interval: u32,
    pub interval_state: IntervalState,

    pub needs_interval_resend: bool,
    pub needs_time_sync: bool,
    pub needs_clear_voice: bool,
}

impl DeviceRecord {
    pub fn new(dev_eui: DevEui, device_type: DeviceType) -> Self {
        Self {
            dev_eui,
            device_type,
            ..Default::default()
        }
    }

    /// Apply a decoded field to its target attribute.
    ///
    /// Fields without a target, and targets reconciled after the walk
    /// (heartbeat and local time), leave the record untouched.
    pub fn apply(&mut self, rule: &Rule, value: &Value<'_>) {
        let Some(target) = rule.target else {
            return;
        };

        let flag = || value.as_flag().unwrap_or_default();
        let int = || value.as_u32().unwrap_or_default();
        let byte = || u8::try_from(int()).unwrap_or(u8::MAX);
        let half = || u16::try_from(int()).unwrap_or(u16::MAX);
        let text = || value.as_bytes().unwrap_or_default();

        match target {
            Attribute::Model => match model::name(byte()) {
                Some(name) => {
                    self.model.set(name.as_bytes());
                }
                None => warn!(dev_eui = %self.dev_eui, code = int(), "unknown model code"),
            },
            Attribute::DownlinkCount => {
                if int() != 0 {
                    self.downlink_count = int();
                }
            }
            Attribute::Tamper => self.tamper = flag(),
            Attribute::Door => self.door = flag(),
            Attribute::Smoke => self.smoke = flag(),
            Attribute::Gas => self.gas = flag(),
            Attribute::Flood => self.flood = flag(),
            Attribute::Infrared => self.infrared = flag(),

            Attribute::BatteryMillivolts => self.battery_millivolts = half(),
            Attribute::BatteryState => self.battery_state = byte(),
            Attribute::BatteryLevel => self.battery_level = byte(),

            Attribute::BootVersion
            | Attribute::MainVersion
            | Attribute::AppVersion
            | Attribute::HardwareVersion => {
                let dev_eui = self.dev_eui;
                let label = match target {
                    Attribute::BootVersion => &mut self.boot_version,
                    Attribute::MainVersion => &mut self.main_version,
                    Attribute::AppVersion => &mut self.app_version,
                    _ => &mut self.hardware_version,
                };
                if !label.set(text()) {
                    warn!(%dev_eui, tag = rule.tag, len = text().len(), "string too long");
                }
            }

            Attribute::Temperature => {
                if let Value::Scaled(t) = value {
                    self.temperature = t.rescale(100) as i32;
                }
            }
            Attribute::TemperatureState => self.temperature_state = byte(),
            Attribute::Humidity => {
                if let Value::Scaled(h) = value {
                    self.humidity = h.rescale(10) as u16;
                }
            }
            Attribute::HumidityState => self.humidity_state = byte(),

            Attribute::SensorState => self.sensor_state = byte(),
            Attribute::FloodSoakingTime => self.flood_soaking_minutes = half(),
            Attribute::LiquidLevel => self.liquid_level = half(),
            Attribute::LiquidLevelState => self.liquid_level_state = byte(),
            Attribute::RadarDistance => self.radar_distance = int(),

            Attribute::Heartbeat | Attribute::LocalTime | Attribute::Sos | Attribute::Button => {}
        }
    }

    /// The flags raised on this record.
    pub fn flags(&self) -> Flags {
        Flags {
            interval_resend: self.needs_interval_resend,
            time_sync: self.needs_time_sync,
            clear_voice: self.needs_clear_voice,
        }
    }
}

/// Follow-up actions a device needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Flags {
    /// Send the commanded interval again.
    pub interval_resend: bool,
    /// Send the current time.
    pub time_sync: bool,
    /// Broadcast the alarm-clear voice.
    pub clear_voice: bool,
}
