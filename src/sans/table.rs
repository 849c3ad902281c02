//! The field catalog: one decoding rule per known tag.

use super::data::{Encoding, Kind, Raw, Scale, Value};

/// A device record attribute updated by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Model,
    DownlinkCount,
    Tamper,
    BatteryMillivolts,
    BatteryState,
    BatteryLevel,
    BootVersion,
    MainVersion,
    AppVersion,
    HardwareVersion,
    Temperature,
    TemperatureState,
    Humidity,
    HumidityState,
    Gas,
    Infrared,
    SensorState,
    Flood,
    FloodSoakingTime,
    Door,
    Smoke,
    LiquidLevel,
    LiquidLevelState,
    RadarDistance,
    /// Reported uplink interval, reconciled after the walk.
    Heartbeat,
    /// Device clock, checked for drift after the walk.
    LocalTime,
    /// Not stored on the record; read by follow-up logic from the summary.
    Sos,
    /// Not stored on the record. Presses count as events only on button
    /// devices, which the follow-up logic decides.
    Button,
}

/// When a field counts as an alarm-worthy event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Never,
    Always,
    /// Only when the raw value is exactly 1.
    WhenOne,
}

impl Event {
    /// Whether a field with this raw value counts as an event.
    pub fn counts(self, raw: &Raw<'_>) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::WhenOne => raw.as_int() == Some(1),
        }
    }
}

/// The decoding rule for a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub tag: u8,
    /// Stable snake-case field name.
    pub name: &'static str,
    pub encoding: Encoding,
    pub kind: Kind,
    /// Record attribute this field updates, if any.
    pub target: Option<Attribute>,
    pub event: Event,
}

impl Rule {
    /// Interpret a raw payload read with this rule's encoding.
    pub fn decode<'a>(&self, raw: Raw<'a>) -> Value<'a> {
        self.kind.interpret(raw)
    }
}

/// Look up the rule for a tag.
pub fn lookup(tag: u8) -> Option<&'static Rule> {
    RULES
        .binary_search_by_key(&tag, |r| r.tag)
        .ok()
        .map(|i| &RULES[i])
}

const RAW: Kind = Kind::Raw;
const FLAG: Kind = Kind::Flag;
const TEXT: Kind = Kind::Text;
const OPAQUE: Kind = Kind::Opaque;
/// Thousandths, shown with two decimals (millivolts as volts).
const MILLI: Kind = Kind::Scaled(Scale::new(1000, 2));
/// Hundredths, shown with one decimal.
const CENTI: Kind = Kind::Scaled(Scale::new(100, 1));
/// Tenths, shown with one decimal.
const DECI: Kind = Kind::Scaled(Scale::new(10, 1));

macro_rules! target {
    (-) => {
        None
    };
    ($attribute:ident) => {
        Some(Attribute::$attribute)
    };
}

macro_rules! rules {
    ($($tag:literal => $name:ident, $encoding:ident, $kind:ident, $target:tt, $event:ident;)*) => {
        /// Every known rule, sorted by tag.
        pub static RULES: &[Rule] = &[
            $(Rule {
                tag: $tag,
                name: stringify!($name),
                encoding: Encoding::$encoding,
                kind: $kind,
                target: target!($target),
                event: Event::$event,
            },)*
        ];
    };
}

rules! {
    0x01 => model, U8, RAW, Model, Never;
    0x02 => downlink_count, U32, RAW, DownlinkCount, Never;
    0x03 => tamper_event, U8, FLAG, Tamper, Always;
    0x04 => battery_voltage, U16, MILLI, BatteryMillivolts, Never;
    0x05 => battery_state, U8, RAW, BatteryState, WhenOne;
    0x06 => boot_version, CStr, TEXT, BootVersion, Never;
    0x07 => main_version, CStr, TEXT, MainVersion, Never;
    0x08 => app_version, CStr, TEXT, AppVersion, Never;
    0x09 => hardware_version, CStr, TEXT, HardwareVersion, Never;
    0x0a => p2p_update_frequency, U32, RAW, -, Never;
    0x0b => p2p_config_frequency, U32, RAW, -, Never;
    0x0c => radio_chip, CStr, TEXT, -, Never;
    0x0d => reset_cause, CStr, TEXT, -, Never;
    0x0e => lorawan_region, CStr, TEXT, -, Never;
    0x0f => at_response, CStr, TEXT, -, Never;
    0x10 => temperature, I16, CENTI, Temperature, Never;
    0x11 => temperature_event, U8, RAW, TemperatureState, Never;
    0x12 => humidity, U16, DECI, Humidity, Never;
    0x13 => humidity_event, U8, RAW, HumidityState, Never;
    0x14 => sos, U8, RAW, Sos, Always;
    0x15 => gas_concentration, U16, RAW, -, Never;
    0x16 => gas_state, U8, FLAG, Gas, Always;
    0x17 => infrared_state, U8, FLAG, Infrared, Always;
    0x18 => magnet_state, U8, RAW, -, Never;
    0x19 => brightness_state, U8, RAW, -, Never;
    0x1a => dc_voltage, U16, RAW, -, Never;
    0x1b => sensor_state, U8, RAW, SensorState, Never;
    0x1c => button_state, U8, RAW, Button, Never;
    0x1d => gas_concentration_state, U8, FLAG, Gas, Always;
    0x1e => noxious_gas_state, U8, RAW, -, Never;
    0x1f => oxygen_state, U8, RAW, -, Never;
    0x20 => oxygen_concentration, U8, RAW, -, Never;
    0x21 => flood_state, U8, FLAG, Flood, Always;
    0x22 => cloud_circuit_breaker, U8, RAW, -, Never;
    0x23 => noxious_gas_concentration, U8, RAW, -, Never;
    0x24 => door_event, U8, FLAG, Door, Always;
    0x25 => switch_address, U8, RAW, -, Never;
    0x26 => switch_type, U8, RAW, -, Never;
    0x27 => line_voltage, U16, RAW, -, Never;
    0x28 => leakage_current, U16, RAW, -, Never;
    0x29 => line_power, U16, RAW, -, Never;
    0x2a => line_current, U16, RAW, -, Never;
    0x2b => breaker_alarm, U16, RAW, -, Never;
    0x2c => power_consumption, U32, RAW, -, Never;
    0x2e => breaker_control, U8, RAW, -, Never;
    0x2f => switch_quantity, U8, RAW, -, Never;
    0x30 => error_code, U8, RAW, -, Never;
    0x31 => smoke_event, U8, FLAG, Smoke, Always;
    0x32 => smoke_alarm_status, U8, RAW, -, Never;
    0x3b => smoke_alarm_status_alt, U8, RAW, -, Never;
    0x6d => packet_type, U8, RAW, -, Never;
    0x72 => irda_count, U16, RAW, -, Never;
    0x73 => soaking_duration, U16, RAW, FloodSoakingTime, Never;
    0x74 => smoke_blue_pa, U16, RAW, -, Never;
    0x75 => smoke_red_pa, U16, RAW, -, Never;
    0x76 => door_state, U8, FLAG, Door, Never;
    0x77 => tamper_state, U8, FLAG, Tamper, Never;
    0x78 => heartbeat_interval, U32, RAW, Heartbeat, Never;
    0x79 => local_time, U32, RAW, LocalTime, Never;
    0x7a => methane, U16, RAW, -, Never;
    0x7b => so2, U16, RAW, -, Never;
    0x7c => no2, U16, RAW, -, Never;
    0x7d => battery_voltage_state, U8, RAW, BatteryState, Never;
    0x7e => power_down, U8, RAW, -, Never;
    0x7f => adc, U16, RAW, -, Never;
    0x80 => liquid_level, U16, RAW, LiquidLevel, Never;
    0x81 => liquid_level_event, U8, RAW, -, Never;
    0x82 => self_check, U8, RAW, -, Never;
    0x83 => mute, U8, RAW, -, Never;
    0x84 => smoke_state, U8, FLAG, Smoke, Never;
    0x85 => wet_state, U8, FLAG, Flood, Never;
    0x86 => bell_state, U8, RAW, -, Never;
    0x87 => backlight_state, U8, RAW, -, Never;
    0x88 => countdown, U8, RAW, -, Never;
    0x89 => timer, U8, RAW, -, Never;
    0x8a => formaldehyde, U16, RAW, -, Never;
    0x8b => air_quality, U8, RAW, -, Never;
    0x8c => temperature_alarm_setting, U8, RAW, -, Never;
    0x8f => rs485_channel, U8, RAW, -, Never;
    0x90 => ble_beacon_id, U32, RAW, -, Never;
    0x91 => ble_rssi_1m, U8, RAW, -, Never;
    0x92 => ble_rssi, U8, RAW, -, Never;
    0x93 => battery_percentage, U8, RAW, BatteryLevel, Never;
    0x94 => rs485_address, U8, RAW, -, Never;
    0x95 => modbus_data, Prefixed, OPAQUE, -, Never;
    0x96 => switch_lock_state, U8, RAW, -, Never;
    0x97 => rms_voltage, U16, RAW, -, Never;
    0x98 => rms_current, U16, RAW, -, Never;
    0x99 => active_power, U16, RAW, -, Never;
    0x9a => electric_energy, U32, RAW, -, Never;
    0x9b => liquid_level_state, U8, RAW, LiquidLevelState, Never;
    0x9c => pressure_state, U8, RAW, -, Never;
    0x9d => h2s, U16, RAW, -, Never;
    0x9e => nh4, U16, RAW, -, Never;
    0x9f => hcho, U16, RAW, -, Never;
    0xa0 => tvoc, U16, RAW, -, Never;
    0xa2 => acceleration_delta, U16, RAW, -, Never;
    0xa3 => acceleration, U16, RAW, -, Never;
    0xa4 => acceleration_x, U16, RAW, -, Never;
    0xa5 => acceleration_y, U16, RAW, -, Never;
    0xa6 => acceleration_z, U16, RAW, -, Never;
    0xa7 => acceleration_attribute, U8, RAW, -, Never;
    0xa8 => acceleration_event, U8, RAW, -, Never;
    0xa9 => temperature_warning, U8, RAW, TemperatureState, Never;
    0xaa => temperature_deci, I16, DECI, Temperature, Never;
    0xab => command_response, U16, RAW, -, Never;
    0xac => water_hammer_attribute, U8, RAW, -, Never;
    0xad => water_hammer_duration, U32, RAW, -, Never;
    0xae => water_hammer_event, U8, RAW, -, Never;
    0xb9 => radar_distance, U32, RAW, RadarDistance, Never;
}
