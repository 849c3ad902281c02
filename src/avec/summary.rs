//! Values seen in a single uplink.

use core::fmt;

use tinyvec::ArrayVec;
use tracing::warn;

use crate::sans::{
    data::{Raw, Scaled, Value},
    header::MAX_PAYLOAD_LEN,
    model,
    table::{self, Attribute, Rule},
};

/// Most fields a payload can hold: every field takes at least two bytes.
const MAX_ENTRIES: usize = MAX_PAYLOAD_LEN / 2 + 1;

/// A field seen in an uplink.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Entry<'a> {
    pub tag: u8,
    pub value: Value<'a>,
}

impl Entry<'_> {
    /// The rule the field was decoded with.
    pub fn rule(&self) -> Option<&'static Rule> {
        table::lookup(self.tag)
    }

    pub fn name(&self) -> &'static str {
        self.rule().map_or("unknown", |r| r.name)
    }
}

impl fmt::Display for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name(), self.value)
    }
}

/// The fields decoded from one uplink, in order, with the number of
/// alarm-worthy events among them.
///
/// A summary borrows string and opaque fields from the payload it was decoded
/// from. Attributes are not carried over between uplinks; only what this
/// uplink contained is visible here.
#[derive(Debug, Clone, Default)]
pub struct TelemetrySummary<'a> {
    entries: ArrayVec<[Entry<'a>; MAX_ENTRIES]>,
    events: u32,
}

impl<'a> TelemetrySummary<'a> {
    /// Add a decoded field, counting it if it is an event.
    pub(crate) fn push(&mut self, rule: &Rule, raw: &Raw<'_>, value: Value<'a>) {
        if rule.event.counts(raw) {
            self.events += 1;
        }

        let entry = Entry {
            tag: rule.tag,
            value,
        };

        if self.entries.try_push(entry).is_some() {
            warn!(tag = rule.tag, "summary is full, dropping field");
        }
    }

    /// Count an event decided after the walk.
    pub(crate) fn add_event(&mut self) {
        self.events += 1;
    }

    /// Number of alarm-worthy events in this uplink.
    pub fn events(&self) -> u32 {
        self.events
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fields in the order they were decoded.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<'a>> {
        self.entries.iter()
    }

    /// The last value decoded for a tag.
    pub fn get(&self, tag: u8) -> Option<Value<'a>> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.tag == tag)
            .map(|e| e.value)
    }

    /// The last value decoded for any tag targeting an attribute.
    pub fn latest(&self, attribute: Attribute) -> Option<Value<'a>> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.rule().and_then(|r| r.target) == Some(attribute))
            .map(|e| e.value)
    }

    pub fn model(&self) -> Option<&'static str> {
        let code = self.latest(Attribute::Model)?.as_u32()?;
        model::name(u8::try_from(code).ok()?)
    }

    /// Battery voltage, in volts once scaled.
    pub fn battery_voltage(&self) -> Option<Scaled> {
        self.scaled(Attribute::BatteryMillivolts)
    }

    /// Temperature, in degrees Celsius once scaled.
    pub fn temperature(&self) -> Option<Scaled> {
        self.scaled(Attribute::Temperature)
    }

    /// Relative humidity, in percent once scaled.
    pub fn humidity(&self) -> Option<Scaled> {
        self.scaled(Attribute::Humidity)
    }

    /// Reported heartbeat interval in seconds, if reported and non-zero.
    pub fn heartbeat_interval(&self) -> Option<u32> {
        self.latest(Attribute::Heartbeat)?
            .as_u32()
            .filter(|&x| x != 0)
    }

    /// Device local time in seconds.
    ///
    /// A reported time of 0 reads as 1, so that a device with an unset clock
    /// is still checked for drift.
    pub fn local_time(&self) -> Option<u32> {
        self.latest(Attribute::LocalTime)?.as_u32().map(|x| x.max(1))
    }

    pub fn downlink_count(&self) -> Option<u32> {
        self.latest(Attribute::DownlinkCount)?.as_u32()
    }

    /// Smoke alarm state, from either the event or the state field.
    pub fn smoke(&self) -> Option<bool> {
        self.latest(Attribute::Smoke)?.as_flag()
    }

    /// Gas alarm state, from either the event or the state field.
    pub fn gas(&self) -> Option<bool> {
        self.latest(Attribute::Gas)?.as_flag()
    }

    pub fn infrared(&self) -> Option<bool> {
        self.latest(Attribute::Infrared)?.as_flag()
    }

    pub fn button(&self) -> Option<u32> {
        self.latest(Attribute::Button)?.as_u32()
    }

    pub fn sos(&self) -> Option<u32> {
        self.latest(Attribute::Sos)?.as_u32()
    }

    fn scaled(&self, attribute: Attribute) -> Option<Scaled> {
        match self.latest(attribute)? {
            Value::Scaled(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TelemetrySummary<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len() + 1))?;
        for entry in self.entries.iter() {
            map.serialize_entry(entry.name(), &entry.value)?;
        }
        map.serialize_entry("events", &self.events)?;
        map.end()
    }
}
