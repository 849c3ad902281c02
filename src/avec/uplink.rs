//! Decoding received uplinks into device records.

use thiserror::Error;
use tracing::{debug, debug_span, trace, warn};

use crate::{
    Config,
    sans::header::{self, FrameError},
};

use super::{
    environment::Environment,
    evaluate::evaluate,
    record::{DeviceRecord, Flags},
    slice,
    store::DeviceStore,
    summary::TelemetrySummary,
};

/// A received uplink, as handed over by the radio side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uplink<'a> {
    /// Slot of the sending device in the registry.
    pub slot: usize,
    /// Frame counter reported with the uplink.
    pub fcnt: u32,
    pub port: u8,
    pub confirmed: bool,
    pub payload: &'a [u8],
}

/// The outcome of decoding an uplink.
#[derive(Debug, Clone)]
pub struct Report<'a> {
    /// Fields seen in the uplink, for the notification side.
    pub summary: TelemetrySummary<'a>,
    /// Follow-up flags of the record after evaluation.
    pub flags: Flags,
}

/// Errors occurring while decoding an uplink.
///
/// None of these leave a record in an inconsistent state. A rejected frame or
/// an unknown slot changes nothing. An error during the walk keeps the fields
/// decoded before it, and skips evaluation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The frame failed the port or length check.
    #[error("Rejected frame: {0}")]
    RejectedFrame(#[from] FrameError),
    /// The registry holds no record in the slot.
    #[error("No device record in slot {0}.")]
    UnknownSlot(usize),
    /// Found a tag without a rule.
    #[error("Unknown tag {tag:#04x} at offset {offset}.")]
    UnknownTag { tag: u8, offset: usize },
    /// A field would extend past the end of the payload.
    #[error("Field {tag:#04x} at offset {offset} needs {needed} bytes, found {remaining}.")]
    TruncatedField {
        tag: u8,
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    /// A string field is longer than the record can store.
    #[error("String {tag:#04x} of {len} bytes exceeds capacity of {capacity}.")]
    OversizedString { tag: u8, len: usize, capacity: usize },
}

impl From<slice::Error> for Error {
    fn from(err: slice::Error) -> Self {
        match err {
            slice::Error::UnknownTag { tag, offset } => Self::UnknownTag { tag, offset },
            slice::Error::TruncatedField {
                tag,
                offset,
                needed,
                remaining,
            } => Self::TruncatedField {
                tag,
                offset,
                needed,
                remaining,
            },
            slice::Error::OversizedString { tag, len, capacity } => {
                Self::OversizedString { tag, len, capacity }
            }
        }
    }
}

/// Decode an uplink into the record of its device.
///
/// Each field is applied to the record as soon as it is decoded. Once every
/// field has been decoded, the follow-up flags are evaluated against values
/// from this uplink.
///
/// The caller must hold the only reference to `record` for the duration of the
/// call. See [`crate::avec::store`] for decoding uplinks concurrently.
pub fn decode<'a>(
    uplink: Uplink<'a>,
    record: &mut DeviceRecord,
    env: &mut impl Environment,
    config: &Config,
) -> Result<Report<'a>, Error> {
    let span = debug_span!(
        "uplink",
        slot = uplink.slot,
        fcnt = uplink.fcnt,
        confirmed = uplink.confirmed
    );
    let _enter = span.enter();

    if let Err(err) = header::check(uplink.port, uplink.payload, config.app_port) {
        warn!(%err, "rejected frame");
        return Err(err.into());
    }

    let mut summary = TelemetrySummary::default();

    let walked = slice::walk(uplink.payload, |rule, raw| {
        let value = rule.decode(raw);
        trace!(tag = rule.tag, name = rule.name, %value, "decoded field");

        record.apply(rule, &value);
        summary.push(rule, &raw, value);

        Ok(())
    });

    if let Err(err) = walked {
        warn!(dev_eui = %record.dev_eui, applied = summary.len(), %err, "aborted walk");
        return Err(err.into());
    }

    let flags = evaluate(uplink.slot, &mut summary, record, env, config);
    debug!(
        dev_eui = %record.dev_eui,
        fields = summary.len(),
        events = summary.events(),
        ?flags,
        "decoded uplink"
    );

    Ok(Report { summary, flags })
}

/// Decode an uplink into the record in its slot of a store.
pub fn decode_in<'a, S>(
    uplink: Uplink<'a>,
    store: &mut S,
    env: &mut impl Environment,
    config: &Config,
) -> Result<Report<'a>, Error>
where
    S: DeviceStore + ?Sized,
{
    if let Err(err) = header::check(uplink.port, uplink.payload, config.app_port) {
        warn!(slot = uplink.slot, %err, "rejected frame");
        return Err(err.into());
    }

    let Some(record) = store.record_mut(uplink.slot) else {
        warn!(slot = uplink.slot, "no device record");
        return Err(Error::UnknownSlot(uplink.slot));
    };

    decode(uplink, record, env, config)
}
