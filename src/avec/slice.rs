//! Slice-based tag walk.

use either::Either::{Left, Right};
use thiserror::Error;

use crate::sans::{
    data::{Delimiter, Encoding, Raw, read_i16, read_u16, read_u32},
    table::{self, Rule},
};

use super::{FromTags, record::Label};

/// Errors ending a walk over a payload.
///
/// Fields decoded before the error stay decoded. Nothing past the failing
/// field is read.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Found a tag without a rule, so the width of its field is unknown.
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
    /// A string field is longer than the record attribute it is stored in.
    #[error("String {tag:#04x} of {len} bytes exceeds capacity of {capacity}.")]
    OversizedString { tag: u8, len: usize, capacity: usize },
}

/// Decode the fields of a payload, publishing to a receiver.
///
/// Byte 0 of the payload is the marker and is skipped. No frame checks are
/// applied; see [`crate::avec::uplink`] for decoding a received frame.
///
/// This method is also re-exported as `lorawan_lpp::avec::decode_slice`.
pub fn decode(r: &[u8], o: &mut impl FromTags) -> Result<(), Error> {
    walk(r, |rule, raw| {
        match raw {
            Raw::U8(x) => o.add_u8(rule.tag, x),
            Raw::U16(x) => o.add_u16(rule.tag, x),
            Raw::I16(x) => o.add_i16(rule.tag, x),
            Raw::U32(x) => o.add_u32(rule.tag, x),
            Raw::Bytes(b) => o.add_bytes(rule.tag, b),
        }

        Ok(())
    })
}

/// Walk the fields of a payload, calling `f` with each rule and raw payload.
///
/// Stops at the first error, including one returned by `f`.
pub(crate) fn walk<'a>(
    r: &'a [u8],
    mut f: impl FnMut(&'static Rule, Raw<'a>) -> Result<(), Error>,
) -> Result<(), Error> {
    let i = &mut 1; // Offset of the next tag. Offset 0 holds the marker.

    while let Some(&tag) = r.get(*i) {
        let offset = *i;

        let rule = table::lookup(tag).ok_or(Error::UnknownTag { tag, offset })?;

        *i += 1;

        let raw = read(rule, r, i)?.ok_or_else(|| Error::TruncatedField {
            tag,
            offset,
            needed: needed(rule.encoding, r, *i),
            remaining: r.len() - *i,
        })?;

        f(rule, raw)?;
    }

    Ok(())
}

/// Read the payload of a field starting at `i`, advancing `i` past it.
///
/// Returns `None` if the payload would extend past the end of the slice, in
/// which case `i` is left in place.
fn read<'a>(rule: &Rule, r: &'a [u8], i: &mut usize) -> Result<Option<Raw<'a>>, Error> {
    Ok(match rule.encoding {
        Encoding::U8 => take::<1>(r, i).map(|[x]| Raw::U8(x)),
        Encoding::U16 => take(r, i).map(|b| Raw::U16(read_u16(b))),
        Encoding::I16 => take(r, i).map(|b| Raw::I16(read_i16(b))),
        Encoding::U32 => take(r, i).map(|b| Raw::U32(read_u32(b))),
        Encoding::CStr => {
            let rest = r.get(*i..).unwrap_or_default();

            // Only strings stored on the record are bounded.
            match rest.iter().position(|&b| b == 0) {
                Some(len) if rule.target.is_some() && len > Label::CAPACITY => Err(Error::OversizedString {
                    tag: rule.tag,
                    len,
                    capacity: Label::CAPACITY,
                })?,
                Some(len) => {
                    *i += len + 1; // Skip the terminator too.
                    Some(Raw::Bytes(&rest[..len]))
                }
                None => None,
            }
        }
        Encoding::Prefixed => {
            let s = *i + 1;

            match r.get(*i).and_then(|&len| r.get(s..s + len as usize)) {
                Some(body) => {
                    *i = s + body.len();
                    Some(Raw::Bytes(body))
                }
                None => None,
            }
        }
    })
}

/// Number of bytes a field starting at `i` needs, for error reporting.
fn needed(encoding: Encoding, r: &[u8], i: usize) -> usize {
    match encoding.width() {
        Left(n) => n,
        // At least everything left, plus a terminator.
        Right(Delimiter::Nul) => r.len() - i + 1,
        Right(Delimiter::LengthByte) => r.get(i).map_or(1, |&len| len as usize + 1),
    }
}

/// Take an exact number of bytes from an offset in a slice, advancing the
/// offset only if they are all present.
fn take<const N: usize>(r: &[u8], i: &mut usize) -> Option<[u8; N]> {
    let s = *i;
    let bytes = r.get(s..s + N)?.try_into().ok()?;
    *i += N;

    Some(bytes)
}
