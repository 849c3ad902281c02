//! Wire primitives and the values decoded from them.

use core::fmt;

use either::Either::{self, Left, Right};
use zerocopy::byteorder::big_endian;

/// How a field's payload is laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// One byte.
    U8,
    /// Two bytes, big-endian, unsigned.
    U16,
    /// Two bytes, big-endian, two's complement.
    I16,
    /// Four bytes, big-endian, unsigned.
    U32,
    /// Bytes up to a NUL terminator, which is part of the field.
    CStr,
    /// A length byte followed by that many bytes.
    Prefixed,
}

/// How the end of a variable-width payload is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// Scan for a NUL byte.
    Nul,
    /// Read the first payload byte as the length of the rest.
    LengthByte,
}

impl Encoding {
    /// Width of a payload in this encoding: either a fixed number of bytes, or
    /// the way its end is found.
    pub fn width(self) -> Either<usize, Delimiter> {
        match self {
            Self::U8 => Left(1),
            Self::U16 | Self::I16 => Left(2),
            Self::U32 => Left(4),
            Self::CStr => Right(Delimiter::Nul),
            Self::Prefixed => Right(Delimiter::LengthByte),
        }
    }
}

/// A field payload as read from the wire, before interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Raw<'a> {
    U8(u8),
    U16(u16),
    I16(i16),
    U32(u32),
    /// String contents without terminator, or the body of a prefixed field.
    Bytes(&'a [u8]),
}

impl Raw<'_> {
    /// The raw value widened to an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Self::U8(x) => Some(x.into()),
            Self::U16(x) => Some(x.into()),
            Self::I16(x) => Some(x.into()),
            Self::U32(x) => Some(x.into()),
            Self::Bytes(_) => None,
        }
    }
}

macro_rules! read_be {
    ($name:ident, $wire:ty, $into:ty, $n:literal, $(#[$attr:meta])*) => {
        $(#[$attr])*
        pub fn $name(r: [u8; $n]) -> $into {
            let x: $wire = zerocopy::transmute!(r);
            x.get()
        }
    };
}

read_be!(read_u16, big_endian::U16, u16, 2, /** Read a big-endian `u16`. */);
read_be!(read_i16, big_endian::I16, i16, 2, /** Read a big-endian `i16`. */);
read_be!(read_u32, big_endian::U32, u32, 4, /** Read a big-endian `u32`. */);

/// Decimal scaling of an integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    /// The raw value is divided by this to get the physical value.
    pub divisor: u32,
    /// Number of decimals shown when formatting.
    pub decimals: u8,
}

impl Scale {
    pub const fn new(divisor: u32, decimals: u8) -> Self {
        Self { divisor, decimals }
    }

    /// Convert a physical value back to the nearest raw value.
    pub fn raw_from(self, value: f64) -> i64 {
        let x = value * self.divisor as f64;

        // `f64::round` is unavailable without `std`.
        if x >= 0.0 {
            (x + 0.5) as i64
        } else {
            (x - 0.5) as i64
        }
    }
}

/// A raw integer paired with its scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scaled {
    pub raw: i64,
    pub scale: Scale,
}

impl Scaled {
    /// The physical value.
    pub fn value(&self) -> f64 {
        self.raw as f64 / self.scale.divisor as f64
    }

    /// The same quantity expressed as an integer count of `1 / divisor` units.
    ///
    /// A temperature sent in tenths of a degree is `rescale(100)` centi-degrees.
    pub fn rescale(&self, divisor: u32) -> i64 {
        self.raw * i64::from(divisor) / i64::from(self.scale.divisor)
    }
}

impl fmt::Display for Scaled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", self.scale.decimals as usize, self.value())
    }
}

/// How a field's raw payload is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// An integer taken as is.
    Raw,
    /// An integer in fixed-point units.
    Scaled(Scale),
    /// An integer where any non-zero value means `true`.
    Flag,
    /// A string.
    Text,
    /// Bytes without a known meaning.
    Opaque,
}

impl Kind {
    /// Interpret a raw payload.
    pub fn interpret(self, raw: Raw<'_>) -> Value<'_> {
        match (self, raw) {
            (Self::Text, Raw::Bytes(s)) => Value::Text(s),
            (_, Raw::Bytes(b)) => Value::Opaque(b),
            (Self::Scaled(scale), raw) => Value::Scaled(Scaled {
                raw: raw.as_int().unwrap_or_default(),
                scale,
            }),
            (Self::Flag, raw) => Value::Flag(raw.as_int() != Some(0)),
            (_, Raw::I16(x)) => Value::Signed(x.into()),
            (_, Raw::U8(x)) => Value::Unsigned(x.into()),
            (_, Raw::U16(x)) => Value::Unsigned(x.into()),
            (_, Raw::U32(x)) => Value::Unsigned(x),
        }
    }
}

/// A decoded field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Unsigned(u32),
    Signed(i32),
    Scaled(Scaled),
    Flag(bool),
    Text(&'a [u8]),
    Opaque(&'a [u8]),
}

impl Default for Value<'_> {
    fn default() -> Self {
        Self::Opaque(&[])
    }
}

impl<'a> Value<'a> {
    /// The value as an unsigned integer, if it is a non-negative integer.
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Self::Unsigned(x) => Some(x),
            Self::Signed(x) => u32::try_from(x).ok(),
            Self::Scaled(s) => u32::try_from(s.raw).ok(),
            Self::Flag(b) => Some(b.into()),
            Self::Text(_) | Self::Opaque(_) => None,
        }
    }

    /// The value as a flag, if it is one.
    pub fn as_flag(&self) -> Option<bool> {
        match *self {
            Self::Flag(b) => Some(b),
            _ => None,
        }
    }

    /// The value's bytes, if it is a string or opaque.
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match *self {
            Self::Text(b) | Self::Opaque(b) => Some(b),
            _ => None,
        }
    }

    /// The value as a string slice, if it is valid UTF-8 text.
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Self::Text(b) => core::str::from_utf8(b).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(x) => write!(f, "{x}"),
            Self::Signed(x) => write!(f, "{x}"),
            Self::Scaled(s) => write!(f, "{s}"),
            Self::Flag(b) => write!(f, "{}", u8::from(*b)),
            Self::Text(b) => match core::str::from_utf8(b) {
                Ok(s) => f.write_str(s),
                Err(_) => write_hex(f, b),
            },
            Self::Opaque(b) => write_hex(f, b),
        }
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, b: &[u8]) -> fmt::Result {
    b.iter().try_for_each(|x| write!(f, "{x:02x}"))
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Self::Unsigned(x) => serializer.serialize_u32(x),
            Self::Signed(x) => serializer.serialize_i32(x),
            Self::Scaled(s) => serializer.serialize_f64(s.value()),
            Self::Flag(b) => serializer.serialize_bool(b),
            Self::Text(b) => match core::str::from_utf8(b) {
                Ok(s) => serializer.serialize_str(s),
                Err(_) => serializer.serialize_bytes(b),
            },
            Self::Opaque(b) => serializer.serialize_bytes(b),
        }
    }
}
