//! Decoding into receivers and device state.
//!
//! The [`uplink`] module is the main entry point: it checks a frame, walks its
//! fields into a [`DeviceRecord`](record::DeviceRecord), and evaluates the
//! follow-up flags once the walk completes.
//!
//! For extracting values without any device state, [`decode_slice`] walks a
//! payload and publishes every field to a [`FromTags`] receiver. In many cases
//! the receiver can be derived. See the [`FromTags`](macro@FromTags) macro for
//! details.

pub mod environment;
pub mod evaluate;
pub mod record;
pub mod slice;
pub mod store;
pub mod summary;
pub mod uplink;

pub use slice::decode as decode_slice;

/// Derive [`FromTags`] for a struct collecting field values.
///
/// _Requires Cargo feature `derive`._
///
/// # Examples
///
/// To receive a single value for a tag, add the `tag(N)` attribute to an
/// `Option<T>` struct field, where `N` is the tag and `T` is the primitive the
/// tag is encoded as (`u8`, `u16`, `i16` or `u32`). Several tags carrying the
/// same quantity can share a field. Later values overwrite earlier ones.
///
/// ```
/// #[derive(Debug, Default, FromTags)]
/// struct Climate {
///     #[tag(0x10)]
///     temperature: Option<i16>,
///     #[tag(0x12)]
///     humidity: Option<u16>,
///     #[tag(0x31, 0x84)]
///     smoke: Option<u8>,
/// }
/// ```
///
/// Rather than decoding directly into domain types, it's recommended to store
/// the received primitives and scale them afterward in an accessor.
///
/// ```
/// impl Climate {
///     fn temperature_celsius(&self) -> Option<f32> {
///         self.temperature.map(|t| t as f32 / 100.0)
///     }
/// }
/// ```
///
/// Strings and length-prefixed fields are published as `&[u8]` and must be
/// copied out by an accumulator closure, whose second argument is typed.
///
/// ```
/// #[derive(Debug, Default, FromTags)]
/// struct Firmware {
///     #[tag(0x07, |v, s: &[u8]| *v = s.to_vec())]
///     main_version: Vec<u8>,
/// }
/// ```
#[cfg(feature = "derive")]
pub use lorawan_lpp_derive::FromTags;

/// Receive field values from a payload.
///
/// Values are published as the primitive the tag is encoded as, before any
/// scaling. Strings arrive without their terminator, and length-prefixed
/// fields without their length byte.
///
/// The default implementation of each method ignores received values.
///
/// See the [`FromTags`](macro@FromTags) derive macro for an automatic
/// implementation of this trait.
#[allow(unused_variables)]
pub trait FromTags {
    /// Add a `u8` for a tag.
    ///
    /// This method receives flags and states as well as small counts.
    fn add_u8(&mut self, tag: u8, _: u8) {}
    /// Add a `u16` for a tag.
    fn add_u16(&mut self, tag: u8, _: u16) {}
    /// Add an `i16` for a tag.
    fn add_i16(&mut self, tag: u8, _: i16) {}
    /// Add a `u32` for a tag.
    fn add_u32(&mut self, tag: u8, _: u32) {}
    /// Add the bytes of a string or length-prefixed field for a tag.
    fn add_bytes(&mut self, tag: u8, _: &[u8]) {}
}
