//! Pure building blocks for decoding payloads.
//!
//! Nothing in this module touches device state. It answers three questions:
//!
//! - Is this frame a candidate for decoding at all? See [`header`].
//! - How wide is the field behind a tag, and what does it mean? See [`table`].
//! - How are the raw bytes of a field turned into a value? See [`data`].
//!
//! # Wire format
//!
//! Byte 0 of a payload is a marker and is never tag-decoded. From offset 1,
//! fields follow back to back:
//!
//! ```text
//! +-----+----------------------------+-----+-----------------
//! | tag | payload (width set by tag) | tag | payload ...
//! +-----+----------------------------+-----+-----------------
//! ```
//!
//! Widths are one of: a fixed number of big-endian bytes, a NUL-terminated
//! string (terminator included in the field), or a length byte followed by
//! that many bytes. A tag missing from the [`table`] cannot be skipped, since
//! its width is unknown, and decoding must stop there.

pub mod data;
pub mod header;
pub mod model;
pub mod table;

pub use table::lookup;
