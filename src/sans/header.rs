//! Frame-level preconditions checked before any field is decoded.

use thiserror::Error;

/// Largest application payload a single uplink can carry.
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Smallest payload holding a marker byte and one field.
pub const MIN_PAYLOAD_LEN: usize = 3;

/// An error rejecting a frame before decoding starts.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The frame arrived on a port other than the application port.
    #[error("Frame arrived on port {port}, expected {expected}.")]
    WrongPort { port: u8, expected: u8 },
    /// The payload is too short to hold a marker and a field.
    #[error("Payload of {0} bytes is too short.")]
    TooShort(usize),
    /// The payload is longer than any uplink can carry.
    #[error("Payload of {0} bytes is too long.")]
    TooLong(usize),
}

/// Check the port and length of a frame.
///
/// A frame failing this check must not be decoded, and must have no effect on
/// any device record.
pub fn check(port: u8, payload: &[u8], expected: u8) -> Result<(), FrameError> {
    if port != expected {
        Err(FrameError::WrongPort { port, expected })?;
    }

    match payload.len() {
        n if n < MIN_PAYLOAD_LEN => Err(FrameError::TooShort(n)),
        n if n > MAX_PAYLOAD_LEN => Err(FrameError::TooLong(n)),
        _ => Ok(()),
    }
}
