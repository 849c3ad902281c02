//! Collaborators consulted after a payload has been walked.

use super::record::DeviceRecord;

/// The outside world as seen by the follow-up logic.
pub trait Environment {
    /// Current wall-clock time, in seconds since the Unix epoch.
    fn now(&self) -> u64;

    /// Time of the most recent clear-voice broadcast, in seconds since the
    /// Unix epoch.
    ///
    /// This value is shared by all devices, and is maintained by whoever sends
    /// the broadcasts.
    fn last_clear_voice(&self) -> u64;

    /// Report the interval reconciliation state of a device, so the commanded
    /// interval can be sent again if needed.
    ///
    /// This is a request, not a delivery: implementations should queue it and
    /// return.
    fn send_interval(&mut self, slot: usize, record: &DeviceRecord);
}

#[cfg(feature = "std")]
pub use system::SystemEnvironment;

#[cfg(feature = "std")]
mod system {
    extern crate std;

    use std::{
        sync::atomic::{AtomicU64, Ordering},
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::{DeviceRecord, Environment};

    /// An environment reading the system clock.
    ///
    /// _Requires Cargo feature `std`._
    pub struct SystemEnvironment<'a, F> {
        last_clear_voice: &'a AtomicU64,
        send_interval: F,
    }

    impl<'a, F: FnMut(usize, &DeviceRecord)> SystemEnvironment<'a, F> {
        /// Create an environment reading the last clear-voice time from a
        /// shared timestamp, and passing interval requests to a closure.
        pub fn new(last_clear_voice: &'a AtomicU64, send_interval: F) -> Self {
            Self {
                last_clear_voice,
                send_interval,
            }
        }
    }

    impl<F: FnMut(usize, &DeviceRecord)> Environment for SystemEnvironment<'_, F> {
        fn now(&self) -> u64 {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs())
        }

        fn last_clear_voice(&self) -> u64 {
            self.last_clear_voice.load(Ordering::Relaxed)
        }

        fn send_interval(&mut self, slot: usize, record: &DeviceRecord) {
            (self.send_interval)(slot, record)
        }
    }
}
