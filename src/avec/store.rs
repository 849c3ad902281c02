//! Access to the registry's device records.
//!
//! The registry owns its records and decides how slots are allocated and
//! evicted. Decoding only needs exclusive access to one record at a time, for
//! the duration of a single call.
//!
//! # Concurrency
//!
//! Decoding performs no locking. At most one uplink may be decoded per slot at
//! a time. A registry decoding uplinks from several devices concurrently must
//! protect each record on its own, for example by holding a
//! `Mutex<DeviceRecord>` per slot and passing the guarded record to
//! [`crate::avec::uplink::decode`], or by assigning each slot to a single
//! worker.

use super::record::DeviceRecord;

/// An indexable collection of device records.
pub trait DeviceStore {
    /// Borrow the record in a slot, if the slot holds one.
    fn record_mut(&mut self, slot: usize) -> Option<&mut DeviceRecord>;
}

impl DeviceStore for [DeviceRecord] {
    fn record_mut(&mut self, slot: usize) -> Option<&mut DeviceRecord> {
        self.get_mut(slot)
    }
}

impl<const N: usize> DeviceStore for [DeviceRecord; N] {
    fn record_mut(&mut self, slot: usize) -> Option<&mut DeviceRecord> {
        self.get_mut(slot)
    }
}

impl DeviceStore for [Option<DeviceRecord>] {
    fn record_mut(&mut self, slot: usize) -> Option<&mut DeviceRecord> {
        self.get_mut(slot)?.as_mut()
    }
}

#[cfg(feature = "std")]
mod std_impls {
    extern crate std;

    use std::vec::Vec;

    use super::{DeviceRecord, DeviceStore};

    impl DeviceStore for Vec<DeviceRecord> {
        fn record_mut(&mut self, slot: usize) -> Option<&mut DeviceRecord> {
            self.get_mut(slot)
        }
    }

    impl DeviceStore for Vec<Option<DeviceRecord>> {
        fn record_mut(&mut self, slot: usize) -> Option<&mut DeviceRecord> {
            self.get_mut(slot)?.as_mut()
        }
    }
}
