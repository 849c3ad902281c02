#![cfg(feature = "std")]

use csv::ReaderBuilder;
use lorawan_lpp::{
    Config,
    avec::{
        FromTags,
        environment::Environment,
        record::DeviceRecord,
        uplink::{self, Uplink},
    },
};

#[test]
fn decode_slice_vectors() {
    for mut row in read_rows("fixtures/uplinks.csv") {
        let payload = hex(&row.remove(0));
        let mut validator = Validator(row);
        lorawan_lpp::avec::decode_slice(&payload, &mut validator).unwrap();
        assert!(validator.0.is_empty(), "missing fields: {:?}", validator.0);
    }
}

#[test]
fn decode_uplink_vectors() {
    for mut row in read_rows("fixtures/summaries.csv") {
        let payload = hex(&row.remove(0));
        let events: u32 = row.remove(0).parse().unwrap();

        let uplink = Uplink {
            slot: 0,
            fcnt: 1,
            port: 210,
            confirmed: false,
            payload: &payload,
        };

        let mut record = DeviceRecord::default();
        let report = uplink::decode(uplink, &mut record, &mut Idle, &Config::default()).unwrap();

        let entries: Vec<String> = report.summary.iter().map(|e| e.to_string()).collect();
        assert_eq!(entries, row);
        assert_eq!(report.summary.events(), events);
    }
}

fn read_rows(path: &str) -> Vec<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)
        .unwrap();

    reader
        .records()
        .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
        .collect()
}

fn hex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

/// An environment in which nothing is due.
struct Idle;

impl Environment for Idle {
    fn now(&self) -> u64 {
        0
    }
    fn last_clear_voice(&self) -> u64 {
        0
    }
    fn send_interval(&mut self, _: usize, _: &DeviceRecord) {}
}

/// Expected tags and values, alternating, in decoding order.
struct Validator(Vec<String>);

impl Validator {
    fn validate(&mut self, tag: u8, value: String) {
        assert_eq!(self.0.remove(0), format!("{tag:02x}"));
        assert_eq!(self.0.remove(0), value);
    }
}

impl FromTags for Validator {
    fn add_u8(&mut self, tag: u8, value: u8) {
        self.validate(tag, value.to_string());
    }
    fn add_u16(&mut self, tag: u8, value: u16) {
        self.validate(tag, value.to_string());
    }
    fn add_i16(&mut self, tag: u8, value: i16) {
        self.validate(tag, value.to_string());
    }
    fn add_u32(&mut self, tag: u8, value: u32) {
        self.validate(tag, value.to_string());
    }
    fn add_bytes(&mut self, tag: u8, value: &[u8]) {
        let value = value.iter().map(|b| format!("{b:02x}")).collect();
        self.validate(tag, value);
    }
}
