#![cfg(feature = "std")]

use std::{
    sync::{Arc, Mutex},
    thread,
};

use lorawan_lpp::{
    Config,
    avec::{
        environment::Environment,
        record::{DevEui, DeviceRecord, DeviceType, IntervalState, Label},
        uplink::{Error, Uplink, decode, decode_in},
    },
    sans::{data::Value, header::FrameError},
};
use tracing_subscriber::EnvFilter;

const PORT: u8 = 210;

fn frame(payload: &[u8]) -> Uplink<'_> {
    Uplink {
        slot: 0,
        fcnt: 7,
        port: PORT,
        confirmed: false,
        payload,
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn record() -> DeviceRecord {
    DeviceRecord::new(DevEui([0x70, 0xb3, 0xd5, 0x7e, 0xd0, 0x00, 0x00, 0x01]), DeviceType::Smoke)
}

/// A fixed clock recording interval requests.
#[derive(Default)]
struct Clock {
    now: u64,
    last_clear_voice: u64,
    sent: Vec<(usize, IntervalState)>,
}

impl Environment for Clock {
    fn now(&self) -> u64 {
        self.now
    }
    fn last_clear_voice(&self) -> u64 {
        self.last_clear_voice
    }
    fn send_interval(&mut self, slot: usize, record: &DeviceRecord) {
        self.sent.push((slot, record.interval_state));
    }
}

#[test]
fn battery_voltage() {
    let mut record = record();
    let report = decode(
        frame(&[0x00, 0x04, 0x0c, 0x1c]),
        &mut record,
        &mut Clock::default(),
        &Config::default(),
    )
    .unwrap();

    assert_eq!(record.battery_millivolts, 3100);
    let voltage = report.summary.battery_voltage().unwrap();
    assert_eq!(voltage.raw, 3100);
    assert_eq!(voltage.to_string(), "3.10");
}

#[test]
fn temperature() {
    let mut record = record();
    let report = decode(
        frame(&[0x00, 0x10, 0x00, 0x96]),
        &mut record,
        &mut Clock::default(),
        &Config::default(),
    )
    .unwrap();

    assert_eq!(record.temperature, 150);
    assert_eq!(report.summary.temperature().unwrap().to_string(), "1.5");
}

#[test]
fn negative_and_tenths_temperature() {
    let config = Config::default();

    let mut record = record();
    decode(frame(&[0x00, 0x10, 0xff, 0x38]), &mut record, &mut Clock::default(), &config).unwrap();
    assert_eq!(record.temperature, -200);

    decode(frame(&[0x00, 0xaa, 0x00, 0xfa]), &mut record, &mut Clock::default(), &config).unwrap();
    assert_eq!(record.temperature, 2500);
}

#[test]
fn humidity_is_per_mille() {
    let mut record = record();
    decode(
        frame(&[0x00, 0x12, 0x02, 0x5e]),
        &mut record,
        &mut Clock::default(),
        &Config::default(),
    )
    .unwrap();

    assert_eq!(record.humidity, 606);
}

#[test]
fn interval_mismatch_then_match() {
    init_tracing();

    let config = Config::default();
    let payload = [0x00, 0x78, 0x00, 0x00, 0x00, 0x1e];
    let mut clock = Clock::default();

    let mut record = record();
    record.downlink_interval = 60;
    let report = decode(frame(&payload), &mut record, &mut clock, &config).unwrap();

    assert_eq!(record.uplink_interval, 30);
    assert_eq!(record.interval_state, IntervalState::Checking);
    assert!(record.needs_interval_resend);
    assert!(report.flags.interval_resend);
    assert_eq!(record.downlink_interval, 60);

    record.downlink_interval = 30;
    let report = decode(frame(&payload), &mut record, &mut clock, &config).unwrap();

    assert_eq!(record.interval_state, IntervalState::Ok);
    assert!(!record.needs_interval_resend);
    assert!(!report.flags.interval_resend);
    assert_eq!(record.downlink_interval, 0);

    assert_eq!(
        clock.sent,
        [(0, IntervalState::Checking), (0, IntervalState::Ok)]
    );
}

#[test]
fn wrong_port_is_rejected() {
    init_tracing();

    let mut record = record();
    let before = record.clone();
    let mut clock = Clock::default();

    let err = decode(
        Uplink {
            port: 1,
            ..frame(&[0x00, 0x04, 0x0c, 0x1c])
        },
        &mut record,
        &mut clock,
        &Config::default(),
    )
    .unwrap_err();

    assert_eq!(
        err,
        Error::RejectedFrame(FrameError::WrongPort {
            port: 1,
            expected: PORT
        })
    );
    assert_eq!(record, before);
    assert!(clock.sent.is_empty());
}

#[test]
fn short_payload_is_rejected() {
    let mut record = record();
    let before = record.clone();

    let err = decode(frame(&[0x00, 0x01]), &mut record, &mut Clock::default(), &Config::default())
        .unwrap_err();

    assert_eq!(err, Error::RejectedFrame(FrameError::TooShort(2)));
    assert_eq!(record, before);
}

#[test]
fn long_payload_is_rejected() {
    let mut record = record();
    let before = record.clone();

    let mut payload = vec![0x00, 0x04, 0x0c, 0x1c];
    payload.resize(256, 0x00);

    let err = decode(frame(&payload), &mut record, &mut Clock::default(), &Config::default())
        .unwrap_err();

    assert_eq!(err, Error::RejectedFrame(FrameError::TooLong(256)));
    assert_eq!(record, before);
}

#[test]
fn field_ending_at_payload_end() {
    let mut record = record();
    decode(
        frame(&[0x00, 0x02, 0x00, 0x00, 0x01, 0x00]),
        &mut record,
        &mut Clock::default(),
        &Config::default(),
    )
    .unwrap();

    assert_eq!(record.downlink_count, 256);
}

#[test]
fn field_past_payload_end() {
    let mut record = record();
    let before = record.clone();

    let err = decode(
        frame(&[0x00, 0x02, 0x00, 0x00, 0x01]),
        &mut record,
        &mut Clock::default(),
        &Config::default(),
    )
    .unwrap_err();

    assert_eq!(
        err,
        Error::TruncatedField {
            tag: 0x02,
            offset: 1,
            needed: 4,
            remaining: 3
        }
    );
    assert_eq!(record, before);
}

#[test]
fn unknown_tag_keeps_earlier_fields() {
    init_tracing();

    let mut record = record();
    let mut clock = Clock::default();

    let err = decode(
        frame(&[
            0x00, 0x04, 0x0c, 0x1c, 0x10, 0x00, 0x96, 0x2d, 0x12, 0x02, 0x5e, 0x78, 0x00, 0x00,
            0x00, 0x1e,
        ]),
        &mut record,
        &mut clock,
        &Config::default(),
    )
    .unwrap_err();

    assert_eq!(err, Error::UnknownTag { tag: 0x2d, offset: 7 });
    assert_eq!(record.battery_millivolts, 3100);
    assert_eq!(record.temperature, 150);
    assert_eq!(record.humidity, 0);
    assert_eq!(record.uplink_interval, 0);
}

#[test]
fn decoding_is_idempotent() {
    let payload = [
        0x00, 0x01, 0x0a, 0x03, 0x01, 0x04, 0x0e, 0x10, 0x07, b'1', b'.', b'0', 0x00, 0x21, 0x01,
        0x93, 0x50,
    ];
    let config = Config::default();

    let mut a = record();
    let mut b = record();
    decode(frame(&payload), &mut a, &mut Clock::default(), &config).unwrap();
    decode(frame(&payload), &mut b, &mut Clock::default(), &config).unwrap();
    assert_eq!(a, b);

    let once = a.clone();
    decode(frame(&payload), &mut a, &mut Clock::default(), &config).unwrap();
    assert_eq!(a, once);
}

#[test]
fn strings_and_model() {
    let mut record = record();
    decode(
        frame(&[
            0x00, 0x01, 0x0a, 0x06, b'b', b'1', 0x00, 0x08, b'a', b'p', b'p', 0x00, 0x09, 0x00,
        ]),
        &mut record,
        &mut Clock::default(),
        &Config::default(),
    )
    .unwrap();

    assert_eq!(record.model.as_str(), Some("M300C"));
    assert_eq!(record.boot_version.as_str(), Some("b1"));
    assert_eq!(record.app_version.as_str(), Some("app"));
    assert!(record.hardware_version.is_empty());
}

#[test]
fn unknown_model_code_keeps_name() {
    let mut record = record();
    assert!(record.model.set(b"AN-301"));

    let report = decode(
        frame(&[0x00, 0x01, 0xfe]),
        &mut record,
        &mut Clock::default(),
        &Config::default(),
    )
    .unwrap();

    assert_eq!(record.model.as_str(), Some("AN-301"));
    assert_eq!(report.summary.model(), None);
    assert_eq!(report.summary.get(0x01), Some(Value::Unsigned(0xfe)));
}

#[test]
fn oversized_string_is_rejected() {
    init_tracing();

    let mut payload = vec![0x00, 0x04, 0x0c, 0x1c, 0x07];
    payload.extend([b'x'; 33]);
    payload.push(0x00);

    let mut record = record();
    let err = decode(frame(&payload), &mut record, &mut Clock::default(), &Config::default())
        .unwrap_err();

    assert_eq!(
        err,
        Error::OversizedString {
            tag: 0x07,
            len: 33,
            capacity: 32
        }
    );
    assert_eq!(record.battery_millivolts, 3100);
    assert!(record.main_version.is_empty());
}

#[test]
fn long_string_without_attribute() {
    const RESPONSE: &[u8] = b"+OK AT+VER=AN-301_V2.3.1_build20200101";

    let mut payload = vec![0x00, 0x0f];
    payload.extend(RESPONSE);
    payload.extend([0x00, 0x04, 0x0c, 0x1c]);

    let mut record = record();
    let report = decode(frame(&payload), &mut record, &mut Clock::default(), &Config::default())
        .unwrap();

    assert_eq!(record.battery_millivolts, 3100);
    assert_eq!(report.summary.get(0x0f), Some(Value::Text(RESPONSE)));
}

#[test]
fn label_keeps_value_when_too_long() {
    let mut label = Label::default();
    assert!(label.set(b"V1.0"));
    assert!(!label.set(&[b'x'; 33]));
    assert_eq!(label.as_str(), Some("V1.0"));

    assert!(label.set(&[b'y'; 32]));
    assert_eq!(label.as_bytes().len(), Label::CAPACITY);
}

#[test]
fn string_of_full_capacity() {
    let mut payload = vec![0x00, 0x07];
    payload.extend([b'x'; 32]);
    payload.push(0x00);

    let mut record = record();
    decode(frame(&payload), &mut record, &mut Clock::default(), &Config::default()).unwrap();

    assert_eq!(record.main_version.as_bytes(), [b'x'; 32]);
}

#[test]
fn unterminated_string() {
    let mut record = record();
    let err = decode(
        frame(&[0x00, 0x07, b'1', b'.', b'0']),
        &mut record,
        &mut Clock::default(),
        &Config::default(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::TruncatedField { tag: 0x07, offset: 1, .. }));
    assert!(record.main_version.is_empty());
}

#[test]
fn prefixed_field() {
    let mut record = record();
    let report = decode(
        frame(&[0x00, 0x95, 0x03, 0x01, 0x02, 0x03, 0x93, 0x64]),
        &mut record,
        &mut Clock::default(),
        &Config::default(),
    )
    .unwrap();

    assert_eq!(report.summary.get(0x95), Some(Value::Opaque(&[1, 2, 3])));
    assert_eq!(record.battery_level, 100);

    let err = decode(
        frame(&[0x00, 0x95, 0x04, 0x01, 0x02, 0x03]),
        &mut record,
        &mut Clock::default(),
        &Config::default(),
    )
    .unwrap_err();

    assert_eq!(
        err,
        Error::TruncatedField {
            tag: 0x95,
            offset: 1,
            needed: 5,
            remaining: 4
        }
    );
}

#[test]
fn events_are_counted_once() {
    let config = Config::default();

    for device_type in [DeviceType::Sos, DeviceType::SmartButton, DeviceType::Doorbell] {
        let mut record = record();
        record.device_type = device_type;

        let report = decode(
            frame(&[0x00, 0x1c, 0x01, 0x03, 0x01, 0x05, 0x02]),
            &mut record,
            &mut Clock::default(),
            &config,
        )
        .unwrap();

        assert_eq!(report.summary.events(), 2, "{device_type:?}");
        assert_eq!(report.summary.button(), Some(1));
    }
}

#[test]
fn button_events_only_on_button_devices() {
    let config = Config::default();

    for device_type in [DeviceType::Undefined, DeviceType::TemperatureHumidity, DeviceType::Smoke] {
        let mut record = record();
        record.device_type = device_type;

        let report = decode(frame(&[0x00, 0x1c, 0x01]), &mut record, &mut Clock::default(), &config)
            .unwrap();

        assert_eq!(report.summary.events(), 0, "{device_type:?}");
        assert_eq!(report.summary.button(), Some(1));
    }

    let mut record = record();
    record.device_type = DeviceType::Doorbell;
    let report = decode(frame(&[0x00, 0x1c, 0x00]), &mut record, &mut Clock::default(), &config)
        .unwrap();
    assert_eq!(report.summary.events(), 0);

    // Only the last press of an uplink is looked at.
    let report = decode(
        frame(&[0x00, 0x1c, 0x00, 0x1c, 0x02]),
        &mut record,
        &mut Clock::default(),
        &config,
    )
    .unwrap();
    assert_eq!(report.summary.events(), 1);
}

#[test]
fn zero_downlink_count_is_ignored() {
    let mut record = record();
    record.downlink_count = 12;

    decode(
        frame(&[0x00, 0x02, 0x00, 0x00, 0x00, 0x00]),
        &mut record,
        &mut Clock::default(),
        &Config::default(),
    )
    .unwrap();

    assert_eq!(record.downlink_count, 12);
}

#[test]
fn decode_into_store() {
    let config = Config::default();
    let mut store = vec![Some(record()), None];

    let report = decode_in(
        frame(&[0x00, 0x21, 0x01]),
        store.as_mut_slice(),
        &mut Clock::default(),
        &config,
    )
    .unwrap();
    assert_eq!(report.summary.events(), 1);
    assert!(store[0].as_ref().unwrap().flood);

    let err = decode_in(
        Uplink {
            slot: 1,
            ..frame(&[0x00, 0x21, 0x01])
        },
        &mut store,
        &mut Clock::default(),
        &config,
    )
    .unwrap_err();
    assert_eq!(err, Error::UnknownSlot(1));

    let err = decode_in(
        Uplink {
            slot: 5,
            ..frame(&[0x00, 0x21, 0x01])
        },
        &mut store,
        &mut Clock::default(),
        &config,
    )
    .unwrap_err();
    assert_eq!(err, Error::UnknownSlot(5));

    let err = decode_in(
        Uplink {
            slot: 1,
            port: 1,
            ..frame(&[0x00, 0x21, 0x01])
        },
        &mut store,
        &mut Clock::default(),
        &config,
    )
    .unwrap_err();
    assert_eq!(err, Error::RejectedFrame(FrameError::WrongPort { port: 1, expected: PORT }));
}

#[test]
fn records_locked_per_slot() {
    let store: Arc<Vec<Mutex<DeviceRecord>>> =
        Arc::new((0..4).map(|_| Mutex::new(record())).collect());

    let handles: Vec<_> = (0..4)
        .map(|slot| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for fcnt in 0..16 {
                    let payload = [0x00, 0x04, 0x0c, slot as u8, 0x02, 0x00, 0x00, 0x00, fcnt + 1];
                    let mut record = store[slot].lock().unwrap();
                    decode(
                        Uplink {
                            slot,
                            fcnt: fcnt.into(),
                            ..frame(&payload)
                        },
                        &mut record,
                        &mut Clock::default(),
                        &Config::default(),
                    )
                    .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for (slot, record) in store.iter().enumerate() {
        let record = record.lock().unwrap();
        assert_eq!(record.battery_millivolts, 0x0c00 + slot as u16);
        assert_eq!(record.downlink_count, 16);
    }
}

#[cfg(feature = "serde")]
#[test]
fn summary_serializes_as_map() {
    let payload = [0x00, 0x04, 0x0c, 0x1c, 0x21, 0x01, 0x07, b'v', b'2', 0x00];
    let mut record = record();
    let report = decode(frame(&payload), &mut record, &mut Clock::default(), &Config::default())
        .unwrap();

    assert_eq!(
        serde_json::to_value(&report.summary).unwrap(),
        serde_json::json!({
            "battery_voltage": 3.1,
            "flood_state": true,
            "main_version": "v2",
            "events": 1,
        })
    );

    let json = serde_json::to_string(&record).unwrap();
    let restored: DeviceRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, record);
}

#[cfg(feature = "serde")]
#[test]
fn config_fills_defaults() {
    let config: Config = serde_json::from_str(r#"{ "app_port": 12 }"#).unwrap();

    assert_eq!(
        config,
        Config {
            app_port: 12,
            ..Config::default()
        }
    );
}
