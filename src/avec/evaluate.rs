//! Follow-up decisions taken once an uplink has been decoded.
//!
//! Only values decoded from the current uplink are considered: an attribute
//! kept on the record from an earlier uplink never triggers a decision.

use tracing::{debug, info};

use super::{
    environment::Environment,
    record::{DeviceRecord, DeviceType, Flags, IntervalState},
    summary::TelemetrySummary,
};
use crate::Config;

/// Update the follow-up flags of a record from a decoded uplink.
///
/// Button presses are counted into the summary here, and only for button
/// devices.
pub fn evaluate(
    slot: usize,
    summary: &mut TelemetrySummary<'_>,
    record: &mut DeviceRecord,
    env: &mut impl Environment,
    config: &Config,
) -> Flags {
    if let Some(interval) = summary.heartbeat_interval() {
        reconcile_interval(slot, interval, record, env);
    }

    if let Some(local_time) = summary.local_time() {
        check_clock(local_time, record, &*env, config);
    }

    let button = matches!(
        record.device_type,
        DeviceType::Sos | DeviceType::Doorbell | DeviceType::SmartButton
    );
    if button && summary.button().is_some_and(|x| x >= 1) {
        summary.add_event();
    }

    let alarm = match record.device_type {
        DeviceType::Smoke => summary.smoke(),
        DeviceType::Gas => summary.gas(),
        _ => None,
    };
    if alarm == Some(true) {
        let since = env.now().saturating_sub(env.last_clear_voice());
        record.needs_clear_voice = since < config.clear_voice_cooldown_secs;
        if record.needs_clear_voice {
            info!(dev_eui = %record.dev_eui, since, "clear voice needed");
        }
    }

    record.flags()
}

fn reconcile_interval(
    slot: usize,
    interval: u32,
    record: &mut DeviceRecord,
    env: &mut impl Environment,
) {
    record.uplink_interval = interval;
    if record.downlink_interval == 0 {
        return;
    }

    if interval != record.downlink_interval {
        record.interval_state = IntervalState::Checking;
        record.needs_interval_resend = true;
        info!(
            dev_eui = %record.dev_eui,
            reported = interval,
            commanded = record.downlink_interval,
            "interval mismatch"
        );
        env.send_interval(slot, record);
    } else {
        record.interval_state = IntervalState::Ok;
        record.needs_interval_resend = false;
        debug!(dev_eui = %record.dev_eui, interval, "interval confirmed");
        env.send_interval(slot, record);
        record.downlink_interval = 0;
    }
}

fn check_clock(local_time: u32, record: &mut DeviceRecord, env: &impl Environment, config: &Config) {
    let now = i64::try_from(env.now())
        .unwrap_or(i64::MAX)
        .saturating_add(config.utc_offset_secs);
    let drift = now.saturating_sub(local_time.into()).unsigned_abs();

    record.needs_time_sync = drift > config.drift_threshold_secs;
    if record.needs_time_sync {
        info!(dev_eui = %record.dev_eui, local_time, drift, "clock drift");
    }
}
