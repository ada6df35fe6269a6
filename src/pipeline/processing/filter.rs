use crate::types::{LaunchRecord, RawLaunch};
use chrono::NaiveDate;
use tracing::debug;

/// Restricts the raw collection to single-core, single-payload launches
/// dated on or before `cutoff` (UTC calendar date), collapsing the
/// one-element lists to scalars. Pure: the same input always yields the
/// same output, in the same order.
pub fn filter_launches(raw: &[RawLaunch], cutoff: NaiveDate) -> Vec<LaunchRecord> {
    let kept: Vec<LaunchRecord> = raw
        .iter()
        .filter(|launch| launch.date_utc.date_naive() <= cutoff)
        .filter(|launch| launch.cores.len() == 1 && launch.payloads.len() == 1)
        .filter_map(collapse)
        .collect();

    debug!(
        "Filter kept {} of {} launches (cutoff {})",
        kept.len(),
        raw.len(),
        cutoff
    );
    kept
}

fn collapse(launch: &RawLaunch) -> Option<LaunchRecord> {
    let [payload] = launch.payloads.as_slice() else {
        return None;
    };
    let [core] = launch.cores.as_slice() else {
        return None;
    };

    Some(LaunchRecord {
        flight_number: launch.flight_number,
        date: launch.date_utc.date_naive(),
        rocket: launch.rocket.clone(),
        launchpad: launch.launchpad.clone(),
        payload: payload.clone(),
        core: core.clone(),
    })
}
