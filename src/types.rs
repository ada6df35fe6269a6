use crate::constants::{CORES_PATH, LAUNCHPADS_PATH, PAYLOADS_PATH, ROCKETS_PATH};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of entity a launch can reference by id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Rocket,
    Launchpad,
    Payload,
    Core,
}

impl EntityKind {
    /// Collection path of this kind on the remote source
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Rocket => ROCKETS_PATH,
            EntityKind::Launchpad => LAUNCHPADS_PATH,
            EntityKind::Payload => PAYLOADS_PATH,
            EntityKind::Core => CORES_PATH,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Rocket => "rocket",
            EntityKind::Launchpad => "launchpad",
            EntityKind::Payload => "payload",
            EntityKind::Core => "core",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A launch as returned by `/launches/past`, projected to the fields the
/// dataset needs. Everything else in the payload is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLaunch {
    pub flight_number: u32,
    pub date_utc: DateTime<Utc>,
    pub rocket: Option<String>,
    pub launchpad: Option<String>,
    #[serde(default)]
    pub payloads: Vec<String>,
    #[serde(default)]
    pub cores: Vec<CoreAssignment>,
}

/// Per-launch core usage, embedded in the launch payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreAssignment {
    /// Absent for unflown or unknown cores
    pub core: Option<String>,
    pub flight: Option<u32>,
    pub gridfins: Option<bool>,
    pub legs: Option<bool>,
    pub reused: Option<bool>,
    pub landing_success: Option<bool>,
    pub landing_type: Option<String>,
    pub landpad: Option<String>,
}

impl CoreAssignment {
    pub fn outcome(&self) -> Outcome {
        Outcome {
            success: LandingSuccess::from(self.landing_success),
            landing_type: self.landing_type.clone(),
        }
    }
}

/// A launch that survived filtering: one payload, one core, within the cutoff
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRecord {
    pub flight_number: u32,
    pub date: NaiveDate,
    pub rocket: Option<String>,
    pub launchpad: Option<String>,
    pub payload: String,
    pub core: CoreAssignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingSuccess {
    Unknown,
    Success,
    Failure,
}

impl From<Option<bool>> for LandingSuccess {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => LandingSuccess::Success,
            Some(false) => LandingSuccess::Failure,
            None => LandingSuccess::Unknown,
        }
    }
}

impl fmt::Display for LandingSuccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LandingSuccess::Success => "True",
            LandingSuccess::Failure => "False",
            LandingSuccess::Unknown => "None",
        })
    }
}

/// Landing outcome of a core, e.g. `True ASDS` or `None None`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: LandingSuccess,
    pub landing_type: Option<String>,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.success,
            self.landing_type.as_deref().unwrap_or("None")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RocketInfo {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaunchSiteInfo {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayloadInfo {
    pub mass_kg: Option<f64>,
    pub orbit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoreInfo {
    pub block: Option<u32>,
    pub reuse_count: u32,
    pub serial: String,
}

/// One row of the exported dataset
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedLaunchRow {
    pub flight_number: u32,
    pub date: NaiveDate,
    pub booster_version: String,
    pub payload_mass: Option<f64>,
    pub orbit: Option<String>,
    pub launch_site: String,
    pub longitude: f64,
    pub latitude: f64,
    pub outcome: Outcome,
    pub flights: Option<u32>,
    pub grid_fins: Option<bool>,
    pub reused: Option<bool>,
    pub legs: Option<bool>,
    pub landing_pad: Option<String>,
    pub block: Option<u32>,
    pub reused_count: Option<u32>,
    pub serial: Option<String>,
}

impl EnrichedLaunchRow {
    /// Cell values in `COLUMNS` order; `None` marks a missing value and is
    /// left to the writer to render.
    pub fn cells(&self) -> Vec<Option<String>> {
        vec![
            Some(self.flight_number.to_string()),
            Some(self.date.format("%Y-%m-%d").to_string()),
            Some(self.booster_version.clone()),
            self.payload_mass.map(format_float),
            self.orbit.clone(),
            Some(self.launch_site.clone()),
            Some(format_float(self.longitude)),
            Some(format_float(self.latitude)),
            Some(self.outcome.to_string()),
            self.flights.map(|n| n.to_string()),
            self.grid_fins.map(format_bool),
            self.reused.map(format_bool),
            self.legs.map(format_bool),
            self.landing_pad.clone(),
            self.block.map(|n| n.to_string()),
            self.reused_count.map(|n| n.to_string()),
            self.serial.clone(),
        ]
    }
}

// Debug keeps the trailing `.0` on whole numbers (500 -> "500.0")
fn format_float(value: f64) -> String {
    format!("{value:?}")
}

fn format_bool(value: bool) -> String {
    let label = if value { "True" } else { "False" };
    label.to_string()
}
