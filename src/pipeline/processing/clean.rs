use crate::types::EnrichedLaunchRow;
use tracing::{info, warn};

/// Missing-value counts per nullable column, taken before imputation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingValueReport {
    pub rows: usize,
    pub payload_mass: usize,
    pub orbit: usize,
    pub flights: usize,
    pub grid_fins: usize,
    pub reused: usize,
    pub legs: usize,
    pub landing_pad: usize,
    pub block: usize,
    pub reused_count: usize,
    pub serial: usize,
}

impl MissingValueReport {
    pub fn from_rows(rows: &[EnrichedLaunchRow]) -> Self {
        let missing = |pred: fn(&EnrichedLaunchRow) -> bool| rows.iter().filter(|&r| pred(r)).count();
        Self {
            rows: rows.len(),
            payload_mass: missing(|r| r.payload_mass.is_none()),
            orbit: missing(|r| r.orbit.is_none()),
            flights: missing(|r| r.flights.is_none()),
            grid_fins: missing(|r| r.grid_fins.is_none()),
            reused: missing(|r| r.reused.is_none()),
            legs: missing(|r| r.legs.is_none()),
            landing_pad: missing(|r| r.landing_pad.is_none()),
            block: missing(|r| r.block.is_none()),
            reused_count: missing(|r| r.reused_count.is_none()),
            serial: missing(|r| r.serial.is_none()),
        }
    }

    /// Non-zero counts, by export column name
    pub fn non_zero(&self) -> Vec<(&'static str, usize)> {
        [
            ("PayloadMass", self.payload_mass),
            ("Orbit", self.orbit),
            ("Flights", self.flights),
            ("GridFins", self.grid_fins),
            ("Reused", self.reused),
            ("Legs", self.legs),
            ("LandingPad", self.landing_pad),
            ("Block", self.block),
            ("ReusedCount", self.reused_count),
            ("Serial", self.serial),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
    }

    /// Counts reported at `info`: every column with gaps, plus LandingPad
    /// even when it is complete
    pub fn reported(&self) -> Vec<(&'static str, usize)> {
        let mut counts = self.non_zero();
        if self.landing_pad == 0 {
            counts.push(("LandingPad", 0));
        }
        counts
    }

    pub fn log(&self) {
        for (column, count) in self.reported() {
            info!("Missing values for column {}: {}/{}", column, count, self.rows);
        }
    }
}

/// What the cleaner changed
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningReport {
    pub missing_before: MissingValueReport,
    /// Mean of the payload masses that were present; `None` when none were
    pub payload_mass_mean: Option<f64>,
    pub imputed: usize,
}

/// Arithmetic mean of the present payload masses
pub fn mean_payload_mass(rows: &[EnrichedLaunchRow]) -> Option<f64> {
    let present: Vec<f64> = rows.iter().filter_map(|r| r.payload_mass).collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Fills every missing payload mass with the mean of the present ones.
/// Other nullable columns are left as they are.
pub fn clean(mut rows: Vec<EnrichedLaunchRow>) -> (Vec<EnrichedLaunchRow>, CleaningReport) {
    let missing_before = MissingValueReport::from_rows(&rows);
    missing_before.log();

    let payload_mass_mean = mean_payload_mass(&rows);
    let mut imputed = 0;
    match payload_mass_mean {
        Some(mean) => {
            info!("Mean PayloadMass: {}", mean);
            for row in rows.iter_mut().filter(|r| r.payload_mass.is_none()) {
                row.payload_mass = Some(mean);
                imputed += 1;
            }
        }
        None if missing_before.payload_mass > 0 => {
            warn!("No PayloadMass values present; leaving {} rows unfilled", missing_before.payload_mass);
        }
        None => {}
    }

    (
        rows,
        CleaningReport {
            missing_before,
            payload_mass_mean,
            imputed,
        },
    )
}
