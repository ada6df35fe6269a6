use crate::error::{EtlError, Result};
use crate::pipeline::processing::enrich::Enrichment;
use crate::types::{EnrichedLaunchRow, LaunchRecord};
use tracing::{debug, info};

/// Rows produced by [`assemble`], plus how many the family filter removed
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledDataset {
    pub rows: Vec<EnrichedLaunchRow>,
    pub excluded: usize,
}

/// Fails with `Alignment` if any enrichment sequence does not have exactly
/// one entry per launch.
pub fn check_alignment(launches: &[LaunchRecord], enrichment: &Enrichment) -> Result<()> {
    let expected = launches.len();
    for (sequence, actual) in enrichment.lengths() {
        if actual != expected {
            return Err(EtlError::Alignment {
                sequence,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Zips base fields and enrichment sequences into rows, drops the
/// `excluded_booster` family and renumbers flight numbers 1..N in the
/// order the rows were retained.
pub fn assemble(
    launches: &[LaunchRecord],
    enrichment: Enrichment,
    excluded_booster: &str,
) -> Result<AssembledDataset> {
    check_alignment(launches, &enrichment)?;

    let Enrichment {
        booster_version,
        launch_site,
        payload,
        core,
    } = enrichment;

    let mut boosters = booster_version.into_iter();
    let mut site_names = launch_site.launch_site.into_iter();
    let mut longitudes = launch_site.longitude.into_iter();
    let mut latitudes = launch_site.latitude.into_iter();
    let mut masses = payload.payload_mass.into_iter();
    let mut orbits = payload.orbit.into_iter();
    let mut outcomes = core.outcome.into_iter();
    let mut flight_counts = core.flights.into_iter();
    let mut grid_fin_flags = core.grid_fins.into_iter();
    let mut reused_flags = core.reused.into_iter();
    let mut leg_flags = core.legs.into_iter();
    let mut landing_pads = core.landing_pad.into_iter();
    let mut blocks = core.block.into_iter();
    let mut reuse_counts = core.reused_count.into_iter();
    let mut serials = core.serial.into_iter();

    let mut rows = Vec::with_capacity(launches.len());
    for launch in launches {
        // Lengths were checked above, so every iterator yields here.
        let (
            Some(booster_version),
            Some(payload_mass),
            Some(orbit),
            Some(launch_site),
            Some(longitude),
            Some(latitude),
            Some(outcome),
            Some(flights),
            Some(grid_fins),
            Some(reused),
            Some(legs),
            Some(landing_pad),
            Some(block),
            Some(reused_count),
            Some(serial),
        ) = (
            boosters.next(),
            masses.next(),
            orbits.next(),
            site_names.next(),
            longitudes.next(),
            latitudes.next(),
            outcomes.next(),
            flight_counts.next(),
            grid_fin_flags.next(),
            reused_flags.next(),
            leg_flags.next(),
            landing_pads.next(),
            blocks.next(),
            reuse_counts.next(),
            serials.next(),
        )
        else {
            return Err(EtlError::Alignment {
                sequence: "enrichment",
                expected: launches.len(),
                actual: rows.len(),
            });
        };

        rows.push(EnrichedLaunchRow {
            flight_number: launch.flight_number,
            date: launch.date,
            booster_version,
            payload_mass,
            orbit,
            launch_site,
            longitude,
            latitude,
            outcome,
            flights,
            grid_fins,
            reused,
            legs,
            landing_pad,
            block,
            reused_count,
            serial,
        });
    }

    let zipped = rows.len();
    rows.retain(|row| row.booster_version != excluded_booster);
    let excluded = zipped - rows.len();
    debug!("Dropped {} '{}' rows", excluded, excluded_booster);

    renumber(&mut rows);
    info!("Assembled {} rows", rows.len());

    Ok(AssembledDataset { rows, excluded })
}

/// Rewrites flight numbers as a contiguous 1-based sequence
pub fn renumber(rows: &mut [EnrichedLaunchRow]) {
    for (flight_number, row) in (1u32..).zip(rows.iter_mut()) {
        row.flight_number = flight_number;
    }
}
