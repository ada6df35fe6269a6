//! Enrichment joiner.
//!
//! Each pass walks the filtered launches in order, resolves one kind of
//! reference per launch and returns its own column sequence(s). Passes are
//! independent pure functions over `(launches, resolver)`; the caller
//! composes them into an [`Enrichment`].
//!
//! A launch whose rocket, launchpad or payload id is empty contributes
//! nothing to that pass. The resulting short sequence is caught by the
//! assembler's alignment check rather than padded here.

use crate::error::Result;
use crate::pipeline::ingestion::resolver::{fetch, ReferenceResolver};
use crate::types::{CoreInfo, LaunchRecord, LaunchSiteInfo, Outcome, PayloadInfo, RocketInfo};
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchSiteColumns {
    pub launch_site: Vec<String>,
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadColumns {
    pub payload_mass: Vec<Option<f64>>,
    pub orbit: Vec<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreColumns {
    pub outcome: Vec<Outcome>,
    pub flights: Vec<Option<u32>>,
    pub grid_fins: Vec<Option<bool>>,
    pub reused: Vec<Option<bool>>,
    pub legs: Vec<Option<bool>>,
    pub landing_pad: Vec<Option<String>>,
    pub block: Vec<Option<u32>>,
    pub reused_count: Vec<Option<u32>>,
    pub serial: Vec<Option<String>>,
}

/// Output of all four passes, each sequence aligned with the launches it
/// was built from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub booster_version: Vec<String>,
    pub launch_site: LaunchSiteColumns,
    pub payload: PayloadColumns,
    pub core: CoreColumns,
}

impl Enrichment {
    /// Length of every sequence, by column name
    pub fn lengths(&self) -> [(&'static str, usize); 15] {
        [
            ("BoosterVersion", self.booster_version.len()),
            ("PayloadMass", self.payload.payload_mass.len()),
            ("Orbit", self.payload.orbit.len()),
            ("LaunchSite", self.launch_site.launch_site.len()),
            ("Longitude", self.launch_site.longitude.len()),
            ("Latitude", self.launch_site.latitude.len()),
            ("Outcome", self.core.outcome.len()),
            ("Flights", self.core.flights.len()),
            ("GridFins", self.core.grid_fins.len()),
            ("Reused", self.core.reused.len()),
            ("Legs", self.core.legs.len()),
            ("LandingPad", self.core.landing_pad.len()),
            ("Block", self.core.block.len()),
            ("ReusedCount", self.core.reused_count.len()),
            ("Serial", self.core.serial.len()),
        ]
    }
}

fn present(id: Option<&str>) -> Option<&str> {
    id.filter(|id| !id.is_empty())
}

#[instrument(skip_all, fields(launches = launches.len()))]
pub fn booster_pass(
    launches: &[LaunchRecord],
    resolver: &dyn ReferenceResolver,
) -> Result<Vec<String>> {
    let mut booster_version = Vec::with_capacity(launches.len());
    for launch in launches {
        if let Some(id) = present(launch.rocket.as_deref()) {
            let rocket: RocketInfo = fetch(resolver, id)?;
            booster_version.push(rocket.name);
        }
    }
    Ok(booster_version)
}

#[instrument(skip_all, fields(launches = launches.len()))]
pub fn launch_site_pass(
    launches: &[LaunchRecord],
    resolver: &dyn ReferenceResolver,
) -> Result<LaunchSiteColumns> {
    let mut columns = LaunchSiteColumns::default();
    for launch in launches {
        if let Some(id) = present(launch.launchpad.as_deref()) {
            let site: LaunchSiteInfo = fetch(resolver, id)?;
            columns.longitude.push(site.longitude);
            columns.latitude.push(site.latitude);
            columns.launch_site.push(site.name);
        }
    }
    Ok(columns)
}

#[instrument(skip_all, fields(launches = launches.len()))]
pub fn payload_pass(
    launches: &[LaunchRecord],
    resolver: &dyn ReferenceResolver,
) -> Result<PayloadColumns> {
    let mut columns = PayloadColumns::default();
    for launch in launches {
        if let Some(id) = present(Some(launch.payload.as_str())) {
            let payload: PayloadInfo = fetch(resolver, id)?;
            columns.payload_mass.push(payload.mass_kg);
            columns.orbit.push(payload.orbit);
        }
    }
    Ok(columns)
}

/// Landing data comes from the launch itself and is appended for every
/// launch. Block, reuse count and serial need the core entity and are
/// left absent, without a lookup, when the launch names no core.
#[instrument(skip_all, fields(launches = launches.len()))]
pub fn core_pass(launches: &[LaunchRecord], resolver: &dyn ReferenceResolver) -> Result<CoreColumns> {
    let mut columns = CoreColumns::default();
    for launch in launches {
        let assignment = &launch.core;

        match present(assignment.core.as_deref()) {
            Some(id) => {
                let core: CoreInfo = fetch(resolver, id)?;
                columns.block.push(core.block);
                columns.reused_count.push(Some(core.reuse_count));
                columns.serial.push(Some(core.serial));
            }
            None => {
                columns.block.push(None);
                columns.reused_count.push(None);
                columns.serial.push(None);
            }
        }

        columns.outcome.push(assignment.outcome());
        columns.flights.push(assignment.flight);
        columns.grid_fins.push(assignment.gridfins);
        columns.reused.push(assignment.reused);
        columns.legs.push(assignment.legs);
        columns.landing_pad.push(assignment.landpad.clone());
    }
    Ok(columns)
}

/// Runs the four passes in order; each one completes before the next starts
pub fn enrich(launches: &[LaunchRecord], resolver: &dyn ReferenceResolver) -> Result<Enrichment> {
    let booster_version = booster_pass(launches, resolver)?;
    info!("Booster pass resolved {} rockets", booster_version.len());

    let launch_site = launch_site_pass(launches, resolver)?;
    info!("Launch site pass resolved {} launchpads", launch_site.launch_site.len());

    let payload = payload_pass(launches, resolver)?;
    info!("Payload pass resolved {} payloads", payload.payload_mass.len());

    let core = core_pass(launches, resolver)?;
    let resolved_cores = core.serial.iter().filter(|s| s.is_some()).count();
    info!(
        "Core pass covered {} launches ({} cores resolved)",
        core.outcome.len(),
        resolved_cores
    );

    Ok(Enrichment {
        booster_version,
        launch_site,
        payload,
        core,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use crate::pipeline::ingestion::resolver::Attributes;
    use crate::types::{CoreAssignment, EntityKind, LandingSuccess};
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use std::cell::RefCell;

    /// Serves fixed entities and records every lookup
    struct FixtureResolver {
        calls: RefCell<Vec<(EntityKind, String)>>,
    }

    impl FixtureResolver {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls_for(&self, kind: EntityKind) -> usize {
            self.calls.borrow().iter().filter(|(k, _)| *k == kind).count()
        }
    }

    impl ReferenceResolver for FixtureResolver {
        fn resolve(&self, kind: EntityKind, id: &str) -> Result<Attributes> {
            self.calls.borrow_mut().push((kind, id.to_string()));
            let body: Value = match (kind, id) {
                (EntityKind::Rocket, "f1") => json!({ "name": "Falcon 1" }),
                (EntityKind::Rocket, "f9") => json!({ "name": "Falcon 9" }),
                (EntityKind::Launchpad, "slc40") => json!({
                    "name": "CCSFS SLC 40", "longitude": -80.577366, "latitude": 28.5618571
                }),
                (EntityKind::Payload, "p-heavy") => json!({ "mass_kg": 5500.0, "orbit": "GTO" }),
                (EntityKind::Payload, _) => json!({ "mass_kg": null, "orbit": "LEO" }),
                (EntityKind::Core, "b1049") => json!({
                    "block": 5, "reuse_count": 6, "serial": "B1049"
                }),
                _ => {
                    return Err(EtlError::NotFound {
                        kind,
                        id: id.to_string(),
                    })
                }
            };
            Attributes::from_value(kind, id, body)
        }
    }

    fn record(flight_number: u32, payload: &str, core_id: Option<&str>) -> LaunchRecord {
        LaunchRecord {
            flight_number,
            date: NaiveDate::from_ymd_opt(2019, 5, 4).unwrap(),
            rocket: Some("f9".into()),
            launchpad: Some("slc40".into()),
            payload: payload.to_string(),
            core: CoreAssignment {
                core: core_id.map(str::to_string),
                flight: Some(2),
                gridfins: Some(true),
                legs: Some(true),
                reused: Some(core_id.is_some()),
                landing_success: core_id.map(|_| true),
                landing_type: core_id.map(|_| "ASDS".to_string()),
                landpad: core_id.map(|_| "ocisly".to_string()),
            },
        }
    }

    #[test]
    fn test_all_sequences_align_with_launches() {
        let resolver = FixtureResolver::new();
        let launches = vec![
            record(1, "p-heavy", Some("b1049")),
            record(2, "p-light", None),
            record(3, "p-light", Some("b1049")),
        ];

        let enrichment = enrich(&launches, &resolver).unwrap();
        for (name, len) in enrichment.lengths() {
            assert_eq!(len, launches.len(), "sequence {name} is misaligned");
        }
        assert_eq!(enrichment.booster_version, vec!["Falcon 9"; 3]);
        assert_eq!(enrichment.payload.payload_mass, vec![Some(5500.0), None, None]);
        assert_eq!(enrichment.launch_site.launch_site[0], "CCSFS SLC 40");
    }

    #[test]
    fn test_absent_core_skips_lookup_but_keeps_landing_data() {
        let resolver = FixtureResolver::new();
        let launches = vec![record(1, "p-light", None)];

        let core = core_pass(&launches, &resolver).unwrap();
        assert_eq!(resolver.calls_for(EntityKind::Core), 0);
        assert_eq!(core.block, vec![None]);
        assert_eq!(core.reused_count, vec![None]);
        assert_eq!(core.serial, vec![None]);

        assert_eq!(core.outcome[0].success, LandingSuccess::Unknown);
        assert_eq!(core.outcome[0].to_string(), "None None");
        assert_eq!(core.flights, vec![Some(2)]);
        assert_eq!(core.grid_fins, vec![Some(true)]);
        assert_eq!(core.reused, vec![Some(false)]);
        assert_eq!(core.landing_pad, vec![None]);
    }

    #[test]
    fn test_present_core_is_resolved() {
        let resolver = FixtureResolver::new();
        let launches = vec![record(1, "p-light", Some("b1049"))];

        let core = core_pass(&launches, &resolver).unwrap();
        assert_eq!(core.block, vec![Some(5)]);
        assert_eq!(core.reused_count, vec![Some(6)]);
        assert_eq!(core.serial, vec![Some("B1049".to_string())]);
        assert_eq!(core.outcome[0].to_string(), "True ASDS");
        assert_eq!(core.landing_pad, vec![Some("ocisly".to_string())]);
    }

    #[test]
    fn test_one_lookup_per_launch_without_cache() {
        let resolver = FixtureResolver::new();
        let launches = vec![
            record(1, "p-light", Some("b1049")),
            record(2, "p-light", Some("b1049")),
        ];

        enrich(&launches, &resolver).unwrap();
        assert_eq!(resolver.calls_for(EntityKind::Rocket), 2);
        assert_eq!(resolver.calls_for(EntityKind::Launchpad), 2);
        assert_eq!(resolver.calls_for(EntityKind::Payload), 2);
        assert_eq!(resolver.calls_for(EntityKind::Core), 2);
    }

    #[test]
    fn test_empty_rocket_id_contributes_nothing() {
        let resolver = FixtureResolver::new();
        let mut blank = record(2, "p-light", None);
        blank.rocket = Some(String::new());
        let mut missing = record(3, "p-light", None);
        missing.rocket = None;
        let launches = vec![record(1, "p-light", None), blank, missing];

        let boosters = booster_pass(&launches, &resolver).unwrap();
        assert_eq!(boosters.len(), 1);
        assert_eq!(resolver.calls_for(EntityKind::Rocket), 1);
    }

    #[test]
    fn test_unknown_reference_aborts_pass() {
        let resolver = FixtureResolver::new();
        let mut launch = record(1, "p-light", None);
        launch.launchpad = Some("vafb".into());

        let err = launch_site_pass(&[launch], &resolver).unwrap_err();
        assert!(matches!(err, EtlError::NotFound { kind: EntityKind::Launchpad, .. }));
    }
}
