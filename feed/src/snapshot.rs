use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::{Route, RouteID, RouteStop, ScheduledStops, VehicleReport};

/// Everything fetched from the transit-info API for one poll cycle. Read-only once built.
#[derive(Clone, Deserialize)]
pub struct Snapshot {
    pub now: NaiveDateTime,
    pub routes: Vec<Route>,
    #[serde(default)]
    pub route_stops: BTreeMap<RouteID, Vec<RouteStop>>,
    #[serde(default)]
    pub schedules: BTreeMap<RouteID, Vec<ScheduledStops>>,
    #[serde(default)]
    pub vehicles: Vec<VehicleReport>,
}

impl Snapshot {
    pub fn load(path: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_slice(&fs_err::read(path)?)
            .map_err(|err| anyhow!("{path}: {err}"))?;
        info!(
            "Loaded {path}: {} routes, {} vehicles at {}",
            snapshot.routes.len(),
            snapshot.vehicles.len(),
            snapshot.now
        );
        Ok(snapshot)
    }

    pub fn route(&self, id: &RouteID) -> Option<&Route> {
        self.routes.iter().find(|r| &r.route_id == id)
    }

    /// Vehicles currently serving this route, skipping any with an offline comm status.
    pub fn vehicles_for<'a>(
        &'a self,
        route: &'a RouteID,
        offline_statuses: &'a [String],
    ) -> impl Iterator<Item = &'a VehicleReport> + 'a {
        self.vehicles
            .iter()
            .filter(move |v| &v.route_id == route && !v.is_offline(offline_statuses))
    }

    /// The same static data, with a different time and set of vehicles.
    pub fn with_vehicles(&self, now: NaiveDateTime, vehicles: Vec<VehicleReport>) -> Self {
        Self {
            now,
            routes: self.routes.clone(),
            route_stops: self.route_stops.clone(),
            schedules: self.schedules.clone(),
            vehicles,
        }
    }
}
