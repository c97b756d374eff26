use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use feed::{Direction, RouteID, RunID, StopID, TripID, VehicleID};

use crate::node::node_name;

/// A vehicle reported being at or just past a named stop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StopEntry {
    pub name: String,
    pub direction: Direction,
    /// Resolved from the name, if the route knows this stop
    pub id: Option<StopID>,
    pub route_id: RouteID,
    pub vehicle_id: VehicleID,
    pub run_id: RunID,
    pub trip_id: TripID,
    /// Is this stop in any of the route's schedules?
    pub scheduled: bool,
    pub created: NaiveDateTime,
}

impl StopEntry {
    pub fn node_name(&self) -> String {
        node_name(&self.name, self.direction)
    }

    fn same_observation(&self, other: &StopEntry) -> bool {
        self.name == other.name
            && self.direction == other.direction
            && self.run_id == other.run_id
            && self.trip_id == other.trip_id
            && self.vehicle_id == other.vehicle_id
    }
}

/// Every buffered observation for one trip of one vehicle, in the order they were seen.
pub struct PendingTrip {
    pub trip_id: TripID,
    pub entries: Vec<StopEntry>,
    // Index in the session of the newest entry, to break ties between trips seen the same instant
    latest: usize,
}

/// The observations not yet folded into any chain. Owned by one engine; nothing global.
#[derive(Default, Serialize, Deserialize)]
pub struct Session {
    entries: Vec<StopEntry>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if this exact observation was already buffered.
    pub fn observe(&mut self, entry: StopEntry) -> bool {
        if self.entries.iter().any(|x| x.same_observation(&entry)) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[StopEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Groups a route's buffered entries by vehicle, then by trip. Each vehicle's trips are sorted
    /// from oldest to most recent, and entries within a trip by creation time.
    pub fn trips(&self, route: &RouteID) -> BTreeMap<VehicleID, Vec<PendingTrip>> {
        let mut per_vehicle: BTreeMap<VehicleID, BTreeMap<TripID, PendingTrip>> = BTreeMap::new();
        for (idx, entry) in self.entries.iter().enumerate() {
            if &entry.route_id != route {
                continue;
            }
            let trip = per_vehicle
                .entry(entry.vehicle_id.clone())
                .or_insert_with(BTreeMap::new)
                .entry(entry.trip_id.clone())
                .or_insert_with(|| PendingTrip {
                    trip_id: entry.trip_id.clone(),
                    entries: Vec::new(),
                    latest: idx,
                });
            trip.entries.push(entry.clone());
            trip.latest = idx;
        }

        let mut result = BTreeMap::new();
        for (vehicle, trips) in per_vehicle {
            let mut trips: Vec<PendingTrip> = trips.into_values().collect();
            for trip in &mut trips {
                // Stable, so entries from the same instant keep the order they arrived
                trip.entries.sort_by_key(|e| e.created);
            }
            trips.sort_by_key(|t| {
                (
                    t.entries.last().map(|e| e.created),
                    t.latest,
                )
            });
            result.insert(vehicle, trips);
        }
        result
    }

    /// Drops everything buffered for one trip, once it's been folded.
    pub fn discard(&mut self, route: &RouteID, vehicle: &VehicleID, trip: &TripID) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| {
            !(&e.route_id == route && &e.vehicle_id == vehicle && &e.trip_id == trip)
        });
        before - self.entries.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;

    use super::*;

    pub fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 7, 4)
            .unwrap()
            .and_hms_opt(9, minute, 0)
            .unwrap()
    }

    pub fn entry(vehicle: &str, trip: &str, name: &str, scheduled: bool, minute: u32) -> StopEntry {
        StopEntry {
            name: name.to_string(),
            direction: Direction::Outbound,
            id: None,
            route_id: "R".into(),
            vehicle_id: vehicle.into(),
            run_id: "run".into(),
            trip_id: trip.into(),
            scheduled,
            created: at(minute),
        }
    }

    #[test]
    fn idempotent_observation() {
        let mut session = Session::new();
        assert!(session.observe(entry("V", "T", "Stop1", true, 0)));
        assert!(!session.observe(entry("V", "T", "Stop1", true, 0)));
        // Seen again later, still the same observation
        assert!(!session.observe(entry("V", "T", "Stop1", true, 5)));
        assert_eq!(session.len(), 1);

        // A different direction is a different observation
        let mut inbound = entry("V", "T", "Stop1", true, 6);
        inbound.direction = Direction::Inbound;
        assert!(session.observe(inbound));
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn group_by_vehicle_and_trip() {
        let mut session = Session::new();
        session.observe(entry("V", "T1", "A", true, 0));
        session.observe(entry("W", "T9", "A", true, 0));
        session.observe(entry("V", "T1", "B", true, 1));
        session.observe(entry("V", "T2", "A", true, 2));
        let mut other_route = entry("V", "T3", "Z", true, 3);
        other_route.route_id = "Other".into();
        session.observe(other_route);

        let trips = session.trips(&"R".into());
        assert_eq!(trips.len(), 2);
        let v = &trips[&VehicleID::from("V")];
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].trip_id, TripID::from("T1"));
        assert_eq!(
            v[0].entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["A", "B"]
        );
        assert_eq!(v[1].trip_id, TripID::from("T2"));

        assert_eq!(session.discard(&"R".into(), &"V".into(), &"T1".into()), 2);
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn entries_sorted_by_creation() {
        let mut session = Session::new();
        session.observe(entry("V", "T", "Late", false, 9));
        session.observe(entry("V", "T", "Early", false, 1));
        let trips = session.trips(&"R".into());
        let names: Vec<&str> = trips[&VehicleID::from("V")][0]
            .entries
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Early", "Late"]);
    }
}
