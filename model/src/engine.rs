use std::collections::{BTreeMap, BTreeSet};

use abstutil::{prettyprint_usize, Counter};
use chrono::NaiveDateTime;

use feed::{RouteID, Snapshot, VehicleID, VehicleReport};

use crate::node::node_name;
use crate::{
    build_chains, fold_trip, ChainSelection, EngineConfig, RouteStatus, Session, StopChain,
    StopEntry,
};

/// Where each route is in its lifecycle. Chains are only built once both the schedule and the
/// route's stops are known.
pub enum RouteState {
    Unbuilt,
    Ready(Vec<StopChain>),
}

/// What happened during one reconciliation pass.
pub struct CycleSummary {
    pub now: NaiveDateTime,
    pub routes_reconciled: usize,
    pub new_entries: usize,
    pub folded_trips: usize,
    pub stats: Counter<&'static str>,
}

/// Infers each route's stop sequence from what vehicles report, one poll cycle at a time.
pub struct Engine {
    config: EngineConfig,
    routes: BTreeMap<RouteID, RouteState>,
    session: Session,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            routes: BTreeMap::new(),
            session: Session::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Observations not yet folded into any chain
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self, route: &RouteID) -> Option<&RouteState> {
        self.routes.get(route)
    }

    pub fn chains(&self, route: &RouteID) -> Option<&[StopChain]> {
        match self.routes.get(route)? {
            RouteState::Ready(chains) => Some(chains),
            RouteState::Unbuilt => None,
        }
    }

    /// The chain that observations at this time get reconciled against.
    pub fn current_chain(&self, route: &RouteID, now: NaiveDateTime) -> Option<&StopChain> {
        let chains = self.chains(route)?;
        let idx = select_chain(chains, self.config.chain_selection, now)?;
        chains.get(idx)
    }

    /// For labeling a vehicle on the map: the name of the next scheduled stop after the one it
    /// last reported.
    pub fn next_scheduled_stop(&self, report: &VehicleReport, now: NaiveDateTime) -> Option<&str> {
        let chain = self.current_chain(&report.route_id, now)?;
        let id = chain
            .find(&node_name(&report.last_stop, report.direction()))
            .or_else(|| chain.find_by_name(&report.last_stop))?;
        let next = chain.next_scheduled(id)?;
        chain.get(next).map(|node| node.name.as_str())
    }

    pub fn status(&self, snapshot: &Snapshot, route: &RouteID) -> RouteStatus {
        let schedules = snapshot
            .schedules
            .get(route)
            .map(|x| x.as_slice())
            .unwrap_or(&[]);
        let vehicles = snapshot
            .vehicles_for(route, &self.config.offline_comm_statuses)
            .count();
        RouteStatus::new(schedules, vehicles, snapshot.now)
    }

    /// One reconciliation pass over every route in the snapshot, sequentially. Never fails; routes
    /// missing data are just skipped until a later cycle.
    pub fn run_cycle(&mut self, snapshot: &Snapshot) -> CycleSummary {
        let mut summary = CycleSummary {
            now: snapshot.now,
            routes_reconciled: 0,
            new_entries: 0,
            folded_trips: 0,
            stats: Counter::new(),
        };
        for route in &snapshot.routes {
            if self.reconcile_route(snapshot, &route.route_id, &mut summary) {
                summary.routes_reconciled += 1;
            }
        }
        info!(
            "Cycle at {}: reconciled {} routes, {} new observations, folded {} trips, {} buffered",
            snapshot.now,
            summary.routes_reconciled,
            prettyprint_usize(summary.new_entries),
            prettyprint_usize(summary.folded_trips),
            prettyprint_usize(self.session.len())
        );
        summary
    }

    fn reconcile_route(
        &mut self,
        snapshot: &Snapshot,
        route_id: &RouteID,
        summary: &mut CycleSummary,
    ) -> bool {
        let stops = match snapshot.route_stops.get(route_id) {
            Some(stops) if !stops.is_empty() => stops,
            _ => {
                debug!("No stops for route {route_id} yet");
                return false;
            }
        };
        let schedules = snapshot
            .schedules
            .get(route_id)
            .map(|x| x.as_slice())
            .unwrap_or(&[]);
        let vehicles: Vec<&VehicleReport> = snapshot
            .vehicles_for(route_id, &self.config.offline_comm_statuses)
            .collect();
        if vehicles.is_empty() {
            return false;
        }

        let state = self
            .routes
            .entry(route_id.clone())
            .or_insert(RouteState::Unbuilt);
        if let RouteState::Unbuilt = state {
            match build_chains(schedules, stops) {
                Ok(chains) => {
                    info!("Built {} stop chains for route {route_id}", chains.len());
                    *state = RouteState::Ready(chains);
                }
                Err(err) => {
                    warn!("Can't build stop chains for route {route_id} yet: {err}");
                    return false;
                }
            }
        }
        let chains = match state {
            RouteState::Ready(chains) => chains,
            RouteState::Unbuilt => return false,
        };
        let idx = match select_chain(chains, self.config.chain_selection, snapshot.now) {
            Some(idx) => idx,
            None => return false,
        };

        for vehicle in &vehicles {
            if vehicle.last_stop.trim().is_empty() {
                continue;
            }
            let direction = vehicle.direction();
            let id = feed::lookup_by_name(stops, &vehicle.last_stop).map(|s| s.stop_id.clone());
            let scheduled = id
                .as_ref()
                .map(|id| feed::is_scheduled(schedules, id))
                .unwrap_or(false);
            let entry = StopEntry {
                name: vehicle.last_stop.clone(),
                direction,
                id,
                route_id: route_id.clone(),
                vehicle_id: vehicle.vehicle_id.clone(),
                run_id: vehicle.run_id.clone(),
                trip_id: vehicle.trip_id.clone(),
                scheduled,
                created: snapshot.now,
            };
            if self.session.observe(entry) {
                summary.new_entries += 1;
                for chain in chains.iter_mut() {
                    chain.backfill_direction(&vehicle.last_stop, direction);
                }
            }
        }

        let active: BTreeSet<&VehicleID> = vehicles.iter().map(|v| &v.vehicle_id).collect();
        let chain = &mut chains[idx];
        for (vehicle, mut trips) in self.session.trips(route_id) {
            if trips.len() < 2 && active.contains(&vehicle) {
                continue;
            }
            // The most recent trip is presumably still in progress.
            // TODO A vehicle that vanishes for good leaves this trip buffered forever; expire
            // entries older than some configurable age.
            trips.pop();
            for trip in trips {
                debug!(
                    "Folding {} observations from {vehicle} on trip {}",
                    trip.entries.len(),
                    trip.trip_id
                );
                fold_trip(chain, &trip.entries, &mut summary.stats);
                self.session.discard(route_id, &vehicle, &trip.trip_id);
                summary.folded_trips += 1;
            }
        }
        true
    }
}

fn select_chain(
    chains: &[StopChain],
    selection: ChainSelection,
    now: NaiveDateTime,
) -> Option<usize> {
    if chains.is_empty() {
        return None;
    }
    match selection {
        ChainSelection::First => Some(0),
        ChainSelection::ByWindow => Some(chains.iter().position(|c| c.is_active(now)).unwrap_or(0)),
    }
}
