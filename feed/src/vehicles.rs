use serde::{Deserialize, Serialize};

use crate::{RouteID, RunID, TripID, VehicleID};

/// The most recent telemetry for one vehicle, as the transit-info API reports it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleReport {
    pub vehicle_id: VehicleID,
    pub route_id: RouteID,
    pub run_id: RunID,
    pub trip_id: TripID,
    /// Free text like "Outbound" or "Inbound"
    pub direction_long: String,
    /// The name of the last stop the vehicle passed, not an ID
    pub last_stop: String,
    /// Things like "GOOD" or "OFFLINE"
    pub comm_status: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outbound,
    Inbound,
    Unknown,
}

impl Direction {
    pub fn parse(x: &str) -> Self {
        let x = x.trim();
        if x.eq_ignore_ascii_case("outbound") {
            Direction::Outbound
        } else if x.eq_ignore_ascii_case("inbound") {
            Direction::Inbound
        } else {
            Direction::Unknown
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Direction::Outbound => "outbound",
            Direction::Inbound => "inbound",
            Direction::Unknown => "unknown",
        }
    }

    pub fn is_known(self) -> bool {
        self != Direction::Unknown
    }
}

impl VehicleReport {
    pub fn direction(&self) -> Direction {
        Direction::parse(&self.direction_long)
    }

    /// True if the comm status matches any of the given statuses, ignoring case.
    pub fn is_offline(&self, offline_statuses: &[String]) -> bool {
        offline_statuses
            .iter()
            .any(|x| x.eq_ignore_ascii_case(self.comm_status.trim()))
    }
}
