//! The read-only view of the transit-info API that the rest of the system consumes: routes, their
//! stops and published schedules, and live vehicle telemetry.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod ids;
pub mod replay;
mod routes;
mod schedule;
mod snapshot;
mod vehicles;

pub use ids::{RouteID, RunID, StopID, TripID, VehicleID};
pub use routes::{bounds, lookup_by_name, Route, RouteStop};
pub use schedule::{is_scheduled, DateRange, HourRange, ScheduledStop, ScheduledStops};
pub use snapshot::Snapshot;
pub use vehicles::{Direction, VehicleReport};
