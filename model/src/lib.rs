//! Infers the order of stops along each route from what vehicles report, reconciled against the
//! published schedule.
//!
//! Vehicles only tell us the name of the last stop they passed. Over many poll cycles, those
//! observations get grouped into trips, and finished trips are folded into a linked chain of stop
//! nodes per schedule entry. Stops the schedule doesn't know about get inserted; duplicates get
//! merged. The result is best-effort and converges over time.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod builder;
mod chain;
mod config;
mod engine;
mod fold;
mod node;
pub mod policy;
mod queue;
mod session;
mod status;

pub use builder::build_chains;
pub use chain::StopChain;
pub use config::{ChainSelection, EngineConfig};
pub use engine::{CycleSummary, Engine, RouteState};
pub use fold::fold_trip;
pub use node::{node_name, NodeID, StopNode};
pub use queue::{CycleQueue, CycleSender};
pub use session::{PendingTrip, Session, StopEntry};
pub use status::RouteStatus;
