use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainSelection {
    /// Always reconcile against the route's first schedule entry, no matter the date or time.
    First,
    /// Use the first schedule entry whose dates and hours cover the snapshot's time, falling back
    /// to the first entry.
    ByWindow,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub chain_selection: ChainSelection,
    /// Vehicles reporting any of these comm statuses are treated as gone
    pub offline_comm_statuses: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // TODO Switch to ByWindow once it's confirmed which schedule entry riders expect to
            // see when windows overlap
            chain_selection: ChainSelection::First,
            offline_comm_statuses: vec!["OFFLINE".to_string()],
        }
    }
}
