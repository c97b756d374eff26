use serde::{Deserialize, Serialize};

use feed::{Direction, StopID};

/// Index of a node within its StopChain. Never reused after a node is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeID(pub usize);

/// One physical stop, as visited in one direction along a route.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StopNode {
    pub name: String,
    /// None for stops only ever seen in vehicle reports that couldn't be resolved
    pub id: Option<StopID>,
    pub direction: Direction,
    /// Seeded from the published schedule, rather than inferred from vehicles
    pub scheduled: bool,

    // These don't own anything; all nodes belong to the StopChain
    pub upstream: Option<NodeID>,
    pub downstream: Option<NodeID>,
}

impl StopNode {
    pub fn new(
        name: String,
        scheduled: bool,
        id: Option<StopID>,
        direction: Option<Direction>,
    ) -> Self {
        Self {
            name,
            id,
            direction: direction.unwrap_or(Direction::Unknown),
            scheduled,
            upstream: None,
            downstream: None,
        }
    }

    /// Name and direction together identify a node within a chain.
    pub fn node_name(&self) -> String {
        node_name(&self.name, self.direction)
    }

    pub fn is_first(&self) -> bool {
        self.scheduled && self.upstream.is_none() && self.direction == Direction::Outbound
    }

    pub fn is_last(&self) -> bool {
        self.scheduled && self.downstream.is_none() && self.direction == Direction::Inbound
    }
}

pub fn node_name(name: &str, direction: Direction) -> String {
    format!("{}-{}", name, direction.tag())
}
