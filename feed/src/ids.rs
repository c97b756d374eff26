use std::fmt;

use serde::{Deserialize, Serialize};

// The transit-info API hands out opaque string IDs for everything. Keep them as strings, but don't
// let them get mixed up.

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteID(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopID(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleID(pub String);

/// A run is one driver's shift; a vehicle may serve several runs in a day.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunID(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripID(pub String);

macro_rules! display_inner {
    ($($id:ident),*) => {
        $(
            impl fmt::Display for $id {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<&str> for $id {
                fn from(x: &str) -> Self {
                    Self(x.to_string())
                }
            }
        )*
    };
}

display_inner!(RouteID, StopID, VehicleID, RunID, TripID);
