use geom::{GPSBounds, LonLat};
use serde::{Deserialize, Serialize};

use crate::{RouteID, StopID};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Route {
    pub route_id: RouteID,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub description: Option<String>,
    /// Hex color used to draw the route, like "1F6FB2"
    pub color: Option<String>,
}

impl Route {
    pub fn describe(&self) -> String {
        self.short_name
            .as_ref()
            .or(self.long_name.as_ref())
            .or(self.description.as_ref())
            .map(|x| x.to_string())
            .unwrap_or_else(|| self.route_id.to_string())
    }
}

/// Metadata about one stop served by a route. The same physical stop may be listed under several
/// routes.
#[derive(Clone, Debug, Deserialize)]
#[serde(from = "Record")]
pub struct RouteStop {
    pub stop_id: StopID,
    pub name: String,
    pub pos: LonLat,
}

impl From<Record> for RouteStop {
    fn from(rec: Record) -> Self {
        Self {
            stop_id: rec.stop_id,
            name: rec.name,
            pos: LonLat::new(rec.longitude, rec.latitude),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Record {
    stop_id: StopID,
    name: String,
    latitude: f64,
    longitude: f64,
}

/// Used to frame the map around a route.
pub fn bounds(stops: &[RouteStop]) -> GPSBounds {
    let mut gps_bounds = GPSBounds::new();
    for stop in stops {
        gps_bounds.update(stop.pos);
    }
    gps_bounds
}

/// Resolves a stop name, as vehicles report it, to the route's stop ID.
pub fn lookup_by_name<'a>(stops: &'a [RouteStop], name: &str) -> Option<&'a RouteStop> {
    stops.iter().find(|stop| stop.name == name)
}
