use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::{RouteID, RunID, TripID, VehicleID, VehicleReport};

/// All vehicle reports from one poll of the API.
pub struct Cycle {
    pub time: NaiveDateTime,
    pub vehicles: Vec<VehicleReport>,
}

/// Reads a CSV log of recorded telemetry, one row per vehicle per poll. Rows polled at the same
/// time become one cycle. Cycles are returned in time order, regardless of the order in the file.
pub fn load<R: std::io::Read>(reader: R) -> Result<Vec<Cycle>> {
    let mut per_time: BTreeMap<NaiveDateTime, Vec<VehicleReport>> = BTreeMap::new();
    let mut skipped = 0;
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let time = NaiveDateTime::parse_from_str(&rec.timestamp, "%Y-%m-%d %H:%M:%S")?;
        if rec.last_stop.trim().is_empty() {
            // Vehicles that just came online haven't passed any stop yet
            skipped += 1;
            continue;
        }
        per_time.entry(time).or_insert_with(Vec::new).push(VehicleReport {
            vehicle_id: rec.vehicle_id,
            route_id: rec.route_id,
            run_id: rec.run_id,
            trip_id: rec.trip_id,
            direction_long: rec.direction_long,
            last_stop: rec.last_stop,
            comm_status: rec.comm_status,
        });
    }
    if skipped > 0 {
        debug!("Skipped {skipped} telemetry rows without a last stop");
    }

    Ok(per_time
        .into_iter()
        .map(|(time, vehicles)| Cycle { time, vehicles })
        .collect())
}

#[derive(Deserialize)]
struct Record {
    timestamp: String,
    route_id: RouteID,
    vehicle_id: VehicleID,
    run_id: RunID,
    trip_id: TripID,
    direction_long: String,
    last_stop: String,
    comm_status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_rows_into_cycles() {
        let input = "\
timestamp,route_id,vehicle_id,run_id,trip_id,direction_long,last_stop,comm_status
2022-07-04 09:01:00,1,bus7,r1,t1,Outbound,Stop 2,GOOD
2022-07-04 09:00:00,1,bus7,r1,t1,Outbound,Stop 1,GOOD
2022-07-04 09:00:00,1,bus8,r2,t5,Inbound,Stop 9,GOOD
2022-07-04 09:01:00,1,bus8,r2,t5,Inbound,,GOOD
";
        let cycles = load(input.as_bytes()).unwrap();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].vehicles.len(), 2);
        assert_eq!(cycles[0].vehicles[0].last_stop, "Stop 1");
        assert_eq!(cycles[1].vehicles.len(), 1);
        assert_eq!(cycles[1].vehicles[0].last_stop, "Stop 2");
        assert!(cycles[0].time < cycles[1].time);
    }

    #[test]
    fn bad_timestamp() {
        let input = "\
timestamp,route_id,vehicle_id,run_id,trip_id,direction_long,last_stop,comm_status
yesterday,1,bus7,r1,t1,Outbound,Stop 2,GOOD
";
        assert!(load(input.as_bytes()).is_err());
    }
}
