use chrono::{NaiveDate, NaiveDateTime};

use feed::ScheduledStops;

/// What to tell riders about a route right now.
#[derive(Clone, Debug, PartialEq)]
pub enum RouteStatus {
    Running { vehicles: usize },
    /// The route operates today, but nothing is reporting
    NotRunningNow,
    /// Off-season; service starts again on this date
    ResumesOn(NaiveDate),
    Ended,
}

impl RouteStatus {
    pub fn new(schedules: &[ScheduledStops], active_vehicles: usize, now: NaiveDateTime) -> Self {
        if active_vehicles > 0 {
            return RouteStatus::Running {
                vehicles: active_vehicles,
            };
        }
        let today = now.date();
        if schedules.iter().any(|s| s.dates.contains(today)) {
            return RouteStatus::NotRunningNow;
        }
        match schedules
            .iter()
            .map(|s| s.dates.begin)
            .filter(|begin| *begin > today)
            .min()
        {
            Some(date) => RouteStatus::ResumesOn(date),
            None => RouteStatus::Ended,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            RouteStatus::Running { vehicles: 1 } => "1 vehicle running".to_string(),
            RouteStatus::Running { vehicles } => format!("{vehicles} vehicles running"),
            RouteStatus::NotRunningNow => "No vehicles currently scheduled".to_string(),
            RouteStatus::ResumesOn(date) => {
                format!("Service resumes on {}", date.format("%A, %B %-d"))
            }
            RouteStatus::Ended => "Service has ended for the season".to_string(),
        }
    }
}
