use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::StopID;

/// One entry of a route's published schedule. A seasonal route usually has a few of these, like
/// weekday versus weekend service, or early versus peak season.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduledStops {
    pub dates: DateRange,
    pub hours: HourRange,
    /// In the order a vehicle visits them. The same stop may appear twice, once per direction.
    pub stops: Vec<ScheduledStop>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduledStop {
    pub id: StopID,
}

/// Inclusive on both ends
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HourRange {
    pub first: NaiveTime,
    pub last: NaiveTime,
}

impl ScheduledStops {
    pub fn is_active(&self, now: NaiveDateTime) -> bool {
        self.dates.contains(now.date()) && self.hours.contains(now.time())
    }

    pub fn contains_stop(&self, id: &StopID) -> bool {
        self.stops.iter().any(|stop| &stop.id == id)
    }
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.begin && date <= self.end
    }
}

impl HourRange {
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.first <= self.last {
            time >= self.first && time <= self.last
        } else {
            // Late-night service wraps past midnight
            time >= self.first || time <= self.last
        }
    }
}

/// Is this stop part of any of the route's schedules, regardless of date?
pub fn is_scheduled(schedules: &[ScheduledStops], id: &StopID) -> bool {
    schedules.iter().any(|s| s.contains_stop(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, m, d).unwrap()
    }

    #[test]
    fn hours_wrap_past_midnight() {
        let daytime = HourRange {
            first: time(7, 0),
            last: time(19, 30),
        };
        assert!(daytime.contains(time(7, 0)));
        assert!(daytime.contains(time(12, 0)));
        assert!(!daytime.contains(time(20, 0)));

        let late = HourRange {
            first: time(18, 0),
            last: time(1, 0),
        };
        assert!(late.contains(time(23, 0)));
        assert!(late.contains(time(0, 30)));
        assert!(!late.contains(time(12, 0)));
    }

    #[test]
    fn active_needs_date_and_hour() {
        let schedule = ScheduledStops {
            dates: DateRange {
                begin: date(6, 15),
                end: date(9, 5),
            },
            hours: HourRange {
                first: time(7, 0),
                last: time(19, 0),
            },
            stops: vec![ScheduledStop { id: "1".into() }],
        };
        assert!(schedule.is_active(date(7, 4).and_time(time(9, 0))));
        assert!(!schedule.is_active(date(7, 4).and_time(time(22, 0))));
        assert!(!schedule.is_active(date(10, 1).and_time(time(9, 0))));
        assert!(schedule.contains_stop(&"1".into()));
        assert!(!schedule.contains_stop(&"2".into()));
    }
}
