use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One logged journey. The distance is copied from the distance table when the trip is created.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Trip {
    #[cfg_attr(feature = "sqlx", sqlx(rename = "id"))]
    pub trip_id: i64,
    pub origin: String,
    pub destination: String,
    pub miles: f64,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "date"))]
    pub timestamp: DateTime<Utc>,
}

impl Trip {
    pub fn new(trip_id: i64, origin: String, destination: String, miles: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            trip_id,
            origin,
            destination,
            miles,
            timestamp,
        }
    }

    /// Calendar date of the trip (UTC), as shown in reports.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// A validated trip that storage has not assigned an id to yet.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewTrip {
    pub origin: String,
    pub destination: String,
    pub miles: f64,
    pub timestamp: DateTime<Utc>,
}

impl NewTrip {
    pub fn with_id(self, trip_id: i64) -> Trip {
        Trip::new(trip_id, self.origin, self.destination, self.miles, self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn date_drops_time_of_day() {
        let timestamp = Utc.with_ymd_and_hms(2025, 3, 14, 23, 59, 0).unwrap();
        let trip = NewTrip {
            origin: "A".into(),
            destination: "B".into(),
            miles: 1.5,
            timestamp,
        }
        .with_id(7);

        assert_eq!(trip.trip_id, 7);
        assert_eq!(trip.date(), NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
    }
}
