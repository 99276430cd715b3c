//! Request and response bodies of the HTTP API.

use chrono::{DateTime, Utc};
use mileage_tracker_lib::{Ledger, Trip};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// Both fields, or `None` if either is missing or blank.
    pub fn present(&self) -> Option<(&str, &str)> {
        let email = self.email.as_deref().map(str::trim).filter(|email| !email.is_empty())?;
        let password = self.password.as_deref().filter(|password| !password.is_empty())?;
        Some((email, password))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse<'a> {
    pub origins: Vec<&'a str>,
    pub destinations: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct DistanceQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DistanceResponse {
    pub from: String,
    pub to: String,
    pub miles: f64,
}

/// A trip as the client sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDto {
    pub id: i64,
    pub from_school: String,
    pub to_school: String,
    pub miles: f64,
    pub date: DateTime<Utc>,
}

impl From<Trip> for TripDto {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.trip_id,
            from_school: trip.origin,
            to_school: trip.destination,
            miles: trip.miles,
            date: trip.timestamp,
        }
    }
}

/// Only the two school names are read; any `miles` or `date` the client sends is ignored.
#[derive(Debug, Deserialize)]
pub struct NewTripRequest {
    #[serde(default)]
    pub from_school: Option<String>,
    #[serde(default)]
    pub to_school: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TripsResponse {
    pub trips: Vec<TripDto>,
    pub total_miles: f64,
    pub total_reimbursement: f64,
    pub rate_per_mile: f64,
}

impl TripsResponse {
    pub fn new(ledger: Ledger) -> Self {
        let summary = ledger.summary();
        Self {
            trips: ledger.trips().iter().cloned().map(TripDto::from).collect(),
            total_miles: summary.total_miles,
            total_reimbursement: summary.total_reimbursement,
            rate_per_mile: summary.rate_per_mile,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClearQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}
