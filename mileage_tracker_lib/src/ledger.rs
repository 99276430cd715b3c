use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    distance_table::DistanceTable,
    reimbursement::ReimbursementRate,
    report::Report,
    trip::{NewTrip, Trip},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Please select both schools.")]
    MissingSelection,

    #[error("You cannot select the same school for both ({0}).")]
    SameLocation(String),

    #[error("No mileage data found for the route {origin} -> {destination}.")]
    UnknownRoute { origin: String, destination: String },

    #[error("No trips to export.")]
    EmptyLedger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    Empty,
    Populated,
}

/// Aggregate figures for a ledger, all derived from its trips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub trip_count: usize,
    pub total_miles: f64,
    pub total_reimbursement: f64,
    pub rate_per_mile: f64,
}

/// An owner's trips in insertion order.
///
/// Totals are never stored; every read recomputes them from the trip list.
#[derive(Debug, Clone)]
pub struct Ledger {
    trips: Vec<Trip>,
    rate: ReimbursementRate,
}

impl Ledger {
    pub fn new(rate: ReimbursementRate) -> Self {
        Self { trips: Vec::new(), rate }
    }

    /// Rebuilds a ledger from stored trips, keeping their order.
    pub fn with_trips(rate: ReimbursementRate, trips: Vec<Trip>) -> Self {
        Self { trips, rate }
    }

    pub fn rate(&self) -> ReimbursementRate {
        self.rate
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn state(&self) -> LedgerState {
        if self.trips.is_empty() {
            LedgerState::Empty
        } else {
            LedgerState::Populated
        }
    }

    /// Validates a selection against the distance table and resolves its distance.
    ///
    /// Blank names count as unset. Nothing is appended; see [`Ledger::commit`].
    pub fn prepare_trip(
        table: &DistanceTable,
        origin: Option<&str>,
        destination: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Result<NewTrip, LedgerError> {
        fn selected(name: Option<&str>) -> Option<&str> {
            name.map(str::trim).filter(|name| !name.is_empty())
        }

        let (Some(origin), Some(destination)) = (selected(origin), selected(destination)) else {
            return Err(LedgerError::MissingSelection);
        };

        if origin == destination {
            return Err(LedgerError::SameLocation(origin.to_string()));
        }

        let Some(miles) = table.lookup(origin, destination) else {
            return Err(LedgerError::UnknownRoute {
                origin: origin.to_string(),
                destination: destination.to_string(),
            });
        };

        Ok(NewTrip {
            origin: origin.to_string(),
            destination: destination.to_string(),
            miles,
            timestamp,
        })
    }

    /// Appends a trip that has already been persisted.
    pub fn commit(&mut self, trip: Trip) {
        self.trips.push(trip);
    }

    /// Validates and appends a trip without any storage, numbering it after the highest local id.
    ///
    /// Ids are only unique among the current trips: removing the highest one frees its id for the next add.
    pub fn add_trip(
        &mut self,
        table: &DistanceTable,
        origin: Option<&str>,
        destination: Option<&str>,
    ) -> Result<Trip, LedgerError> {
        let new_trip = Self::prepare_trip(table, origin, destination, Utc::now())?;
        let next_id = self.trips.iter().map(|trip| trip.trip_id).max().unwrap_or(0) + 1;

        let trip = new_trip.with_id(next_id);
        self.commit(trip.clone());
        Ok(trip)
    }

    pub fn remove_trip(&mut self, trip_id: i64) -> Option<Trip> {
        let index = self.trips.iter().position(|trip| trip.trip_id == trip_id)?;
        Some(self.trips.remove(index))
    }

    /// Drops every trip, returning how many were removed.
    pub fn remove_all(&mut self) -> usize {
        let removed = self.trips.len();
        self.trips.clear();
        removed
    }

    pub fn total_miles(&self) -> f64 {
        self.trips.iter().fold(0., |total, trip| total + trip.miles)
    }

    pub fn total_reimbursement(&self) -> f64 {
        self.rate.reimbursement_for(self.total_miles())
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            trip_count: self.trips.len(),
            total_miles: self.total_miles(),
            total_reimbursement: self.total_reimbursement(),
            rate_per_mile: self.rate.per_mile(),
        }
    }

    pub fn export_report(&self) -> Result<Report, LedgerError> {
        Report::from_trips(&self.trips, self.rate)
    }
}
