use std::sync::Arc;

use chrono::Utc;
use mileage_tracker_lib::{DistanceTable, Ledger, LedgerSummary, ReimbursementRate, Report, Trip};

use crate::{ledger_registry::LedgerRegistry, store::TripStore, DataManagerError};

/// Ledger operations with write-through persistence.
///
/// Mutations hold the owner's write lock across the storage call and only touch the
/// in-memory ledger once storage has succeeded. Reads share the read lock.
#[derive(Clone)]
pub struct LedgerService<S: TripStore> {
    store: S,
    distance_table: Arc<DistanceTable>,
    rate: ReimbursementRate,
    registry: LedgerRegistry,
}

impl<S: TripStore> LedgerService<S> {
    pub fn new(store: S, distance_table: DistanceTable, rate: ReimbursementRate) -> Self {
        Self {
            store,
            distance_table: Arc::new(distance_table),
            rate,
            registry: LedgerRegistry::new(),
        }
    }

    pub fn distance_table(&self) -> &DistanceTable {
        &self.distance_table
    }

    pub fn rate(&self) -> ReimbursementRate {
        self.rate
    }

    pub async fn add_trip(&self, owner_id: i64, origin: Option<&str>, destination: Option<&str>) -> Result<Trip, DataManagerError> {
        let ledger = self.registry.get_or_load(&self.store, owner_id, self.rate).await?;
        let mut ledger = ledger.write().await;

        let new_trip = Ledger::prepare_trip(&self.distance_table, origin, destination, Utc::now())?;

        let trip = match self.store.append_one(owner_id, &new_trip).await {
            Ok(trip) => trip,
            Err(err) => {
                tracing::error!("Failed to store trip for owner {}: {}", owner_id, err);
                // Storage may or may not hold the row now.
                self.reload(owner_id, &mut ledger).await;
                return Err(err);
            }
        };

        ledger.commit(trip.clone());
        tracing::info!("Owner {} logged trip {} ({} -> {}, {} mi)", owner_id, trip.trip_id, trip.origin, trip.destination, trip.miles);

        Ok(trip)
    }

    pub async fn remove_trip(&self, owner_id: i64, trip_id: i64) -> Result<Trip, DataManagerError> {
        let ledger = self.registry.get_or_load(&self.store, owner_id, self.rate).await?;
        let mut ledger = ledger.write().await;

        if !ledger.trips().iter().any(|trip| trip.trip_id == trip_id) {
            return Err(DataManagerError::TripNotFound(trip_id));
        }

        if !self.store.remove_one(owner_id, trip_id).await? {
            // Cache and storage disagree; trust storage.
            self.reload(owner_id, &mut ledger).await;
            return Err(DataManagerError::TripNotFound(trip_id));
        }

        let trip = ledger.remove_trip(trip_id).ok_or(DataManagerError::TripNotFound(trip_id))?;
        tracing::info!("Owner {} removed trip {}", owner_id, trip_id);

        Ok(trip)
    }

    /// Clears every trip of the owner. Confirmation is the caller's job.
    pub async fn remove_all(&self, owner_id: i64) -> Result<usize, DataManagerError> {
        let ledger = self.registry.get_or_load(&self.store, owner_id, self.rate).await?;
        let mut ledger = ledger.write().await;

        self.store.clear_all(owner_id).await.inspect_err(|err| {
            tracing::error!("Failed to clear trips for owner {}: {}", owner_id, err);
        })?;

        let removed = ledger.remove_all();
        tracing::info!("Owner {} cleared {} trips", owner_id, removed);

        Ok(removed)
    }

    /// Replaces the cached trips with what storage holds. Must be called with the owner's write lock held,
    /// so every request sharing this ledger sees the refreshed list.
    async fn reload(&self, owner_id: i64, ledger: &mut Ledger) {
        match self.store.load_all(owner_id).await {
            Ok(trips) => *ledger = Ledger::with_trips(self.rate, trips),
            Err(err) => tracing::error!("Failed to reload trips for owner {}: {}", owner_id, err),
        }
    }

    pub async fn trips(&self, owner_id: i64) -> Result<Vec<Trip>, DataManagerError> {
        let ledger = self.registry.get_or_load(&self.store, owner_id, self.rate).await?;
        let trips = ledger.read().await.trips().to_vec();
        Ok(trips)
    }

    /// A copy of the whole ledger, for reading trips and totals consistently.
    pub async fn snapshot(&self, owner_id: i64) -> Result<Ledger, DataManagerError> {
        let ledger = self.registry.get_or_load(&self.store, owner_id, self.rate).await?;
        let snapshot = ledger.read().await.clone();
        Ok(snapshot)
    }

    pub async fn summary(&self, owner_id: i64) -> Result<LedgerSummary, DataManagerError> {
        let ledger = self.registry.get_or_load(&self.store, owner_id, self.rate).await?;
        let summary = ledger.read().await.summary();
        Ok(summary)
    }

    pub async fn export_report(&self, owner_id: i64) -> Result<Report, DataManagerError> {
        let ledger = self.registry.get_or_load(&self.store, owner_id, self.rate).await?;
        let report = ledger.read().await.export_report()?;
        Ok(report)
    }
}
