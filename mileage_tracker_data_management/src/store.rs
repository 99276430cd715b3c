use std::{
    collections::HashMap,
    future::Future,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use mileage_tracker_lib::{NewTrip, Trip};
use tokio::sync::Mutex;

use crate::{database::MileageDatabase, DataManagerError};

/// Persistence for per-owner trip sequences.
///
/// Writes must be durable before they return `Ok`; callers only commit in-memory state afterwards.
pub trait TripStore: Clone + Send + Sync + 'static {
    /// Every trip of the owner, oldest first.
    fn load_all(&self, owner_id: i64) -> impl Future<Output = Result<Vec<Trip>, DataManagerError>> + Send;

    /// Stores a trip at the end of the owner's sequence and assigns its id.
    fn append_one(&self, owner_id: i64, trip: &NewTrip) -> impl Future<Output = Result<Trip, DataManagerError>> + Send;

    fn remove_one(&self, owner_id: i64, trip_id: i64) -> impl Future<Output = Result<bool, DataManagerError>> + Send;

    fn clear_all(&self, owner_id: i64) -> impl Future<Output = Result<(), DataManagerError>> + Send;
}

impl TripStore for MileageDatabase {
    async fn load_all(&self, owner_id: i64) -> Result<Vec<Trip>, DataManagerError> {
        self.get_trips(owner_id).await
    }

    async fn append_one(&self, owner_id: i64, trip: &NewTrip) -> Result<Trip, DataManagerError> {
        self.insert_trip(owner_id, trip).await
    }

    async fn remove_one(&self, owner_id: i64, trip_id: i64) -> Result<bool, DataManagerError> {
        self.delete_trip(owner_id, trip_id).await
    }

    async fn clear_all(&self, owner_id: i64) -> Result<(), DataManagerError> {
        self.delete_trips(owner_id).await.map(|_| ())
    }
}

/// Keeps each owner's whole trip list as one opaque blob, the way a browser keeps it in local storage.
///
/// Every mutation rewrites the blob; clearing deletes it.
#[derive(Clone, Default)]
pub struct MemoryTripStore {
    blob_map: Arc<Mutex<HashMap<i64, Vec<u8>>>>,
    last_id: Arc<AtomicI64>,
}

impl MemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn decode(blob: Option<&Vec<u8>>) -> Result<Vec<Trip>, DataManagerError> {
        match blob {
            Some(bytes) => bincode::deserialize(bytes)
                .map_err(|e| DataManagerError::Storage(format!("Failed to decode trips: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    fn encode(trips: &[Trip]) -> Result<Vec<u8>, DataManagerError> {
        bincode::serialize(trips).map_err(|e| DataManagerError::Storage(format!("Failed to encode trips: {e}")))
    }
}

impl TripStore for MemoryTripStore {
    async fn load_all(&self, owner_id: i64) -> Result<Vec<Trip>, DataManagerError> {
        let blob_map = self.blob_map.lock().await;
        Self::decode(blob_map.get(&owner_id))
    }

    async fn append_one(&self, owner_id: i64, trip: &NewTrip) -> Result<Trip, DataManagerError> {
        let mut blob_map = self.blob_map.lock().await;
        let mut trips = Self::decode(blob_map.get(&owner_id))?;

        let trip = trip.clone().with_id(self.last_id.fetch_add(1, Ordering::Relaxed) + 1);
        trips.push(trip.clone());
        blob_map.insert(owner_id, Self::encode(&trips)?);

        Ok(trip)
    }

    async fn remove_one(&self, owner_id: i64, trip_id: i64) -> Result<bool, DataManagerError> {
        let mut blob_map = self.blob_map.lock().await;
        let mut trips = Self::decode(blob_map.get(&owner_id))?;

        let Some(index) = trips.iter().position(|trip| trip.trip_id == trip_id) else {
            return Ok(false);
        };
        trips.remove(index);

        if trips.is_empty() {
            blob_map.remove(&owner_id);
        } else {
            blob_map.insert(owner_id, Self::encode(&trips)?);
        }

        Ok(true)
    }

    async fn clear_all(&self, owner_id: i64) -> Result<(), DataManagerError> {
        self.blob_map.lock().await.remove(&owner_id);
        Ok(())
    }
}
