use std::{collections::HashMap, sync::Arc};

use mileage_tracker_lib::{Ledger, ReimbursementRate};
use tokio::sync::{Mutex, OnceCell, RwLock};

use crate::{store::TripStore, DataManagerError};

type LedgerSlot = Arc<OnceCell<Arc<RwLock<Ledger>>>>;

/**
 * LedgerRegistry holds one ledger per owner, loaded from storage the first time the owner is seen.
 * Each ledger sits behind its own lock so that mutations of one owner never block another.
 * The map lock is only held to find an owner's slot; loading happens on the slot itself.
 */
#[derive(Clone, Default)]
pub struct LedgerRegistry {
    ledger_map: Arc<Mutex<HashMap<i64, LedgerSlot>>>,
}

impl LedgerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_load<S: TripStore>(&self, store: &S, owner_id: i64, rate: ReimbursementRate) -> Result<Arc<RwLock<Ledger>>, DataManagerError> {
        let slot = self.ledger_map.lock().await.entry(owner_id).or_default().clone();

        // Concurrent first requests for one owner wait here for a single load; a failed load leaves the slot empty.
        let ledger = slot
            .get_or_try_init(|| async {
                let trips = store.load_all(owner_id).await?;
                tracing::debug!("Loaded ledger for owner {} with {} trips", owner_id, trips.len());
                Ok::<_, DataManagerError>(Arc::new(RwLock::new(Ledger::with_trips(rate, trips))))
            })
            .await?;

        Ok(ledger.clone())
    }

    pub async fn len(&self) -> usize {
        self.ledger_map.lock().await.len()
    }
}
