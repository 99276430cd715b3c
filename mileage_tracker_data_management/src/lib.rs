use const_format::concatcp;
use mileage_tracker_lib::{DistanceTableError, LedgerError};

pub mod database;
pub mod store;
mod data_manager;
mod ledger_registry;
mod ledger_service;

pub use data_manager::*;
pub use ledger_registry::LedgerRegistry;
pub use ledger_service::LedgerService;

pub const DATA_DIR: &str = "data/";
pub const DATABASE_PATH: &str = concatcp!(DATA_DIR, "mileage.db");

#[derive(Debug, thiserror::Error)]
pub enum DataManagerError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("database error: {0}")]
    Database(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("Email already registered.")]
    EmailTaken(String),

    #[error("Trip {0} not found.")]
    TripNotFound(i64),

    #[error(transparent)]
    DistanceTable(#[from] DistanceTableError),
}
