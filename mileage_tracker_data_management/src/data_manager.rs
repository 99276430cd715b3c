use std::path::{Path, PathBuf};

use mileage_tracker_lib::{DistanceTable, Ledger, LedgerSummary, ReimbursementRate, Report, Trip, User};

use crate::{database::MileageDatabase, ledger_service::LedgerService, DataManagerError, DATABASE_PATH};

#[derive(Clone)]
pub struct DataManager {
    pub(crate) database: MileageDatabase,
    pub(crate) ledgers: LedgerService<MileageDatabase>,
}

/// The public interface for all mileage tracker data management.
impl DataManager {
    pub async fn start(database_path: &Path, distance_table: DistanceTable, rate: ReimbursementRate) -> Result<Self, DataManagerError> {
        // Create data dir if it doesn't exist
        if let Some(data_dir) = database_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            if !data_dir.exists() {
                std::fs::create_dir_all(data_dir)
                    .map_err(|e| DataManagerError::Database(format!("Failed to create data directory {:?}: {e}", data_dir)))?;
            }
        }

        let database = MileageDatabase::connect(database_path).await?;
        tracing::info!("Opened database at {:?} ({} routes, ${}/mile)", database_path, distance_table.len(), rate.per_mile());

        Ok(DataManager {
            ledgers: LedgerService::new(database.clone(), distance_table, rate),
            database,
        })
    }

    /// `<project root>/data/mileage.db`, relative to the working directory if the root can't be found.
    pub fn default_database_path() -> PathBuf {
        let root = project_root::get_project_root().unwrap_or_else(|_| PathBuf::from("."));
        root.join(DATABASE_PATH)
    }

    pub fn distance_table(&self) -> &DistanceTable {
        self.ledgers.distance_table()
    }

    pub fn rate(&self) -> ReimbursementRate {
        self.ledgers.rate()
    }

    /// Emails are matched case-insensitively, so they are stored trimmed and lowercased.
    pub async fn register_user(&self, email: &str, password_hash: &str) -> Result<User, DataManagerError> {
        let user = self.database.insert_user(&normalize_email(email), password_hash).await?;
        tracing::info!("Registered user {} ({})", user.user_id, user.email);
        Ok(user)
    }

    pub async fn find_user(&self, email: &str) -> Result<Option<User>, DataManagerError> {
        self.database.get_user_by_email(&normalize_email(email)).await
    }

    pub async fn add_trip(&self, owner_id: i64, origin: Option<&str>, destination: Option<&str>) -> Result<Trip, DataManagerError> {
        self.ledgers.add_trip(owner_id, origin, destination).await
    }

    pub async fn remove_trip(&self, owner_id: i64, trip_id: i64) -> Result<Trip, DataManagerError> {
        self.ledgers.remove_trip(owner_id, trip_id).await
    }

    pub async fn remove_all_trips(&self, owner_id: i64) -> Result<usize, DataManagerError> {
        self.ledgers.remove_all(owner_id).await
    }

    pub async fn get_trips(&self, owner_id: i64) -> Result<Vec<Trip>, DataManagerError> {
        self.ledgers.trips(owner_id).await
    }

    pub async fn get_ledger(&self, owner_id: i64) -> Result<Ledger, DataManagerError> {
        self.ledgers.snapshot(owner_id).await
    }

    pub async fn get_summary(&self, owner_id: i64) -> Result<LedgerSummary, DataManagerError> {
        self.ledgers.summary(owner_id).await
    }

    pub async fn export_report(&self, owner_id: i64) -> Result<Report, DataManagerError> {
        self.ledgers.export_report(owner_id).await
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
