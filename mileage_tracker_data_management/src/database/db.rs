use std::path::Path;

use const_format::concatcp;
use mileage_tracker_lib::{NewTrip, Trip, User};
use sqlx::{query, query_as, sqlite::SqliteConnectOptions, Executor, Pool, Sqlite, SqlitePool};

use crate::DataManagerError;

use super::constants::*;

const TRIP_COLUMNS: &str = concatcp!(TRIP_ID, ", ", ORIGIN, ", ", DESTINATION, ", ", MILES, ", ", DATE);

#[derive(Clone)]
pub struct MileageDatabase {
    pool: Pool<Sqlite>,
}

impl MileageDatabase {
    /// Opens (or creates) the SQLite file at `path` and makes sure the tables exist.
    pub async fn connect(path: &Path) -> Result<Self, DataManagerError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await
            .map_err(|e| DataManagerError::Database(format!("Failed to connect to database {}: {e}", path.display())))?;

        let db = Self {
            pool
        };

        db.init().await?;

        Ok(db)
    }

    async fn init(&self) -> Result<(), DataManagerError> {
        self.pool.execute(concatcp!("
            CREATE TABLE IF NOT EXISTS ", USERS_TABLE_NAME, "(",
                USER_ID,       " INTEGER PRIMARY KEY AUTOINCREMENT,",
                EMAIL,         " TEXT UNIQUE NOT NULL,",
                PASSWORD_HASH, " TEXT NOT NULL);

            CREATE TABLE IF NOT EXISTS ", TRIPS_TABLE_NAME, "(",
                TRIP_ID,     " INTEGER PRIMARY KEY AUTOINCREMENT,",
                OWNER_ID,    " INTEGER NOT NULL,",
                ORIGIN,      " TEXT NOT NULL,",
                DESTINATION, " TEXT NOT NULL,",
                MILES,       " REAL NOT NULL,",
                DATE,        " TIMESTAMP NOT NULL,
                FOREIGN KEY(", OWNER_ID, ") REFERENCES ", USERS_TABLE_NAME, "(", USER_ID, ") ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS trips_by_owner ON ", TRIPS_TABLE_NAME, "(", OWNER_ID, ")"))
            .await
            .map_err(|e| DataManagerError::Database(format!("Failed to create tables: {e}")))?;

        Ok(())
    }

    pub async fn insert_user(&self, email: &str, password_hash: &str) -> Result<User, DataManagerError> {
        let inserted = query_as::<_, (i64,)>(concatcp!("
            INSERT INTO ", USERS_TABLE_NAME, "(", EMAIL, ", ", PASSWORD_HASH, ")
            VALUES (?1, ?2) RETURNING ", USER_ID))
                .bind(email)
                .bind(password_hash)
                .fetch_one(&self.pool).await;

        match inserted {
            Ok((user_id,)) => Ok(User {
                user_id,
                email: email.to_string(),
                password_hash: password_hash.to_string(),
            }),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(DataManagerError::EmailTaken(email.to_string()))
            }
            Err(e) => Err(DataManagerError::Database(format!("Failed to insert user: {e}"))),
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DataManagerError> {
        query_as::<_, User>(concatcp!("SELECT ", USER_ID, ", ", EMAIL, ", ", PASSWORD_HASH, " FROM ", USERS_TABLE_NAME, " WHERE ", EMAIL, " = ?1"))
            .bind(email)
            .fetch_optional(&self.pool).await
            .map_err(|e| DataManagerError::Database(format!("Failed to get user: {e}")))
    }

    pub async fn insert_trip(&self, owner_id: i64, trip: &NewTrip) -> Result<Trip, DataManagerError> {
        let trip_id = query_as::<_, (i64,)>(concatcp!("
            INSERT INTO ", TRIPS_TABLE_NAME, "(",
            OWNER_ID, ", ", ORIGIN, ", ", DESTINATION, ", ", MILES, ", ", DATE, ")
            VALUES (?1, ?2, ?3, ?4, ?5) RETURNING ", TRIP_ID))
                .bind(owner_id)
                .bind(&trip.origin)
                .bind(&trip.destination)
                .bind(trip.miles)
                .bind(trip.timestamp)
                .fetch_one(&self.pool).await
                .map_err(|e| DataManagerError::Database(format!("Failed to insert trip: {e}")))
                .map(|row| row.0)?;

        Ok(trip.clone().with_id(trip_id))
    }

    /// All trips of one owner in insertion order.
    pub async fn get_trips(&self, owner_id: i64) -> Result<Vec<Trip>, DataManagerError> {
        query_as::<_, Trip>(concatcp!("SELECT ", TRIP_COLUMNS, " FROM ", TRIPS_TABLE_NAME, " WHERE ", OWNER_ID, " = ?1 ORDER BY ", TRIP_ID))
            .bind(owner_id)
            .fetch_all(&self.pool).await
            .map_err(|e| DataManagerError::Database(format!("Failed to get trips: {e}")))
    }

    /// Returns false if the owner has no trip with that id.
    pub async fn delete_trip(&self, owner_id: i64, trip_id: i64) -> Result<bool, DataManagerError> {
        query(concatcp!("DELETE FROM ", TRIPS_TABLE_NAME, " WHERE ", OWNER_ID, " = ?1 AND ", TRIP_ID, " = ?2"))
            .bind(owner_id)
            .bind(trip_id)
            .execute(&self.pool).await
            .map_err(|e| DataManagerError::Database(format!("Failed to delete trip: {e}")))
            .map(|result| result.rows_affected() > 0)
    }

    pub async fn delete_trips(&self, owner_id: i64) -> Result<u64, DataManagerError> {
        query(concatcp!("DELETE FROM ", TRIPS_TABLE_NAME, " WHERE ", OWNER_ID, " = ?1"))
            .bind(owner_id)
            .execute(&self.pool).await
            .map_err(|e| DataManagerError::Database(format!("Failed to delete trips: {e}")))
            .map(|result| result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    async fn database() -> (tempfile::TempDir, MileageDatabase) {
        let dir = tempfile::tempdir().unwrap();
        let db = MileageDatabase::connect(&dir.path().join("test.db")).await.unwrap();
        (dir, db)
    }

    fn new_trip(origin: &str, destination: &str, miles: f64) -> NewTrip {
        NewTrip {
            origin: origin.into(),
            destination: destination.into(),
            miles,
            timestamp: Utc.with_ymd_and_hms(2025, 10, 1, 7, 45, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn users_are_unique_by_email() {
        let (_dir, db) = database().await;

        let user = db.insert_user("a@school.org", "hash").await.unwrap();
        let err = db.insert_user("a@school.org", "other").await.unwrap_err();

        assert!(matches!(err, DataManagerError::EmailTaken(email) if email == "a@school.org"));
        assert_eq!(db.get_user_by_email("a@school.org").await.unwrap(), Some(user));
        assert_eq!(db.get_user_by_email("b@school.org").await.unwrap(), None);
    }

    #[tokio::test]
    async fn trips_round_trip_in_insertion_order() {
        let (_dir, db) = database().await;
        let owner = db.insert_user("a@school.org", "hash").await.unwrap().user_id;

        let first = db.insert_trip(owner, &new_trip("A", "B", 12.)).await.unwrap();
        let second = db.insert_trip(owner, &new_trip("B", "C", 8.5)).await.unwrap();

        assert!(first.trip_id < second.trip_id);
        assert_eq!(db.get_trips(owner).await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn trips_are_scoped_to_owner() {
        let (_dir, db) = database().await;
        let alice = db.insert_user("alice@school.org", "hash").await.unwrap().user_id;
        let bob = db.insert_user("bob@school.org", "hash").await.unwrap().user_id;

        let trip = db.insert_trip(alice, &new_trip("A", "B", 1.)).await.unwrap();

        assert!(db.get_trips(bob).await.unwrap().is_empty());
        assert!(!db.delete_trip(bob, trip.trip_id).await.unwrap());
        assert_eq!(db.delete_trips(bob).await.unwrap(), 0);
        assert!(db.delete_trip(alice, trip.trip_id).await.unwrap());
        assert!(db.get_trips(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn trip_for_unknown_owner_is_rejected() {
        let (_dir, db) = database().await;

        let err = db.insert_trip(42, &new_trip("A", "B", 1.)).await.unwrap_err();

        assert!(matches!(err, DataManagerError::Database(_)));
    }
}
