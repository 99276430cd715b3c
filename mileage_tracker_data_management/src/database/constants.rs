pub const USERS_TABLE_NAME: &str = "users";
pub const USER_ID: &str = "id";
pub const EMAIL: &str = "email";
pub const PASSWORD_HASH: &str = "password_hash";

pub const TRIPS_TABLE_NAME: &str = "trips";
pub const TRIP_ID: &str = "id";
pub const OWNER_ID: &str = "owner_id";
pub const ORIGIN: &str = "origin";
pub const DESTINATION: &str = "destination";
pub const MILES: &str = "miles";
pub const DATE: &str = "date";
