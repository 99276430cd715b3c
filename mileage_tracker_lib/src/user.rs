/// A registered account. The id is the owner identity of a ledger.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    #[cfg_attr(feature = "sqlx", sqlx(rename = "id"))]
    pub user_id: i64,
    pub email: String,
    pub password_hash: String,
}
