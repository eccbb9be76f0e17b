use sqlx::FromRow;

/// Stored secret for one row of the `admin` table; looked up by username.
#[derive(Debug, Clone, FromRow)]
pub struct AdminCredential {
    pub password_hash: String, // argon2 PHC string
}
