use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database not configured")]
    NotConfigured,

    #[error("Query timed out after {0} seconds")]
    Timeout(u64),

    #[cfg(any(
        feature = "database-sqlite",
        feature = "database-postgres",
        feature = "database-mysql"
    ))]
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DbError {
    /// Whether the error means the connection itself is gone, as opposed to
    /// a single statement failing.
    pub fn is_connection_lost(&self) -> bool {
        match self {
            #[cfg(any(
                feature = "database-sqlite",
                feature = "database-postgres",
                feature = "database-mysql"
            ))]
            DbError::Sqlx(e) => matches!(
                e,
                sqlx::Error::Io(_) | sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut
            ),
            _ => false,
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
