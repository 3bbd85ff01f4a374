use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DbError {
    #[error("Timed out connecting to the database after {0:?}")]
    ConnectTimeout(Duration),

    #[error("Connection error: {0}")]
    Connection(String),

    #[cfg(feature = "database-mongodb")]
    #[error("Database error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type DbResult<T> = Result<T, DbError>;
