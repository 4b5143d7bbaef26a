//! Database connection management

use std::num::TryFromIntError;

use sqlx::{PgPool, Postgres, Row, Transaction, migrate::MigrateError, postgres::PgRow};

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction. Dropping it without committing rolls back.
    ///
    /// # Errors
    ///
    /// Returns an error when a connection cannot be acquired.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply the embedded schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails or the history is inconsistent.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Read a `BIGINT` column that holds a non-negative amount or count.
pub(crate) fn try_get_u64(row: &PgRow, column: &str) -> Result<u64, sqlx::Error> {
    let value: i64 = row.try_get(column)?;

    u64::try_from(value).map_err(|source| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    })
}

/// Read a nullable `BIGINT` column that holds a non-negative amount or count.
pub(crate) fn try_get_optional_u64(row: &PgRow, column: &str) -> Result<Option<u64>, sqlx::Error> {
    let value: Option<i64> = row.try_get(column)?;

    value
        .map(|value| {
            u64::try_from(value).map_err(|source| sqlx::Error::ColumnDecode {
                index: column.to_string(),
                source: Box::new(source),
            })
        })
        .transpose()
}

/// Convert an amount to its `BIGINT` bind value.
pub(crate) fn to_i64(value: u64, column: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|source| sqlx::Error::Encode(Box::new(ColumnRange {
        column: column.to_string(),
        source,
    })))
}

#[derive(Debug, thiserror::Error)]
#[error("value for column {column} is out of range")]
struct ColumnRange {
    column: String,
    #[source]
    source: TryFromIntError,
}
