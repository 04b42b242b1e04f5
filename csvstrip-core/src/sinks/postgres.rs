// csvstrip-core/src/sinks/postgres.rs
//! PostgreSQL-backed implementation of the `RecordStore`.
//! Applies one parameterized update per redacted field.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::DEFAULT_UPDATE_STATEMENT;
use crate::errors::StripError;
use crate::redacted_field::RedactedField;
use crate::sinks::forwarder::RecordStore;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct PgRecordStore {
    pool: PgPool,
    statement: String,
}

impl PgRecordStore {
    /// Connects to `dsn`. A failed connection is fatal for the run.
    pub async fn connect(dsn: &str, statement: Option<&str>) -> Result<Self, StripError> {
        debug!("Connecting to database sink");
        // A single connection keeps updates strictly sequential.
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect(dsn)
            .await
            .map_err(|e| StripError::SinkConnection(mask_dsn(dsn), e))?;
        info!("Connected to database sink {}", mask_dsn(dsn));

        Ok(Self::with_pool(pool, statement.unwrap_or(DEFAULT_UPDATE_STATEMENT)))
    }

    pub fn with_pool(pool: PgPool, statement: &str) -> Self {
        Self {
            pool,
            statement: statement.to_string(),
        }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn update(&self, field: &RedactedField) -> Result<u64> {
        let key = i64::try_from(field.line_number)
            .with_context(|| format!("Line number {} does not fit a bigint key", field.line_number))?;
        let result = sqlx::query(&self.statement)
            .bind(field.text())
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Update failed for line {}", field.line_number))?;
        Ok(result.rows_affected())
    }
}

/// Strips the password from a connection URL for logging.
pub fn mask_dsn(dsn: &str) -> String {
    let Some((scheme, rest)) = dsn.split_once("://") else {
        return dsn.to_string();
    };
    match rest.rsplit_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, host)
        }
        None => dsn.to_string(),
    }
}
