use async_trait::async_trait;
use sqlx::PgPool;
use crate::checker::HealthCheck;
use crate::checks::expect_one;
use crate::error::HealthError;

const BACKEND: &str = "PostgreSQL";
const PROBE: &str = "SELECT 1";

pub struct PostgresHealthCheck {
    name: String,
    pool: PgPool,
}

impl PostgresHealthCheck {
    pub fn new(name: impl Into<String>, pool: PgPool) -> Self {
        Self {
            name: name.into(),
            pool,
        }
    }
}

#[async_trait]
impl HealthCheck for PostgresHealthCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<(), HealthError> {
        // PostgreSQL の整数リテラルは int4
        let observed: i32 = sqlx::query_scalar(PROBE)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| HealthError::unavailable(BACKEND, e))?;
        expect_one(BACKEND, PROBE, observed)
    }
}
