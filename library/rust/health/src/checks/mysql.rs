use async_trait::async_trait;
use sqlx::MySqlPool;
use crate::checker::HealthCheck;
use crate::checks::expect_one;
use crate::error::HealthError;

const BACKEND: &str = "MySQL";
const PROBE: &str = "select 1 from dual";

pub struct MySqlHealthCheck {
    name: String,
    pool: MySqlPool,
}

impl MySqlHealthCheck {
    pub fn new(name: impl Into<String>, pool: MySqlPool) -> Self {
        Self {
            name: name.into(),
            pool,
        }
    }
}

#[async_trait]
impl HealthCheck for MySqlHealthCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<(), HealthError> {
        let observed: i64 = sqlx::query_scalar(PROBE)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| HealthError::unavailable(BACKEND, e))?;
        expect_one(BACKEND, PROBE, observed)
    }
}
