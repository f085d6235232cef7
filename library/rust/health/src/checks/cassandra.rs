use async_trait::async_trait;
use scylla::frame::value::CqlTimestamp;
use scylla::SessionBuilder;
use crate::checker::HealthCheck;
use crate::error::HealthError;

const BACKEND: &str = "Cassandra";
const PROBE: &str = "SELECT toTimestamp(now()) FROM system.local";

/// CassandraHealthCheck はチェックごとにクラスター設定から新しいセッションを開く。
///
/// セッションはチェック終了時に drop され、その接続もすべて閉じられる。
pub struct CassandraHealthCheck {
    name: String,
    cluster: SessionBuilder,
}

impl CassandraHealthCheck {
    pub fn new(name: impl Into<String>, cluster: SessionBuilder) -> Self {
        Self {
            name: name.into(),
            cluster,
        }
    }
}

#[async_trait]
impl HealthCheck for CassandraHealthCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<(), HealthError> {
        let session = self
            .cluster
            .build()
            .await
            .map_err(|e| HealthError::unavailable(BACKEND, e))?;

        let result = session
            .query_unpaged(PROBE, ())
            .await
            .map_err(|e| HealthError::unavailable(BACKEND, e))?;

        // 結果の内容は判定に使わない
        match result.single_row_typed::<(CqlTimestamp,)>() {
            Ok((now,)) => {
                tracing::debug!(check = %self.name, now = %format_timestamp(now.0), "Cassandra probe query succeeded");
            }
            Err(e) => {
                tracing::debug!(check = %self.name, error = %e, "Cassandra probe query succeeded with undecodable row");
            }
        }
        Ok(())
    }
}

fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map_or_else(|| millis.to_string(), |t| t.to_rfc3339())
}
