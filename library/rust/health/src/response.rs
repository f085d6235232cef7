use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::FailureKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    /// optional な依存先のみ失敗している
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: HealthStatus,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// チェック名順に並ぶ
    pub checks: BTreeMap<String, CheckResult>,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthzResponse {
    pub status: String, // 常に "ok"
}

impl Default for HealthzResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
