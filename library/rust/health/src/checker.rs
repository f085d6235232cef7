use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::RegistryConfig;
use crate::error::{HealthError, RegistryError};
use crate::response::{CheckResult, HealthResponse, HealthStatus, HealthzResponse};

/// HealthCheck は 1 つのバックエンド依存先に対するプローブを表す。
///
/// `Ok(())` はバックエンドが最小限のプローブに期待どおりの結果を返したことを意味する。
/// 実装はリトライもタイムアウトも行わない。待機上限は呼び出し側が課す。
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;
    async fn check(&self) -> Result<(), HealthError>;
}

pub trait HealthChecker: Send + Sync {
    fn add_check(&mut self, check: Box<dyn HealthCheck>) -> Result<(), RegistryError>;
}

struct Registered {
    check: Box<dyn HealthCheck>,
    optional: bool,
}

/// CompositeHealthChecker は登録されたチェックを登録順に実行し、結果を集約する。
///
/// チェック名はレポートのキーになるため、同名のチェックは登録できない。
pub struct CompositeHealthChecker {
    checks: Vec<Registered>,
    timeout: Option<Duration>,
    policy: RegistryConfig,
}

impl CompositeHealthChecker {
    pub fn new() -> Self {
        Self::from_config(&RegistryConfig::default())
    }

    /// 後から追加されたチェックのうち、名前が `config.optional` にあるものは optional として登録される。
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self {
            checks: vec![],
            timeout: config.timeout(),
            policy: config.clone(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn add_check(&mut self, check: Box<dyn HealthCheck>) -> Result<(), RegistryError> {
        let optional = self.policy.is_optional(check.name());
        self.register(check, optional)
    }

    /// optional なチェックの失敗は全体を Unhealthy ではなく Degraded にする。
    pub fn add_optional_check(&mut self, check: Box<dyn HealthCheck>) -> Result<(), RegistryError> {
        self.register(check, true)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub async fn run_all(&self) -> HealthResponse {
        let mut results = BTreeMap::new();
        let mut required_failed = false;
        let mut optional_failed = false;

        for entry in &self.checks {
            let name = entry.check.name();
            let (status, message, kind) = match self.run_one(entry.check.as_ref()).await {
                Ok(()) => (HealthStatus::Healthy, None, None),
                Err(e) => {
                    tracing::warn!(
                        check = name,
                        kind = ?e.kind(),
                        optional = entry.optional,
                        error = %e,
                        "health check failed"
                    );
                    if entry.optional {
                        optional_failed = true;
                    } else {
                        required_failed = true;
                    }
                    (HealthStatus::Unhealthy, Some(e.to_string()), Some(e.kind()))
                }
            };
            results.insert(
                name.to_string(),
                CheckResult {
                    status,
                    message,
                    kind,
                },
            );
        }

        let status = if required_failed {
            HealthStatus::Unhealthy
        } else if optional_failed {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        HealthResponse {
            status,
            checks: results,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn healthz(&self) -> HealthzResponse {
        HealthzResponse::default()
    }

    fn register(&mut self, check: Box<dyn HealthCheck>, optional: bool) -> Result<(), RegistryError> {
        if self.checks.iter().any(|r| r.check.name() == check.name()) {
            return Err(RegistryError::DuplicateName(check.name().to_string()));
        }
        self.checks.push(Registered { check, optional });
        Ok(())
    }

    async fn run_one(&self, check: &dyn HealthCheck) -> Result<(), HealthError> {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, check.check())
                .await
                .map_err(|_| HealthError::Timeout {
                    check: check.name().to_string(),
                    timeout,
                })?,
            None => check.check().await,
        }
    }
}

impl HealthChecker for CompositeHealthChecker {
    fn add_check(&mut self, check: Box<dyn HealthCheck>) -> Result<(), RegistryError> {
        CompositeHealthChecker::add_check(self, check)
    }
}

impl Default for CompositeHealthChecker {
    fn default() -> Self {
        Self::new()
    }
}
