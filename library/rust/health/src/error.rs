use std::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// FailureKind はチェックが healthy にならなかった理由の分類。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 接続・プロトコル・転送エラーでプローブを完了できなかった。
    Connectivity,
    /// プローブは完了したが、バックエンドが想定外の値を返した。
    ContentMismatch,
    /// レジストリ側の待機上限を超えた。
    Timeout,
}

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("{backend} health check failed: {source}")]
    Unavailable {
        backend: &'static str,
        #[source]
        source: BoxError,
    },
    #[error("{backend} health check: want {expected} but got {actual}")]
    Mismatch {
        backend: &'static str,
        expected: String,
        actual: String,
    },
    #[error("health check {check} timed out after {timeout:?}")]
    Timeout { check: String, timeout: Duration },
}

/// RegistryError は CompositeHealthChecker への登録時のエラー。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("health check {0} is already registered")]
    DuplicateName(String),
}

impl HealthError {
    pub fn unavailable(backend: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Unavailable {
            backend,
            source: source.into(),
        }
    }

    pub fn mismatch(backend: &'static str, expected: impl Display, actual: impl Display) -> Self {
        Self::Mismatch {
            backend,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Unavailable { .. } => FailureKind::Connectivity,
            Self::Mismatch { .. } => FailureKind::ContentMismatch,
            Self::Timeout { .. } => FailureKind::Timeout,
        }
    }
}
