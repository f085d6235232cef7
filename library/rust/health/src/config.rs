use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read file: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("validation error: {0}")]
    Validation(String),
}

/// RegistryConfig は CompositeHealthChecker の集約ポリシーを表す。
///
/// ```yaml
/// timeout_ms: 2000
/// optional:
///   - cache
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// 1 チェックあたりの待機上限（ミリ秒）。未指定なら上限なし。
    pub timeout_ms: Option<u64>,
    /// 失敗しても Degraded に留めるチェック名。
    pub optional: Vec<String>,
}

impl RegistryConfig {
    /// YAML ファイルを読み込み、検証済みの設定を返す。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::Validation("timeout_ms must be > 0".into()));
        }
        if self.optional.iter().any(String::is_empty) {
            return Err(ConfigError::Validation(
                "optional check names must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn is_optional(&self, name: &str) -> bool {
        self.optional.iter().any(|n| n == name)
    }
}
