pub mod checker;
pub mod checks;
pub mod config;
pub mod error;
pub mod response;

pub use checker::{CompositeHealthChecker, HealthCheck, HealthChecker};
pub use config::{ConfigError, RegistryConfig};
pub use error::{BoxError, FailureKind, HealthError, RegistryError};
pub use response::{CheckResult, HealthResponse, HealthStatus, HealthzResponse};

#[cfg(feature = "mock")]
pub use checker::MockHealthCheck;
