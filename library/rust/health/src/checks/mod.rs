#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "amqp")]
pub mod amqp;

#[cfg(feature = "cassandra")]
pub mod cassandra;

#[cfg(feature = "zookeeper")]
pub mod zookeeper;

#[cfg(any(feature = "mysql", feature = "postgres"))]
use crate::error::HealthError;

/// `SELECT 1` 系プローブの戻り値が 1 であることを確認する。
#[cfg(any(feature = "mysql", feature = "postgres"))]
pub(crate) fn expect_one<T>(backend: &'static str, query: &str, observed: T) -> Result<(), HealthError>
where
    T: PartialEq + From<u8> + std::fmt::Display,
{
    if observed == T::from(1) {
        Ok(())
    } else {
        Err(HealthError::mismatch(
            backend,
            format!("1 from {query}"),
            observed,
        ))
    }
}
