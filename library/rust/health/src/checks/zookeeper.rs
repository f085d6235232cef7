use async_trait::async_trait;
use zookeeper_client::Client;
use crate::checker::HealthCheck;
use crate::error::HealthError;

const BACKEND: &str = "ZooKeeper";

/// ZookeeperHealthCheck はルートパスの子ノード一覧を取得できるかで疎通を確認する。
pub struct ZookeeperHealthCheck {
    name: String,
    client: Client,
}

impl ZookeeperHealthCheck {
    pub fn new(name: impl Into<String>, client: Client) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }
}

#[async_trait]
impl HealthCheck for ZookeeperHealthCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<(), HealthError> {
        let children = self
            .client
            .list_children("/")
            .await
            .map_err(|e| HealthError::unavailable(BACKEND, e))?;
        tracing::debug!(check = %self.name, children = children.len(), "ZooKeeper root listed");
        Ok(())
    }
}
