use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{
    BasicConsumeOptions, BasicPublishOptions, QueueDeclareOptions, QueueDeleteOptions,
};
use lapin::types::{AMQPValue, FieldTable};
use lapin::{BasicProperties, Channel, Connection};
use rand::Rng;

use crate::checker::HealthCheck;
use crate::error::HealthError;

const BACKEND: &str = "AMQP";
const DEFAULT_QUEUE_EXPIRY: Duration = Duration::from_secs(60);

/// RoundTrip は 1 回のプローブで使った一時キュー名とペイロード。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTrip {
    pub queue: String,
    pub payload: String,
}

/// AmqpHealthCheck はブローカー上の一時キューにメッセージを往復させて疎通を確認する。
///
/// 接続は呼び出し側が所有する。チェックごとにチャネルと排他的・自動削除のキューを開き、
/// 成否にかかわらずキュー削除とチャネルのクローズを行う。
/// 途中でキャンセルされた場合も Drop 時に後始末を行い、
/// それも届かなかったキューは `x-expires` によりブローカー側で破棄される。
pub struct AmqpHealthCheck {
    name: String,
    conn: Arc<Connection>,
    queue_expiry: Duration,
}

impl AmqpHealthCheck {
    pub fn new(name: impl Into<String>, conn: Arc<Connection>) -> Self {
        Self {
            name: name.into(),
            conn,
            queue_expiry: DEFAULT_QUEUE_EXPIRY,
        }
    }

    /// 未使用の一時キューをブローカーが破棄するまでの時間。
    pub fn with_queue_expiry(mut self, expiry: Duration) -> Self {
        self.queue_expiry = expiry;
        self
    }

    /// プローブを実行し、成功時は使用したキュー名とペイロードを返す。
    pub async fn round_trip(&self) -> Result<RoundTrip, HealthError> {
        let channel = self
            .conn
            .create_channel()
            .await
            .map_err(|e| HealthError::unavailable(BACKEND, e))?;
        let mut resources = ProbeResources::new(channel);

        let declared = resources
            .channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    exclusive: true,
                    auto_delete: true,
                    ..QueueDeclareOptions::default()
                },
                declare_arguments(self.queue_expiry),
            )
            .await;
        let queue = match declared {
            Ok(queue) => queue.name().as_str().to_string(),
            Err(e) => {
                resources.release().await;
                return Err(HealthError::unavailable(BACKEND, e));
            }
        };
        resources.queue = Some(queue.clone());

        let payload = rand::thread_rng().gen::<u32>().to_string();
        let outcome = publish_and_consume(&resources.channel, &queue, &payload).await;
        resources.release().await;

        outcome.map(|()| RoundTrip { queue, payload })
    }
}

#[async_trait]
impl HealthCheck for AmqpHealthCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<(), HealthError> {
        let trip = self.round_trip().await?;
        tracing::debug!(queue = %trip.queue, "AMQP round trip succeeded");
        Ok(())
    }
}

/// プローブ中に開いたチャネルと一時キュー。
///
/// `release` を通らずに破棄された場合（タイムアウトによる future の drop 等）は、
/// 削除とクローズを tokio タスクとして起動する。
struct ProbeResources {
    channel: Channel,
    queue: Option<String>,
    released: bool,
}

impl ProbeResources {
    fn new(channel: Channel) -> Self {
        Self {
            channel,
            queue: None,
            released: false,
        }
    }

    async fn release(&mut self) {
        self.released = true;
        cleanup(&self.channel, self.queue.take()).await;
    }
}

impl Drop for ProbeResources {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let channel = self.channel.clone();
        let queue = self.queue.take();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { cleanup(&channel, queue).await });
            }
            Err(_) => {
                tracing::warn!(queue = ?queue, "no runtime to release health check channel; relying on queue expiry");
            }
        }
    }
}

async fn cleanup(channel: &Channel, queue: Option<String>) {
    if let Some(queue) = queue {
        if let Err(e) = channel
            .queue_delete(&queue, QueueDeleteOptions::default())
            .await
        {
            tracing::warn!(queue = %queue, error = %e, "failed to delete health check queue");
        }
    }
    if let Err(e) = channel.close(200, "OK").await {
        tracing::warn!(error = %e, "failed to close health check channel");
    }
}

fn declare_arguments(expiry: Duration) -> FieldTable {
    // x-expires は正の値のみ受け付けられる
    let millis = i64::try_from(expiry.as_millis()).unwrap_or(i64::MAX).max(1);
    let mut args = FieldTable::default();
    args.insert("x-expires".into(), AMQPValue::LongLongInt(millis));
    args
}

async fn publish_and_consume(channel: &Channel, queue: &str, payload: &str) -> Result<(), HealthError> {
    channel
        .basic_publish(
            "",
            queue,
            BasicPublishOptions::default(),
            payload.as_bytes(),
            BasicProperties::default().with_content_type("text/plain".into()),
        )
        .await
        .map_err(|e| HealthError::unavailable(BACKEND, e))?
        .await
        .map_err(|e| HealthError::unavailable(BACKEND, e))?;

    let mut consumer = channel
        .basic_consume(
            queue,
            "",
            BasicConsumeOptions {
                no_ack: true,
                exclusive: true,
                ..BasicConsumeOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| HealthError::unavailable(BACKEND, e))?;

    let delivery = match consumer.next().await {
        Some(delivery) => delivery.map_err(|e| HealthError::unavailable(BACKEND, e))?,
        None => {
            return Err(HealthError::unavailable(
                BACKEND,
                "consumer closed before the health message arrived",
            ))
        }
    };

    verify_echo(payload.as_bytes(), &delivery.data)
}

fn verify_echo(sent: &[u8], received: &[u8]) -> Result<(), HealthError> {
    if sent == received {
        return Ok(());
    }
    Err(HealthError::mismatch(
        BACKEND,
        String::from_utf8_lossy(sent),
        String::from_utf8_lossy(received),
    ))
}
