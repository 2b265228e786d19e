use crate::core::{ConfigProvider, RawCountryRecord, RecordSource};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::error::{KafkaError, KafkaResult};
use rdkafka::message::Message;
use std::future::Future;
use std::time::Duration;

/// 第一次 poll 需要等待加入 consumer group (JoinGroup/SyncGroup 與 rebalance 延遲)
pub const GROUP_JOIN_GRACE: Duration = Duration::from_secs(10);

/// 以 consumer group 訂閱單一 topic 的讀取 session
pub struct KafkaSource {
    consumer: Option<StreamConsumer>,
    topic: String,
    poll_timeout: Duration,
    delivered: usize,
}

impl KafkaSource {
    pub fn connect<C: ConfigProvider>(config: &C) -> Result<Self> {
        let consumer: StreamConsumer = client_config(config).create().map_err(source_error)?;
        consumer
            .subscribe(&[config.topic()])
            .map_err(source_error)?;

        tracing::info!(
            "🔌 Subscribed to '{}' as '{}' via {}",
            config.topic(),
            config.group_id(),
            config.brokers().join(",")
        );

        Ok(Self {
            consumer: Some(consumer),
            topic: config.topic().to_string(),
            poll_timeout: config.poll_timeout(),
            delivered: 0,
        })
    }
}

/// 從最早的 offset 開始，自動提交 offset
pub fn client_config<C: ConfigProvider>(config: &C) -> ClientConfig {
    let mut client = ClientConfig::new();
    client
        .set("bootstrap.servers", config.brokers().join(","))
        .set("group.id", config.group_id())
        .set("auto.offset.reset", "earliest")
        .set("enable.auto.commit", "true");
    client
}

fn source_error(e: KafkaError) -> EtlError {
    EtlError::SourceConnection {
        message: e.to_string(),
    }
}

/// 在期限內等待一則訊息，逾時回傳 `None`
async fn poll_within<F: Future>(limit: Duration, poll: F) -> Option<F::Output> {
    tokio::time::timeout(limit, poll).await.ok()
}

/// 將一次 poll 的結果轉成記錄；`None` 代表逾時，視為 topic 已讀完
fn decode_polled(polled: Option<KafkaResult<Option<&[u8]>>>) -> Result<Option<RawCountryRecord>> {
    match polled {
        None => Ok(None),
        Some(Err(e)) => Err(source_error(e)),
        Some(Ok(payload)) => RawCountryRecord::from_payload(payload).map(Some),
    }
}

impl KafkaSource {
    /// 還沒收到任何訊息前，額外給加入 group 的時間
    fn current_timeout(&self) -> Duration {
        if self.delivered == 0 {
            self.poll_timeout + GROUP_JOIN_GRACE
        } else {
            self.poll_timeout
        }
    }
}

#[async_trait]
impl RecordSource for KafkaSource {
    async fn next_record(&mut self) -> Result<Option<RawCountryRecord>> {
        let Some(consumer) = self.consumer.as_ref() else {
            return Ok(None);
        };

        let limit = self.current_timeout();
        let polled = poll_within(limit, consumer.recv()).await;

        let payload = match &polled {
            None => {
                tracing::debug!(
                    "No message on '{}' within {:?}, treating as drained",
                    self.topic,
                    limit
                );
                None
            }
            Some(Err(e)) => Some(Err(e.clone())),
            Some(Ok(message)) => {
                self.delivered += 1;
                tracing::trace!(
                    "Received message partition={} offset={}",
                    message.partition(),
                    message.offset()
                );
                Some(Ok(message.payload()))
            }
        };

        decode_polled(payload)
    }

    async fn close(&mut self) {
        let Some(consumer) = self.consumer.take() else {
            return;
        };

        // 關閉前提交已讀取的 offset，與 auto-commit 的關閉行為一致
        if self.delivered > 0 {
            if let Err(e) = consumer.commit_consumer_state(CommitMode::Sync) {
                tracing::warn!("⚠️ Final offset commit failed: {}", e);
            }
        }

        consumer.unsubscribe();
        tracing::info!(
            "🔌 Kafka session on '{}' closed after {} messages",
            self.topic,
            self.delivered
        );
    }
}
