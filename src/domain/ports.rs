use crate::domain::model::{InvalidRecordPolicy, RawCountryRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_TOPIC: &str = "countries_data";
pub const DEFAULT_GROUP_ID: &str = "country-data-consumer-group";
pub const DEFAULT_MAX_RECORDS: usize = 10;
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 5_000;

/// 佇列讀取 session
#[async_trait]
pub trait RecordSource: Send {
    /// 下一筆記錄；`Ok(None)` 表示目前沒有更多資料
    async fn next_record(&mut self) -> Result<Option<RawCountryRecord>>;

    /// 關閉 session，重複呼叫不會出錯
    async fn close(&mut self);
}

pub trait BlobSink: Send + Sync {
    fn put(
        &self,
        key: &str,
        body: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn brokers(&self) -> &[String];
    fn topic(&self) -> &str;
    fn group_id(&self) -> &str;
    fn poll_timeout(&self) -> Duration;
    fn max_records(&self) -> usize;
    fn invalid_record_policy(&self) -> InvalidRecordPolicy;
    fn key_prefix(&self) -> Option<&str>;
}
