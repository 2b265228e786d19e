use crate::core::batch::{object_key, Batch};
use crate::core::transform::transform;
use crate::domain::model::{BatchSummary, FlushOutcome, InvalidRecordPolicy};
use crate::domain::ports::{BlobSink, ConfigProvider, RecordSource, DEFAULT_MAX_RECORDS};
use crate::utils::error::{ErrorCategory, EtlError, Result};
use chrono::{DateTime, Utc};

pub type Clock = fn() -> DateTime<Utc>;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub max_records: usize,
    pub invalid_record_policy: InvalidRecordPolicy,
    pub key_prefix: Option<String>,
    /// 產生物件 key 時間戳用
    pub clock: Clock,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            invalid_record_policy: InvalidRecordPolicy::default(),
            key_prefix: None,
            clock: Utc::now,
        }
    }
}

impl BatchOptions {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            max_records: config.max_records(),
            invalid_record_policy: config.invalid_record_policy(),
            key_prefix: config.key_prefix().map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records;
        self
    }

    pub fn with_policy(mut self, policy: InvalidRecordPolicy) -> Self {
        self.invalid_record_policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Collecting,
    Flushing,
    Done,
}

/// 收集一批記錄並寫入儲存，每個實例只執行一次
pub struct EtlEngine<S: RecordSource, B: BlobSink> {
    source: S,
    sink: B,
    options: BatchOptions,
    state: BatchState,
}

impl<S: RecordSource, B: BlobSink> EtlEngine<S, B> {
    pub fn new(source: S, sink: B, options: BatchOptions) -> Self {
        Self {
            source,
            sink,
            options,
            state: BatchState::Collecting,
        }
    }

    pub async fn run(mut self) -> Result<BatchSummary> {
        tracing::info!(
            "🚀 Starting batch (max {} records, on invalid record: {:?})",
            self.options.max_records,
            self.options.invalid_record_policy
        );

        let outcome = self.collect_and_flush().await;

        // 寫入結束後才關閉 session，錯誤路徑也一樣
        self.source.close().await;

        let summary = outcome?;
        self.transition(BatchState::Done);

        tracing::info!(
            "✅ Batch finished: {} processed, {} skipped, persisted: {}",
            summary.records_processed,
            summary.records_skipped,
            summary.is_persisted()
        );
        Ok(summary)
    }

    async fn collect_and_flush(&mut self) -> Result<BatchSummary> {
        let (batch, records_skipped) = match self.collect().await {
            Ok(collected) => collected,
            Err(e) => {
                tracing::error!("❌ Batch aborted while collecting: {}", e);
                return Err(e);
            }
        };

        self.transition(BatchState::Flushing);
        let flush = self.flush(&batch).await?;

        Ok(BatchSummary {
            records_processed: batch.len(),
            records_skipped,
            flush,
        })
    }

    fn transition(&mut self, next: BatchState) {
        tracing::debug!("Batch state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn should_skip(&self, error: &EtlError) -> bool {
        self.options.invalid_record_policy == InvalidRecordPolicy::Skip
            && error.category() == ErrorCategory::Data
    }

    async fn collect(&mut self) -> Result<(Batch, usize)> {
        let mut batch = Batch::with_capacity(self.options.max_records);
        let mut skipped = 0;

        while !batch.is_full() {
            let raw = match self.source.next_record().await {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    tracing::debug!("Source exhausted after {} records", batch.len());
                    break;
                }
                Err(e) if self.should_skip(&e) => {
                    tracing::warn!("⚠️ Skipping undecodable record: {}", e);
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match transform(&raw) {
                Ok(record) => {
                    tracing::debug!("Transformed {}", record.name);
                    batch.push(record);
                }
                Err(e) if self.should_skip(&e) => {
                    tracing::warn!("⚠️ Skipping invalid record: {}", e);
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok((batch, skipped))
    }

    async fn flush(&self, batch: &Batch) -> Result<FlushOutcome> {
        if batch.is_empty() {
            tracing::info!("No new data to process");
            return Ok(FlushOutcome::Skipped);
        }

        let body = batch.to_ndjson()?;
        let key = object_key(self.options.key_prefix.as_deref(), (self.options.clock)());
        let bytes = body.len();

        tracing::debug!("📦 Writing {} records ({} bytes) to {}", batch.len(), bytes, key);

        match self.sink.put(&key, body.into_bytes()).await {
            Ok(()) => {
                tracing::info!("✅ Successfully uploaded {}", key);
                Ok(FlushOutcome::Written { key, bytes })
            }
            Err(e) => {
                tracing::error!("❌ Error uploading {}: {}", key, e);
                Ok(FlushOutcome::Failed {
                    key,
                    error: e.to_string(),
                })
            }
        }
    }
}
