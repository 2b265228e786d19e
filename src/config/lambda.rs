use crate::config::MAX_RECORDS_LIMIT;
use crate::core::ConfigProvider;
use crate::domain::model::InvalidRecordPolicy;
use crate::domain::ports::{
    DEFAULT_GROUP_ID, DEFAULT_MAX_RECORDS, DEFAULT_POLL_TIMEOUT_MS, DEFAULT_TOPIC,
};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "lambda")]
use crate::core::BlobSink;
#[cfg(feature = "lambda")]
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;

#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub brokers: Vec<String>,
    pub topic: String,
    pub group_id: String,
    pub poll_timeout_ms: u64,
    pub max_records: usize,
    pub on_invalid_record: InvalidRecordPolicy,
    pub s3_bucket: String,
    pub s3_prefix: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint_url: Option<String>,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 以任意查詢函式讀取設定，方便測試
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let brokers = optional("KAFKA_BROKERS").ok_or_else(|| EtlError::MissingConfigError {
            field: "KAFKA_BROKERS".to_string(),
        })?;
        let s3_bucket = optional("S3_BUCKET");

        Ok(Self {
            brokers: validation::split_broker_list(&[brokers]),
            topic: optional("KAFKA_TOPIC").unwrap_or_else(|| DEFAULT_TOPIC.to_string()),
            group_id: optional("KAFKA_GROUP_ID").unwrap_or_else(|| DEFAULT_GROUP_ID.to_string()),
            poll_timeout_ms: parse_or(
                "KAFKA_POLL_TIMEOUT_MS",
                optional("KAFKA_POLL_TIMEOUT_MS"),
                DEFAULT_POLL_TIMEOUT_MS,
            )?,
            max_records: parse_or(
                "BATCH_MAX_RECORDS",
                optional("BATCH_MAX_RECORDS"),
                DEFAULT_MAX_RECORDS,
            )?,
            on_invalid_record: optional("ON_INVALID_RECORD")
                .map(|v| v.parse::<InvalidRecordPolicy>())
                .transpose()?
                .unwrap_or_default(),
            s3_bucket: validation::validate_required_field("S3_BUCKET", &s3_bucket)?.clone(),
            s3_prefix: optional("S3_PREFIX"),
            s3_region: optional("S3_REGION"),
            s3_endpoint_url: optional("S3_ENDPOINT_URL"),
        })
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| EtlError::InvalidConfigValueError {
                field: name.to_string(),
                value: value.clone(),
                reason: e.to_string(),
            }),
    }
}

impl ConfigProvider for LambdaConfig {
    fn brokers(&self) -> &[String] {
        &self.brokers
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn group_id(&self) -> &str {
        &self.group_id
    }

    fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    fn max_records(&self) -> usize {
        self.max_records
    }

    fn invalid_record_policy(&self) -> InvalidRecordPolicy {
        self.on_invalid_record
    }

    fn key_prefix(&self) -> Option<&str> {
        self.s3_prefix.as_deref()
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        // 驗證 Kafka 設定
        validation::validate_brokers("KAFKA_BROKERS", &self.brokers)?;
        validation::validate_non_empty_string("KAFKA_TOPIC", &self.topic)?;
        validation::validate_non_empty_string("KAFKA_GROUP_ID", &self.group_id)?;
        validation::validate_positive_number(
            "KAFKA_POLL_TIMEOUT_MS",
            self.poll_timeout_ms as usize,
            1,
        )?;

        // 驗證批次大小
        validation::validate_range("BATCH_MAX_RECORDS", self.max_records, 1, MAX_RECORDS_LIMIT)?;

        // 驗證 S3 bucket 名稱
        validation::validate_s3_bucket_name("S3_BUCKET", &self.s3_bucket)?;

        if let Some(region) = &self.s3_region {
            validate_aws_region("S3_REGION", region)?;
        }

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    validation::validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}

#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

#[cfg(feature = "lambda")]
impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// 依設定建立 S3 客戶端，區域與 endpoint 未設定時使用 AWS 預設鏈
    pub async fn from_config(config: &LambdaConfig) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        if let Some(region) = &config.s3_region {
            builder = builder.region(aws_sdk_s3::config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.s3_endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(S3Client::from_conf(builder.build()), config.s3_bucket.clone())
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[cfg(feature = "lambda")]
impl BlobSink for S3Storage {
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/x-ndjson")
            .body(body.into())
            .send()
            .await
            .map_err(|err| {
                let message = match err.code() {
                    Some(code) => format!("{} ({})", DisplayErrorContext(&err), code),
                    None => DisplayErrorContext(&err).to_string(),
                };
                EtlError::StorageWrite {
                    key: format!("s3://{}/{}", self.bucket, key),
                    message,
                }
            })?;

        Ok(())
    }
}
