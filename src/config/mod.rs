pub mod cli;
pub mod lambda;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::InvalidRecordPolicy;
#[cfg(feature = "cli")]
use crate::domain::ports::{DEFAULT_GROUP_ID, DEFAULT_TOPIC};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use std::time::Duration;

/// 批次筆數上限的允許範圍
pub const MAX_RECORDS_LIMIT: usize = 1_000;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "countries-etl")]
#[command(about = "Move one batch of country records from Kafka into local storage")]
pub struct CliConfig {
    /// Kafka brokers, comma separated (host:port)
    #[arg(long, env = "KAFKA_BROKERS", value_delimiter = ',')]
    pub brokers: Vec<String>,

    #[arg(long, default_value = DEFAULT_TOPIC)]
    pub topic: String,

    #[arg(long, default_value = DEFAULT_GROUP_ID)]
    pub group_id: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Prefix prepended to the output object key
    #[arg(long)]
    pub key_prefix: Option<String>,

    #[arg(long, default_value = "10")]
    pub max_records: usize,

    /// How long to wait for a message before treating the topic as drained
    #[arg(long, default_value = "5000")]
    pub poll_timeout_ms: u64,

    #[arg(long, value_enum, default_value = "abort")]
    pub on_invalid_record: InvalidRecordPolicy,

    /// Load settings from a TOML file instead of flags
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 清理 broker 清單 (去空白、去空項目)
    pub fn normalized(mut self) -> Self {
        self.brokers = crate::utils::validation::split_broker_list(&self.brokers);
        self
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
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
        self.key_prefix.as_deref()
    }
}

#[cfg(feature = "cli")]
impl crate::utils::validation::Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        use crate::utils::validation::*;

        validate_brokers("brokers", &self.brokers)?;
        validate_non_empty_string("topic", &self.topic)?;
        validate_non_empty_string("group_id", &self.group_id)?;
        validate_path("output_path", &self.output_path)?;
        validate_range("max_records", self.max_records, 1, MAX_RECORDS_LIMIT)?;
        validate_positive_number("poll_timeout_ms", self.poll_timeout_ms as usize, 1)?;

        tracing::debug!("CLI configuration validation passed");
        Ok(())
    }
}
