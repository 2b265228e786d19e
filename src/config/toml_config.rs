use crate::config::MAX_RECORDS_LIMIT;
use crate::core::ConfigProvider;
use crate::domain::model::InvalidRecordPolicy;
use crate::domain::ports::{
    DEFAULT_GROUP_ID, DEFAULT_MAX_RECORDS, DEFAULT_POLL_TIMEOUT_MS, DEFAULT_TOPIC,
};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub kafka: KafkaConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_group_id")]
    pub group_id: String,
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    #[serde(default)]
    pub on_invalid_record: InvalidRecordPolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            on_invalid_record: InvalidRecordPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub key_prefix: Option<String>,
}

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

fn default_group_id() -> String {
    DEFAULT_GROUP_ID.to_string()
}

fn default_poll_timeout_ms() -> u64 {
    DEFAULT_POLL_TIMEOUT_MS
}

fn default_max_records() -> usize {
    DEFAULT_MAX_RECORDS
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;

        // "${KAFKA_BROKERS}" 展開後可能是逗號分隔的清單
        config.kafka.brokers = validation::split_broker_list(&config.kafka.brokers);
        Ok(config)
    }

    /// 替換環境變數 (例如 ${KAFKA_BROKERS})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn output_path(&self) -> &str {
        &self.output.path
    }
}

impl ConfigProvider for TomlConfig {
    fn brokers(&self) -> &[String] {
        &self.kafka.brokers
    }

    fn topic(&self) -> &str {
        &self.kafka.topic
    }

    fn group_id(&self) -> &str {
        &self.kafka.group_id
    }

    fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.kafka.poll_timeout_ms)
    }

    fn max_records(&self) -> usize {
        self.batch.max_records
    }

    fn invalid_record_policy(&self) -> InvalidRecordPolicy {
        self.batch.on_invalid_record
    }

    fn key_prefix(&self) -> Option<&str> {
        self.output.key_prefix.as_deref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_brokers("kafka.brokers", &self.kafka.brokers)?;
        validation::validate_non_empty_string("kafka.topic", &self.kafka.topic)?;
        validation::validate_non_empty_string("kafka.group_id", &self.kafka.group_id)?;
        validation::validate_positive_number(
            "kafka.poll_timeout_ms",
            self.kafka.poll_timeout_ms as usize,
            1,
        )?;
        validation::validate_range("batch.max_records", self.batch.max_records, 1, MAX_RECORDS_LIMIT)?;
        validation::validate_path("output.path", &self.output.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_toml_config() {
        let toml_content = r#"
[kafka]
brokers = ["localhost:9092"]

[output]
path = "./test-output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.brokers(), ["localhost:9092".to_string()]);
        assert_eq!(config.topic(), "countries_data");
        assert_eq!(config.group_id(), "country-data-consumer-group");
        assert_eq!(config.max_records(), 10);
        assert_eq!(config.invalid_record_policy(), InvalidRecordPolicy::Abort);
        assert_eq!(config.poll_timeout(), Duration::from_secs(5));
        assert!(config.key_prefix().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[kafka]
brokers = ["kafka-1:9092", "kafka-2:9092"]
topic = "countries_v2"
group_id = "backfill"
poll_timeout_ms = 250

[batch]
max_records = 50
on_invalid_record = "skip"

[output]
path = "./output"
key_prefix = "daily"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.brokers().len(), 2);
        assert_eq!(config.topic(), "countries_v2");
        assert_eq!(config.max_records(), 50);
        assert_eq!(config.invalid_record_policy(), InvalidRecordPolicy::Skip);
        assert_eq!(config.poll_timeout(), Duration::from_millis(250));
        assert_eq!(config.key_prefix(), Some("daily"));
    }

    #[test]
    fn test_env_var_substitution_splits_brokers() {
        std::env::set_var("TEST_COUNTRIES_BROKERS", "kafka-a:9092,kafka-b:9092");

        let toml_content = r#"
[kafka]
brokers = ["${TEST_COUNTRIES_BROKERS}"]

[output]
path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.kafka.brokers, vec!["kafka-a:9092", "kafka-b:9092"]);

        std::env::remove_var("TEST_COUNTRIES_BROKERS");
    }

    #[test]
    fn test_unknown_env_var_is_left_verbatim() {
        let toml_content = r#"
[kafka]
brokers = ["${TEST_COUNTRIES_UNSET_VAR}"]

[output]
path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.kafka.brokers, vec!["${TEST_COUNTRIES_UNSET_VAR}"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let toml_content = r#"
[kafka]
brokers = ["localhost:9092"]

[batch]
on_invalid_record = "retry"

[output]
path = "./output"
"#;

        assert!(matches!(
            TomlConfig::from_toml_str(toml_content),
            Err(EtlError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[kafka]
brokers = ["localhost:9092"]

[output]
path = "./output"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_path(), "./output");
    }
}
