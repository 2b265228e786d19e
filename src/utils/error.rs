use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Missing required field: {path}")]
    MissingRequiredField { path: String },

    #[error("Invalid field type at {path}: expected {expected}")]
    InvalidFieldType { path: String, expected: &'static str },

    #[error("Failed to decode record: {message}")]
    RecordDecode { message: String },

    #[error("Source connection error: {message}")]
    SourceConnection { message: String },

    #[error("Failed to write {key} to storage: {message}")]
    StorageWrite { key: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Data,
    Source,
    Storage,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::MissingRequiredField { .. }
            | EtlError::InvalidFieldType { .. }
            | EtlError::RecordDecode { .. } => ErrorCategory::Data,
            EtlError::SourceConnection { .. } => ErrorCategory::Source,
            EtlError::StorageWrite { .. } => ErrorCategory::Storage,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) | EtlError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 寫入失敗不會中斷執行，只是記錄下來
            ErrorCategory::Storage => ErrorSeverity::Low,
            ErrorCategory::Source => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::MissingRequiredField { .. } | EtlError::InvalidFieldType { .. } => {
                "Check the producer schema, or run with on_invalid_record = \"skip\""
            }
            EtlError::RecordDecode { .. } => "Make sure the topic only carries UTF-8 JSON objects",
            EtlError::SourceConnection { .. } => {
                "Check KAFKA_BROKERS and network access to the brokers, then retry"
            }
            EtlError::StorageWrite { .. } => {
                "Check bucket permissions and credentials; the batch was not persisted"
            }
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => {
                "Review the environment variables or the configuration file"
            }
            EtlError::IoError(_) => "Check file system permissions and free space",
            EtlError::SerializationError(_) => "Report this as a bug together with the input record",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingRequiredField { path } => {
                format!("A country record is missing the '{}' field", path)
            }
            EtlError::InvalidFieldType { path, expected } => {
                format!("Field '{}' of a country record is not a {}", path, expected)
            }
            EtlError::SourceConnection { .. } => "Could not read from the message queue".to_string(),
            EtlError::StorageWrite { key, .. } => format!("Could not store batch '{}'", key),
            EtlError::MissingConfigError { field } => {
                format!("Required setting '{}' is not set", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
