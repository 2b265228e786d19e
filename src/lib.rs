pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

#[cfg(feature = "kafka")]
pub use crate::adapters::kafka::KafkaSource;

#[cfg(feature = "lambda")]
pub use crate::config::lambda::S3Storage;

pub use crate::config::{cli::LocalStorage, lambda::LambdaConfig, toml_config::TomlConfig};
pub use crate::core::etl::{BatchOptions, EtlEngine};
pub use crate::core::transform::transform;
pub use crate::domain::model::{
    BatchSummary, FlushOutcome, InvalidRecordPolicy, InvocationResponse, NormalizedCountryRecord,
    RawCountryRecord,
};
pub use crate::domain::ports::{BlobSink, ConfigProvider, RecordSource};
pub use crate::utils::error::{EtlError, Result};
