use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 從佇列讀到的原始國家資料，欄位結構由上游決定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawCountryRecord {
    data: Value,
}

impl RawCountryRecord {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// 解析訊息 payload (UTF-8 JSON 物件)
    pub fn from_payload(payload: Option<&[u8]>) -> Result<Self> {
        let bytes = payload.ok_or_else(|| EtlError::RecordDecode {
            message: "message has no payload".to_string(),
        })?;

        let data: Value = serde_json::from_slice(bytes).map_err(|e| EtlError::RecordDecode {
            message: e.to_string(),
        })?;

        if !data.is_object() {
            return Err(EtlError::RecordDecode {
                message: format!("expected a JSON object, got {}", json_kind(&data)),
            });
        }

        Ok(Self { data })
    }

    /// 以點分隔路徑取值，`null` 視為不存在
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.data, |value, segment| value.get(segment))
            .filter(|value| !value.is_null())
    }

    pub fn as_value(&self) -> &Value {
        &self.data
    }
}

impl From<Value> for RawCountryRecord {
    fn from(data: Value) -> Self {
        Self::new(data)
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCountryRecord {
    pub name: String,
    pub capital: String,
    pub population: serde_json::Number,
    pub area: serde_json::Number,
    pub region: String,
    pub subregion: String,
    pub languages: Vec<String>,
    pub currencies: Vec<String>,
    pub flag_url: String,
    pub population_density: f64,
    pub is_large_country: bool,
}

/// 遇到無效記錄時的處理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum InvalidRecordPolicy {
    /// 整個批次失敗 (預設)
    #[default]
    Abort,
    /// 記錄錯誤後略過該筆
    Skip,
}

impl std::str::FromStr for InvalidRecordPolicy {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(EtlError::InvalidConfigValueError {
                field: "on_invalid_record".to_string(),
                value: other.to_string(),
                reason: "Expected 'abort' or 'skip'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlushOutcome {
    Written { key: String, bytes: usize },
    /// 批次為空，沒有寫入
    Skipped,
    Failed { key: String, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub records_processed: usize,
    pub records_skipped: usize,
    pub flush: FlushOutcome,
}

impl BatchSummary {
    pub fn is_persisted(&self) -> bool {
        matches!(self.flush, FlushOutcome::Written { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn processed(records_processed: usize) -> Self {
        Self {
            status_code: 200,
            body: format!("Processed {} countries and uploaded to S3", records_processed),
        }
    }
}

impl From<&BatchSummary> for InvocationResponse {
    fn from(summary: &BatchSummary) -> Self {
        Self::processed(summary.records_processed)
    }
}
