use crate::domain::model::NormalizedCountryRecord;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};

pub const OBJECT_KEY_PREFIX: &str = "countries_data_";
pub const OBJECT_KEY_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// 一次執行內累積的記錄
#[derive(Debug, Clone)]
pub struct Batch {
    records: Vec<NormalizedCountryRecord>,
    capacity: usize,
}

impl Batch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: NormalizedCountryRecord) {
        self.records.push(record);
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[NormalizedCountryRecord] {
        &self.records
    }

    /// 每行一個 JSON 物件，以換行連接 (結尾不加換行)
    pub fn to_ndjson(&self) -> Result<String> {
        let lines = self
            .records
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }
}

/// `countries_data_<YYYYMMDD_HHMMSS>.json`，可選前綴
pub fn object_key(prefix: Option<&str>, at: DateTime<Utc>) -> String {
    let file_name = format!(
        "{}{}.json",
        OBJECT_KEY_PREFIX,
        at.format(OBJECT_KEY_TIME_FORMAT)
    );

    match prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}/{}", prefix, file_name),
        None => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Number;

    fn record(name: &str) -> NormalizedCountryRecord {
        NormalizedCountryRecord {
            name: name.to_string(),
            capital: "N/A".to_string(),
            population: Number::from(10),
            area: Number::from(2),
            region: "Europe".to_string(),
            subregion: "N/A".to_string(),
            languages: vec![],
            currencies: vec![],
            flag_url: format!("https://flagcdn.com/{}.png", name),
            population_density: 5.0,
            is_large_country: false,
        }
    }

    #[test]
    fn test_batch_fills_up_to_capacity() {
        let mut batch = Batch::with_capacity(2);
        assert!(batch.is_empty());
        batch.push(record("a"));
        assert!(!batch.is_full());
        batch.push(record("b"));
        assert!(batch.is_full());
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_to_ndjson_one_object_per_line() {
        let mut batch = Batch::with_capacity(10);
        batch.push(record("a"));
        batch.push(record("b"));

        let ndjson = batch.to_ndjson().unwrap();
        let lines: Vec<&str> = ndjson.split('\n').collect();

        assert_eq!(lines.len(), 2);
        assert!(!ndjson.ends_with('\n'));
        assert!(lines[0].starts_with(r#"{"name":"a","capital":"N/A","population":10"#));
        assert!(lines[1].ends_with(r#""population_density":5.0,"is_large_country":false}"#));
    }

    #[test]
    fn test_object_key_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(object_key(None, at), "countries_data_20240307_090502.json");
        assert_eq!(object_key(Some(""), at), "countries_data_20240307_090502.json");
        assert_eq!(
            object_key(Some("raw/countries/"), at),
            "raw/countries/countries_data_20240307_090502.json"
        );
    }
}
