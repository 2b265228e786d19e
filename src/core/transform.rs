use crate::domain::model::{json_kind, NormalizedCountryRecord, RawCountryRecord};
use crate::utils::error::{EtlError, Result};
use serde_json::{Number, Value};

/// 面積超過此值 (km²) 即為大國
pub const LARGE_COUNTRY_AREA_KM2: f64 = 1_000_000.0;

pub const NOT_AVAILABLE: &str = "N/A";

/// 人口密度，面積 <= 0 時回傳 0
pub fn population_density(population: f64, area: f64) -> f64 {
    if area > 0.0 {
        let density = population / area;
        if density.is_finite() {
            return density;
        }
    }
    0.0
}

pub fn is_large_country(area: f64) -> bool {
    area > LARGE_COUNTRY_AREA_KM2
}

/// 將一筆原始記錄轉為正規化記錄
pub fn transform(raw: &RawCountryRecord) -> Result<NormalizedCountryRecord> {
    let name = required_str(raw, "name.common")?;
    let region = required_str(raw, "region")?;
    let flag_url = required_str(raw, "flags.png")?;

    let population = number_or_zero(raw, "population")?;
    let area = number_or_zero(raw, "area")?;

    let population_f = population.as_f64().unwrap_or(0.0);
    let area_f = area.as_f64().unwrap_or(0.0);

    Ok(NormalizedCountryRecord {
        name,
        capital: first_capital(raw)?,
        population,
        area,
        region,
        subregion: optional_str(raw, "subregion")?.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        languages: languages(raw)?,
        currencies: currency_codes(raw)?,
        flag_url,
        population_density: population_density(population_f, area_f),
        is_large_country: is_large_country(area_f),
    })
}

fn invalid_type(path: &str, expected: &'static str) -> EtlError {
    EtlError::InvalidFieldType {
        path: path.to_string(),
        expected,
    }
}

fn required_str(raw: &RawCountryRecord, path: &str) -> Result<String> {
    optional_str(raw, path)?.ok_or_else(|| EtlError::MissingRequiredField {
        path: path.to_string(),
    })
}

fn optional_str(raw: &RawCountryRecord, path: &str) -> Result<Option<String>> {
    match raw.get(path) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid_type(path, "string")),
    }
}

fn number_or_zero(raw: &RawCountryRecord, path: &str) -> Result<Number> {
    match raw.get(path) {
        None => Ok(Number::from(0)),
        Some(Value::Number(n)) => Ok(n.clone()),
        Some(_) => Err(invalid_type(path, "number")),
    }
}

fn first_capital(raw: &RawCountryRecord) -> Result<String> {
    let capitals = match raw.get("capital") {
        None => return Ok(NOT_AVAILABLE.to_string()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(invalid_type("capital", "array of strings")),
    };

    match capitals.first() {
        None => Ok(NOT_AVAILABLE.to_string()),
        Some(Value::String(capital)) => Ok(capital.clone()),
        Some(_) => Err(invalid_type("capital", "array of strings")),
    }
}

fn languages(raw: &RawCountryRecord) -> Result<Vec<String>> {
    match raw.get("languages") {
        None => Ok(Vec::new()),
        Some(Value::Object(map)) => Ok(map
            .values()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()),
        Some(other) => {
            tracing::debug!("languages is a {}, expected object", json_kind(other));
            Err(invalid_type("languages", "object"))
        }
    }
}

fn currency_codes(raw: &RawCountryRecord) -> Result<Vec<String>> {
    match raw.get("currencies") {
        None => Ok(Vec::new()),
        Some(Value::Object(map)) => Ok(map.keys().cloned().collect()),
        Some(other) => {
            tracing::debug!("currencies is a {}, expected object", json_kind(other));
            Err(invalid_type("currencies", "object"))
        }
    }
}
