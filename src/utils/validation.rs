use crate::utils::error::{EtlError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> EtlError {
    EtlError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| EtlError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// Broker 位址必須是 `host:port`
pub fn validate_broker_address(field_name: &str, address: &str) -> Result<()> {
    let Some((host, port)) = address.rsplit_once(':') else {
        return Err(invalid(field_name, address, "Broker address must be host:port"));
    };

    if host.trim().is_empty() {
        return Err(invalid(field_name, address, "Broker host cannot be empty"));
    }

    if port.parse::<u16>().map(|p| p == 0).unwrap_or(true) {
        return Err(invalid(
            field_name,
            address,
            format!("Invalid broker port: {}", port),
        ));
    }

    Ok(())
}

pub fn validate_brokers(field_name: &str, brokers: &[String]) -> Result<()> {
    if brokers.is_empty() {
        return Err(EtlError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    for broker in brokers {
        validate_broker_address(field_name, broker)?;
    }

    Ok(())
}

pub fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    if bucket_name.is_empty() {
        return Err(invalid(field_name, bucket_name, "S3 bucket name cannot be empty"));
    }

    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(invalid(
            field_name,
            bucket_name,
            "S3 bucket name must be between 3 and 63 characters",
        ));
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(invalid(
            field_name,
            bucket_name,
            "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots",
        ));
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(invalid(
            field_name,
            bucket_name,
            "S3 bucket name cannot start or end with a hyphen",
        ));
    }

    Ok(())
}

/// 將逗號分隔的 broker 清單切開，去掉空白與空項目
pub fn split_broker_list<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| entry.as_ref().split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("max_records", 5, 1).is_ok());
        assert!(validate_positive_number("max_records", 0, 1).is_err());
    }

    #[test]
    fn test_validate_broker_address() {
        assert!(validate_broker_address("brokers", "localhost:9092").is_ok());
        assert!(validate_broker_address("brokers", "b-1.kafka.internal:9094").is_ok());
        assert!(validate_broker_address("brokers", "localhost").is_err());
        assert!(validate_broker_address("brokers", ":9092").is_err());
        assert!(validate_broker_address("brokers", "localhost:http").is_err());
        assert!(validate_broker_address("brokers", "localhost:0").is_err());
    }

    #[test]
    fn test_validate_brokers_rejects_empty_list() {
        let result = validate_brokers("KAFKA_BROKERS", &[]);
        assert!(matches!(result, Err(EtlError::MissingConfigError { .. })));
    }

    #[test]
    fn test_validate_s3_bucket_name() {
        assert!(validate_s3_bucket_name("S3_BUCKET", "country-data.raw").is_ok());
        assert!(validate_s3_bucket_name("S3_BUCKET", "ab").is_err());
        assert!(validate_s3_bucket_name("S3_BUCKET", "Country-Data").is_err());
        assert!(validate_s3_bucket_name("S3_BUCKET", "-country-data").is_err());
    }

    #[test]
    fn test_split_broker_list() {
        let brokers = split_broker_list(&["kafka-1:9092, kafka-2:9092,", " kafka-3:9092"]);
        assert_eq!(brokers, vec!["kafka-1:9092", "kafka-2:9092", "kafka-3:9092"]);
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("max_records", 10, 1, 1000).is_ok());
        assert!(validate_range("max_records", 1001, 1, 1000).is_err());
    }
}
