use crate::error::{DashboardError, Result};
use crate::recency::RecencyBucket;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Customer row as supplied by a loader.
///
/// `last_order_date` is kept as text until segmentation so that a bad value
/// is reported against the row it came from instead of failing the whole load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(alias = "telefone", default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(alias = "ultimo_pedido", default)]
    pub last_order_date: Option<String>,
    #[serde(alias = "qtd_pedidos", default)]
    pub order_count: u32,
}

impl CustomerRecord {
    pub fn new(name: &str, phone: &str, email: &str, last_order_date: &str, order_count: u32) -> Self {
        Self {
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
            last_order_date: Some(last_order_date.to_string()),
            order_count,
        }
    }
}

/// Customer with the derived recency and campaign fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCustomer {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub last_order_date: NaiveDate,
    pub order_count: u32,
    pub days_since_last_order: i64,
    pub recency_bucket: RecencyBucket,
    pub campaign_message: Option<String>,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

/// Parse a calendar date as the loaders see it. Time-of-day parts are dropped.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DashboardError::InvalidInput("empty date".to_string()));
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(datetime.date());
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.date_naive());
    }

    Err(DashboardError::InvalidInput(format!("unparseable date '{value}'")))
}

/// Serde hook for date fields read from files, accepting every format
/// `parse_date` does.
pub fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date("2024-03-09").unwrap(), expected);
        assert_eq!(parse_date("09/03/2024").unwrap(), expected);
        assert_eq!(parse_date("2024-03-09 23:59:10").unwrap(), expected);
        assert_eq!(parse_date("2024-03-09T08:00:00").unwrap(), expected);
        assert_eq!(parse_date("2024-03-09T08:00:00-03:00").unwrap(), expected);
        assert_eq!(parse_date("  2024-03-09  ").unwrap(), expected);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(matches!(parse_date(""), Err(DashboardError::InvalidInput(_))));
        assert!(matches!(parse_date("ontem"), Err(DashboardError::InvalidInput(_))));
        assert!(matches!(parse_date("2024-02-30"), Err(DashboardError::InvalidInput(_))));
    }

    #[test]
    fn test_record_accepts_portuguese_field_names() {
        let json = r#"{"nome":"Maria","telefone":"11 99999-0000","email":"maria@example.com","ultimo_pedido":"2024-01-05","qtd_pedidos":7}"#;
        let record: CustomerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, CustomerRecord::new("Maria", "11 99999-0000", "maria@example.com", "2024-01-05", 7));
    }
}
