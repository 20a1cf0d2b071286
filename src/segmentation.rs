use crate::customer::{parse_date, CustomerRecord, EnrichedCustomer};
use crate::error::{DashboardError, Result};
use crate::recency::classify;
use chrono::NaiveDate;

/// Compute days-since-last-order and the recency bucket for every customer.
///
/// `today` is pinned by the caller for the whole pass. A future-dated order
/// counts as zero days. Any row without a usable date fails the pass; rows
/// are never skipped.
pub fn segment(customers: &[CustomerRecord], today: NaiveDate) -> Result<Vec<EnrichedCustomer>> {
    log::debug!("Segmenting {} customers against {}", customers.len(), today);

    customers
        .iter()
        .enumerate()
        .map(|(row, customer)| enrich(row, customer, today))
        .collect()
}

fn enrich(row: usize, customer: &CustomerRecord, today: NaiveDate) -> Result<EnrichedCustomer> {
    let raw_date = customer
        .last_order_date
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            DashboardError::InvalidInput(format!(
                "row {row} ({}): missing last order date",
                customer.name
            ))
        })?;

    let last_order_date = parse_date(raw_date).map_err(|e| {
        DashboardError::InvalidInput(format!("row {row} ({}): {e}", customer.name))
    })?;

    let raw_days = (today - last_order_date).num_days();
    if raw_days < 0 {
        log::warn!(
            "Customer '{}' has an order dated {} after {}, counting as 0 days",
            customer.name,
            last_order_date,
            today
        );
    }
    let days_since_last_order = raw_days.max(0);

    Ok(EnrichedCustomer {
        name: customer.name.clone(),
        phone: customer.phone.clone(),
        email: customer.email.clone(),
        last_order_date,
        order_count: customer.order_count,
        days_since_last_order,
        recency_bucket: classify(days_since_last_order),
        campaign_message: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recency::RecencyBucket;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_days_and_bucket() {
        let customers = vec![
            CustomerRecord::new("Ana", "1", "ana@example.com", "2024-06-30", 3),
            CustomerRecord::new("Bruno", "2", "bruno@example.com", "2024-06-15", 5),
            CustomerRecord::new("Carla", "3", "carla@example.com", "2024-06-01", 1),
            CustomerRecord::new("Davi", "4", "davi@example.com", "2024-01-01", 9),
        ];

        let enriched = segment(&customers, today()).unwrap();

        let days: Vec<i64> = enriched.iter().map(|c| c.days_since_last_order).collect();
        assert_eq!(days, vec![0, 15, 29, 181]);
        let buckets: Vec<RecencyBucket> = enriched.iter().map(|c| c.recency_bucket).collect();
        assert_eq!(
            buckets,
            vec![
                RecencyBucket::UpTo10,
                RecencyBucket::From11To20,
                RecencyBucket::From21To30,
                RecencyBucket::Over30
            ]
        );
        assert!(enriched.iter().all(|c| c.campaign_message.is_none()));
    }

    #[test]
    fn test_time_of_day_is_truncated() {
        let customers = vec![CustomerRecord::new("Ana", "1", "a@x.com", "2024-06-19 23:59:59", 1)];
        let enriched = segment(&customers, today()).unwrap();
        assert_eq!(enriched[0].days_since_last_order, 11);
        assert_eq!(enriched[0].recency_bucket, RecencyBucket::From11To20);
    }

    #[test]
    fn test_future_order_clamps_to_zero() {
        let customers = vec![CustomerRecord::new("Ana", "1", "a@x.com", "2024-07-04", 1)];
        let enriched = segment(&customers, today()).unwrap();
        assert_eq!(enriched[0].days_since_last_order, 0);
        assert_eq!(enriched[0].recency_bucket, RecencyBucket::UpTo10);
    }

    #[test]
    fn test_is_deterministic() {
        let customers = vec![
            CustomerRecord::new("Ana", "1", "a@x.com", "2024-05-01", 1),
            CustomerRecord::new("Bia", "2", "b@x.com", "2024-06-21", 2),
        ];
        assert_eq!(segment(&customers, today()).unwrap(), segment(&customers, today()).unwrap());
    }

    #[test]
    fn test_missing_or_bad_date_is_invalid_input() {
        let mut missing = CustomerRecord::new("Ana", "1", "a@x.com", "", 1);
        missing.last_order_date = None;
        match segment(&[missing], today()) {
            Err(DashboardError::InvalidInput(msg)) => assert!(msg.contains("Ana")),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }

        let blank = CustomerRecord::new("Bia", "1", "b@x.com", "   ", 1);
        assert!(matches!(segment(&[blank], today()), Err(DashboardError::InvalidInput(_))));

        let bad = vec![
            CustomerRecord::new("Ok", "1", "ok@x.com", "2024-06-01", 1),
            CustomerRecord::new("Bad", "2", "bad@x.com", "not a date", 1),
        ];
        match segment(&bad, today()) {
            Err(DashboardError::InvalidInput(msg)) => assert!(msg.contains("row 1")),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(segment(&[], today()).unwrap().is_empty());
    }
}
