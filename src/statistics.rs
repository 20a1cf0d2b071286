use crate::customer::EnrichedCustomer;
use crate::recency::RecencyBucket;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketCount {
    pub bucket: RecencyBucket,
    pub customers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_customers: usize,
    pub total_orders: u64,
    pub mean_orders: f64,
    pub mean_days_since_last_order: f64,
    pub customers_with_campaign: usize,
    pub distribution: Vec<BucketCount>,
}

/// Customers per bucket, every bucket present, in bucket order.
pub fn bucket_distribution(customers: &[EnrichedCustomer]) -> Vec<BucketCount> {
    let mut counts: HashMap<RecencyBucket, usize> = HashMap::new();
    for customer in customers {
        *counts.entry(customer.recency_bucket).or_insert(0) += 1;
    }

    RecencyBucket::ALL
        .iter()
        .map(|bucket| BucketCount {
            bucket: *bucket,
            customers: counts.get(bucket).copied().unwrap_or(0),
        })
        .collect()
}

pub fn summary(customers: &[EnrichedCustomer]) -> DashboardSummary {
    let total_customers = customers.len();
    let total_orders: u64 = customers.iter().map(|c| u64::from(c.order_count)).sum();
    let total_days: i64 = customers.iter().map(|c| c.days_since_last_order).sum();

    let (mean_orders, mean_days_since_last_order) = if total_customers > 0 {
        (
            total_orders as f64 / total_customers as f64,
            total_days as f64 / total_customers as f64,
        )
    } else {
        (0.0, 0.0)
    };

    DashboardSummary {
        total_customers,
        total_orders,
        mean_orders,
        mean_days_since_last_order,
        customers_with_campaign: customers
            .iter()
            .filter(|c| c.campaign_message.is_some())
            .count(),
        distribution: bucket_distribution(customers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn customer(orders: u32, days: i64, message: Option<&str>) -> EnrichedCustomer {
        EnrichedCustomer {
            name: "x".to_string(),
            phone: String::new(),
            email: String::new(),
            last_order_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            order_count: orders,
            days_since_last_order: days,
            recency_bucket: crate::recency::classify(days),
            campaign_message: message.map(str::to_string),
        }
    }

    #[test]
    fn test_distribution_includes_empty_buckets() {
        let customers = vec![customer(1, 3, None), customer(1, 8, None), customer(1, 45, None)];
        let counts: Vec<usize> = bucket_distribution(&customers)
            .iter()
            .map(|c| c.customers)
            .collect();
        assert_eq!(counts, vec![2, 0, 0, 1]);
    }

    #[test]
    fn test_summary() {
        let customers = vec![
            customer(4, 10, Some("Volte")),
            customer(2, 30, None),
        ];
        let s = summary(&customers);
        assert_eq!(s.total_customers, 2);
        assert_eq!(s.total_orders, 6);
        assert!((s.mean_orders - 3.0).abs() < f64::EPSILON);
        assert!((s.mean_days_since_last_order - 20.0).abs() < f64::EPSILON);
        assert_eq!(s.customers_with_campaign, 1);
    }

    #[test]
    fn test_summary_of_nothing() {
        let s = summary(&[]);
        assert_eq!(s.total_customers, 0);
        assert_eq!(s.mean_orders, 0.0);
        assert_eq!(s.distribution.len(), 4);
    }
}
