use crate::customer::{parse_date, EnrichedCustomer};
use crate::error::{DashboardError, Result};
use crate::recency::RecencyBucket;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BucketSelection {
    #[default]
    All,
    Only(RecencyBucket),
}

impl FromStr for BucketSelection {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "todos" => Ok(BucketSelection::All),
            _ => Ok(BucketSelection::Only(s.parse()?)),
        }
    }
}

/// Active/inactive toggle of the customer table. Inactive customers are
/// the ones in the overflow bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityView {
    #[default]
    All,
    Active,
    Inactive,
}

impl ActivityView {
    fn admits(&self, bucket: RecencyBucket) -> bool {
        match self {
            ActivityView::All => true,
            ActivityView::Active => !bucket.is_overflow(),
            ActivityView::Inactive => bucket.is_overflow(),
        }
    }
}

impl FromStr for ActivityView {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ActivityView::All),
            "active" => Ok(ActivityView::Active),
            "inactive" => Ok(ActivityView::Inactive),
            other => Err(DashboardError::InvalidInput(format!("unknown view '{other}'"))),
        }
    }
}

/// Predicates over the enriched table. Every set predicate must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerFilter {
    pub bucket: BucketSelection,
    /// Inclusive lower bound on the last order date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the last order date.
    pub to: Option<NaiveDate>,
    /// Case-insensitive substring matched against name, phone or email.
    pub search: Option<String>,
    pub view: ActivityView,
}

impl CustomerFilter {
    /// Build a filter from raw user-supplied text.
    pub fn from_params(
        bucket: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self> {
        let filter = CustomerFilter {
            bucket: bucket
                .map(str::parse::<BucketSelection>)
                .transpose()?
                .unwrap_or_default(),
            from: from.map(parse_date).transpose()?,
            to: to.map(parse_date).transpose()?,
            search: search.map(str::to_string),
            view: ActivityView::All,
        };
        filter.validate()?;
        Ok(filter)
    }

    pub fn with_view(mut self, view: ActivityView) -> Self {
        self.view = view;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(DashboardError::InvalidInput(format!(
                    "date range start {from} is after end {to}"
                )));
            }
        }
        Ok(())
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase)
    }

    fn matches(&self, customer: &EnrichedCustomer, needle: Option<&str>) -> bool {
        if let BucketSelection::Only(bucket) = self.bucket {
            if customer.recency_bucket != bucket {
                return false;
            }
        }
        if !self.view.admits(customer.recency_bucket) {
            return false;
        }
        if self.from.is_some_and(|from| customer.last_order_date < from) {
            return false;
        }
        if self.to.is_some_and(|to| customer.last_order_date > to) {
            return false;
        }
        match needle {
            Some(needle) => [&customer.name, &customer.phone, &customer.email]
                .iter()
                .any(|field| field.to_lowercase().contains(needle)),
            None => true,
        }
    }
}

/// Keep the customers every predicate in `filter` admits, in input order.
pub fn filter(customers: &[EnrichedCustomer], filter: &CustomerFilter) -> Result<Vec<EnrichedCustomer>> {
    filter.validate()?;
    let needle = filter.needle();

    Ok(customers
        .iter()
        .filter(|customer| filter.matches(customer, needle.as_deref()))
        .cloned()
        .collect())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    OrderCount,
    DaysSinceLastOrder,
    Name,
}

impl SortKey {
    fn compare(&self, a: &EnrichedCustomer, b: &EnrichedCustomer) -> Ordering {
        match self {
            SortKey::OrderCount => a.order_count.cmp(&b.order_count),
            SortKey::DaysSinceLastOrder => a.days_since_last_order.cmp(&b.days_since_last_order),
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        }
    }
}

impl FromStr for SortKey {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "orders" | "order_count" => Ok(SortKey::OrderCount),
            "days" | "recency" | "days_since_last_order" => Ok(SortKey::DaysSinceLastOrder),
            "name" => Ok(SortKey::Name),
            other => Err(DashboardError::InvalidInput(format!("unknown sort key '{other}'"))),
        }
    }
}

/// Stable sort; equal keys keep their input order in both directions.
pub fn sort(customers: &[EnrichedCustomer], key: SortKey, descending: bool) -> Vec<EnrichedCustomer> {
    let mut sorted = customers.to_vec();
    if descending {
        sorted.sort_by(|a, b| key.compare(b, a));
    } else {
        sorted.sort_by(|a, b| key.compare(a, b));
    }
    sorted
}

pub fn top_n(customers: &[EnrichedCustomer], key: SortKey, n: usize) -> Vec<EnrichedCustomer> {
    let mut ranked = sort(customers, key, true);
    ranked.truncate(n);
    ranked
}
