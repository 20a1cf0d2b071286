use crate::association::associate;
use crate::campaign::{Campaign, CampaignRegistry, RegistryPolicy};
use crate::config::StorageConfig;
use crate::customer::{CustomerRecord, EnrichedCustomer};
use crate::error::Result;
use crate::query::{filter, sort, CustomerFilter, SortKey};
use crate::recency::RecencyBucket;
use crate::segmentation::segment;
use crate::statistics::{summary, DashboardSummary};
use crate::storage::{self, write_customers_csv};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::Path;

/// Sort applied to a view after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOrder {
    pub key: SortKey,
    pub descending: bool,
}

/// Customer table plus campaign registry, with the pipeline run on demand.
pub struct Dashboard {
    customers: Vec<CustomerRecord>,
    registry: CampaignRegistry,
}

impl Dashboard {
    pub fn new(customers: Vec<CustomerRecord>, registry: CampaignRegistry) -> Self {
        Self {
            customers,
            registry,
        }
    }

    pub fn open(config: &StorageConfig, policy: RegistryPolicy) -> Result<Self> {
        let customers = storage::load_customers(config)?;
        let registry = CampaignRegistry::from_storage(config, policy)?;
        Ok(Self::new(customers, registry))
    }

    pub fn customers(&self) -> &[CustomerRecord] {
        &self.customers
    }

    pub fn campaigns(&self) -> &[Campaign] {
        self.registry.list()
    }

    pub fn add_campaign(&mut self, campaign: Campaign) -> Result<()> {
        self.registry.add(campaign)
    }

    /// Segment against `today` and attach campaign messages.
    pub fn enriched(&self, today: NaiveDate) -> Result<Vec<EnrichedCustomer>> {
        let segmented = segment(&self.customers, today)?;
        Ok(associate(&segmented, self.registry.list()))
    }

    pub fn view(
        &self,
        today: NaiveDate,
        predicates: &CustomerFilter,
        ordering: Option<ViewOrder>,
    ) -> Result<Vec<EnrichedCustomer>> {
        let matched = filter(&self.enriched(today)?, predicates)?;
        Ok(match ordering {
            Some(ViewOrder { key, descending }) => sort(&matched, key, descending),
            None => matched,
        })
    }

    pub fn summary(&self, today: NaiveDate) -> Result<DashboardSummary> {
        Ok(summary(&self.enriched(today)?))
    }

    /// Buckets at least one customer is in, in bucket order. These are the
    /// choices offered when creating a campaign.
    pub fn present_buckets(&self, today: NaiveDate) -> Result<Vec<RecencyBucket>> {
        let present: BTreeSet<RecencyBucket> = segment(&self.customers, today)?
            .iter()
            .map(|customer| customer.recency_bucket)
            .collect();
        Ok(present.into_iter().collect())
    }

    pub fn export_csv<P: AsRef<Path>>(
        &self,
        path: P,
        today: NaiveDate,
        predicates: &CustomerFilter,
        ordering: Option<ViewOrder>,
    ) -> Result<usize> {
        let rows = self.view(today, predicates, ordering)?;
        write_customers_csv(path.as_ref(), &rows)?;
        log::info!("Exported {} customers to {}", rows.len(), path.as_ref().display());
        Ok(rows.len())
    }
}
