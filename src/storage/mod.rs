pub mod csv_store;
pub mod sqlite_store;

use crate::campaign::Campaign;
use crate::config::{StorageBackend, StorageConfig};
use crate::customer::CustomerRecord;
use crate::error::Result;

pub use csv_store::{load_customers_csv, write_customers_csv, CsvCampaignStore};
pub use sqlite_store::{load_customers_sqlite, SqliteCampaignStore};

/// Durable home of the campaign list.
///
/// `append` adds one row after the existing ones and never rewrites them.
pub trait CampaignStore {
    fn load(&self) -> Result<Vec<Campaign>>;
    fn append(&mut self, campaign: &Campaign) -> Result<()>;
}

/// Campaigns kept only for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryCampaignStore {
    campaigns: Vec<Campaign>,
}

impl MemoryCampaignStore {
    pub fn with_campaigns(campaigns: Vec<Campaign>) -> Self {
        Self { campaigns }
    }
}

impl CampaignStore for MemoryCampaignStore {
    fn load(&self) -> Result<Vec<Campaign>> {
        Ok(self.campaigns.clone())
    }

    fn append(&mut self, campaign: &Campaign) -> Result<()> {
        self.campaigns.push(campaign.clone());
        Ok(())
    }
}

pub fn open_campaign_store(config: &StorageConfig) -> Result<Box<dyn CampaignStore>> {
    match config.backend {
        StorageBackend::Csv => Ok(Box::new(CsvCampaignStore::new(&config.campaigns_path))),
        StorageBackend::Sqlite => Ok(Box::new(SqliteCampaignStore::open(&config.database_path)?)),
        StorageBackend::Memory => Ok(Box::new(MemoryCampaignStore::default())),
    }
}

pub fn load_customers(config: &StorageConfig) -> Result<Vec<CustomerRecord>> {
    let customers = match config.backend {
        StorageBackend::Csv | StorageBackend::Memory => load_customers_csv(&config.customers_path)?,
        StorageBackend::Sqlite => load_customers_sqlite(&config.database_path)?,
    };
    log::info!("Loaded {} customers ({:?} backend)", customers.len(), config.backend);
    Ok(customers)
}
