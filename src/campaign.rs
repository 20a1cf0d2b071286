use crate::config::StorageConfig;
use crate::error::{DashboardError, Result};
use crate::recency::RecencyBucket;
use crate::storage::{self, CampaignStore, MemoryCampaignStore};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A message aimed at every customer in one recency bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(alias = "nome")]
    pub name: String,
    /// Bucket label, e.g. "11-20 dias". Kept as text so that campaigns
    /// stored with an unknown label still load.
    #[serde(alias = "grupo_alvo")]
    pub target_bucket: String,
    #[serde(alias = "mensagem")]
    pub message: String,
    #[serde(alias = "data_envio", deserialize_with = "crate::customer::deserialize_date")]
    pub send_date: NaiveDate,
}

impl Campaign {
    pub fn new(name: &str, target_bucket: &str, message: &str, send_date: NaiveDate) -> Self {
        Self {
            name: name.to_string(),
            target_bucket: target_bucket.to_string(),
            message: message.to_string(),
            send_date,
        }
    }

    /// Target as a known bucket. The label must match exactly.
    pub fn bucket(&self) -> Option<RecencyBucket> {
        RecencyBucket::from_label(&self.target_bucket)
    }

    pub fn validate(&self, policy: &RegistryPolicy) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("target_bucket", &self.target_bucket),
            ("message", &self.message),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DashboardError::Validation(format!("{field} must not be empty")));
            }
        }

        if self.bucket().is_none() {
            if policy.strict_target_bucket {
                return Err(DashboardError::Validation(format!(
                    "unknown target bucket '{}'",
                    self.target_bucket
                )));
            }
            log::warn!(
                "Campaign '{}' targets unknown bucket '{}', it will never match a customer",
                self.name,
                self.target_bucket
            );
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryPolicy {
    /// Reject campaigns whose target is not one of the recency buckets.
    #[serde(default)]
    pub strict_target_bucket: bool,
}

/// Append-only list of campaigns, mirrored to a backing store.
pub struct CampaignRegistry {
    store: Box<dyn CampaignStore>,
    campaigns: Vec<Campaign>,
    policy: RegistryPolicy,
}

impl Default for CampaignRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignRegistry {
    /// Empty registry backed by memory only.
    pub fn new() -> Self {
        Self {
            store: Box::new(MemoryCampaignStore::default()),
            campaigns: Vec::new(),
            policy: RegistryPolicy::default(),
        }
    }

    /// Load the existing campaigns from `store` in stored order.
    pub fn open(store: Box<dyn CampaignStore>, policy: RegistryPolicy) -> Result<Self> {
        let campaigns = store.load()?;
        log::debug!("Loaded {} campaigns", campaigns.len());
        Ok(Self {
            store,
            campaigns,
            policy,
        })
    }

    /// Open the configured campaign store. Customer data is not touched.
    pub fn from_storage(config: &StorageConfig, policy: RegistryPolicy) -> Result<Self> {
        Self::open(storage::open_campaign_store(config)?, policy)
    }

    /// Validate and append. Nothing is written when validation or the store fails.
    pub fn add(&mut self, campaign: Campaign) -> Result<()> {
        campaign.validate(&self.policy)?;
        self.store.append(&campaign)?;
        log::info!(
            "Campaign '{}' saved for bucket '{}'",
            campaign.name,
            campaign.target_bucket
        );
        self.campaigns.push(campaign);
        Ok(())
    }

    pub fn list(&self) -> &[Campaign] {
        &self.campaigns
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut registry = CampaignRegistry::new();
        registry.add(Campaign::new("Volta", "31+ dias", "Sentimos sua falta", date())).unwrap();
        registry.add(Campaign::new("Promo", "0-10 dias", "Pizza em dobro", date())).unwrap();
        registry.add(Campaign::new("Volta", "31+ dias", "Cupom de 20%", date())).unwrap();

        let names: Vec<&str> = registry.list().iter().map(|c| c.message.as_str()).collect();
        assert_eq!(names, vec!["Sentimos sua falta", "Pizza em dobro", "Cupom de 20%"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_empty_required_fields_are_rejected() {
        let mut registry = CampaignRegistry::new();
        for campaign in [
            Campaign::new("", "0-10 dias", "msg", date()),
            Campaign::new("name", "", "msg", date()),
            Campaign::new("name", "0-10 dias", "  ", date()),
        ] {
            match registry.add(campaign) {
                Err(DashboardError::Validation(_)) => {}
                other => panic!("Expected validation error, got {other:?}"),
            }
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_bucket_accepted_by_default() {
        let mut registry = CampaignRegistry::new();
        registry.add(Campaign::new("Odd", "45-60 dias", "msg", date())).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.list()[0].bucket(), None);
    }

    #[test]
    fn test_unknown_bucket_rejected_when_strict() {
        let policy = RegistryPolicy {
            strict_target_bucket: true,
        };
        let mut registry =
            CampaignRegistry::open(Box::new(MemoryCampaignStore::default()), policy).unwrap();
        assert!(matches!(
            registry.add(Campaign::new("Odd", "45-60 dias", "msg", date())),
            Err(DashboardError::Validation(_))
        ));
        registry.add(Campaign::new("Ok", "21-30 dias", "msg", date())).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_strict_rejects_label_that_only_matches_loosely() {
        let policy = RegistryPolicy {
            strict_target_bucket: true,
        };
        let mut registry =
            CampaignRegistry::open(Box::new(MemoryCampaignStore::default()), policy).unwrap();
        assert!(matches!(
            registry.add(Campaign::new("Caps", " 0-10 DIAS ", "msg", date())),
            Err(DashboardError::Validation(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_from_storage_works_without_customer_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            customers_path: dir.path().join("missing.csv").display().to_string(),
            campaigns_path: dir.path().join("campanhas.csv").display().to_string(),
            ..StorageConfig::default()
        };

        let mut registry = CampaignRegistry::from_storage(&config, RegistryPolicy::default()).unwrap();
        assert!(registry.is_empty());
        registry.add(Campaign::new("Volta", "31+ dias", "Volte!", date())).unwrap();

        let reopened = CampaignRegistry::from_storage(&config, RegistryPolicy::default()).unwrap();
        assert_eq!(reopened.list()[0].name, "Volta");
    }

    #[test]
    fn test_open_loads_existing_campaigns() {
        let store = MemoryCampaignStore::with_campaigns(vec![Campaign::new(
            "Old",
            "11-20 dias",
            "Ainda com fome?",
            date(),
        )]);
        let mut registry = CampaignRegistry::open(Box::new(store), RegistryPolicy::default()).unwrap();
        registry.add(Campaign::new("New", "11-20 dias", "Volte!", date())).unwrap();
        let names: Vec<&str> = registry.list().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Old", "New"]);
    }
}
