pub mod association;
pub mod campaign;
pub mod config;
pub mod customer;
pub mod dashboard;
pub mod error;
pub mod query;
pub mod recency;
pub mod segmentation;
pub mod statistics;
pub mod storage;

pub use association::associate;
pub use campaign::{Campaign, CampaignRegistry, RegistryPolicy};
pub use config::DashboardConfig;
pub use customer::{CustomerRecord, EnrichedCustomer};
pub use dashboard::{Dashboard, ViewOrder};
pub use error::{DashboardError, Result};
pub use query::{filter, sort, top_n, ActivityView, BucketSelection, CustomerFilter, SortKey};
pub use recency::{classify, RecencyBucket};
pub use segmentation::segment;
pub use storage::CampaignStore;
