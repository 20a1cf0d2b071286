use crate::campaign::Campaign;
use crate::customer::EnrichedCustomer;
use crate::recency::RecencyBucket;
use std::collections::HashMap;

/// Bucket to message map. Later campaigns overwrite earlier ones for the
/// same bucket; campaigns with an unknown target are skipped.
pub fn messages_by_bucket(campaigns: &[Campaign]) -> HashMap<RecencyBucket, &str> {
    let mut messages = HashMap::new();
    for campaign in campaigns {
        if let Some(bucket) = campaign.bucket() {
            messages.insert(bucket, campaign.message.as_str());
        }
    }
    messages
}

/// Attach each customer's campaign message by bucket.
pub fn associate(customers: &[EnrichedCustomer], campaigns: &[Campaign]) -> Vec<EnrichedCustomer> {
    let messages = messages_by_bucket(campaigns);

    customers
        .iter()
        .map(|customer| EnrichedCustomer {
            campaign_message: messages
                .get(&customer.recency_bucket)
                .map(|message| message.to_string()),
            ..customer.clone()
        })
        .collect()
}
