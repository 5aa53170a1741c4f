//! Campaign Fixtures

use rusty_money::iso::Currency;
use serde::Deserialize;
use tracing::warn;

use crate::campaigns::{Campaign, CampaignRecord, campaigns_from_records};

/// Wrapper for campaigns in YAML
///
/// Entries are kept as raw YAML so one oddly shaped campaign does not
/// prevent the rest of the file from loading.
#[derive(Debug, Deserialize)]
pub struct CampaignsFixture {
    /// Campaign records, same field names as the storefront API
    pub campaigns: Vec<serde_norway::Value>,
}

impl CampaignsFixture {
    /// Validate the records into campaigns priced in `currency`, dropping malformed ones.
    pub fn into_campaigns(self, currency: &'static Currency) -> Vec<Campaign<'static>> {
        let records = self.campaigns.into_iter().enumerate().filter_map(|(index, value)| {
            match serde_norway::from_value::<CampaignRecord>(value) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(record = index, error = %err, "dropping undecodable campaign fixture");

                    None
                }
            }
        });

        campaigns_from_records(records, currency)
    }
}
