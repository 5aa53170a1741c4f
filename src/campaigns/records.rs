//! Campaign Records
//!
//! The loosely typed shape campaigns take in fixtures and API payloads.
//! A record that fails validation is dropped (and logged); it never stops
//! the rest of the batch from loading.

use std::fmt;

use jiff::{
    Timestamp,
    civil::{Date, DateTime},
    tz::TimeZone,
};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    campaigns::{
        Campaign, CampaignError, CampaignId, CampaignScope, PromotionCode, ScopeType,
        ValidityWindow,
    },
    discounts::{Discount, round_minor},
    products::ProductId,
};

/// How `discountAmount` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProportionType {
    /// Whole-number percent off
    Percentage,

    /// Currency amount off
    Absolute,
}

/// Identifier as it appears on the wire: the mock data uses numbers, the API strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric id
    Number(i64),

    /// String id
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(id) => write!(f, "{id}"),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

/// Campaign as loaded from a fixture or API payload, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    /// Campaign id
    pub id: Option<RecordId>,

    /// Display name
    pub name: Option<String>,

    /// Promotion code, `[A-Z0-9]+`
    pub code: Option<String>,

    /// RFC 3339 timestamp or `YYYY-MM-DD` date
    pub start_date: Option<String>,

    /// RFC 3339 timestamp or `YYYY-MM-DD` date (a date covers the whole day)
    pub end_date: Option<String>,

    /// Percent (0-100) or major currency units, depending on `proportion_type`
    pub discount_amount: Option<f64>,

    /// How to read `discount_amount`
    pub proportion_type: Option<ProportionType>,

    /// Scope category
    pub scope_type: Option<ScopeType>,

    /// Products covered by a `SPECIFIC_PRODUCTS` campaign
    pub product_ids: Option<Vec<RecordId>>,

    /// Minimum subtotal for an `ORDER_TOTAL` campaign, in major currency units
    pub min_order_value: Option<f64>,
}

impl CampaignRecord {
    /// Validate the record into a [`Campaign`] priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`CampaignError`] describing the first problem found.
    pub fn into_campaign(self, currency: &Currency) -> Result<Campaign<'_>, CampaignError> {
        let id = self.id.ok_or(CampaignError::MissingField("id"))?;
        let name = self.name.ok_or(CampaignError::MissingField("name"))?;
        let code = self.code.ok_or(CampaignError::MissingField("code"))?;
        let code = PromotionCode::parse(&code)?;

        let start = self
            .start_date
            .as_deref()
            .ok_or(CampaignError::MissingField("startDate"))
            .and_then(|raw| parse_instant(raw, DayBoundary::Start))?;

        let end = self
            .end_date
            .as_deref()
            .ok_or(CampaignError::MissingField("endDate"))
            .and_then(|raw| parse_instant(raw, DayBoundary::End))?;

        let window = ValidityWindow::new(start, end)?;

        let amount = self
            .discount_amount
            .ok_or(CampaignError::MissingField("discountAmount"))?;

        let discount = match self
            .proportion_type
            .ok_or(CampaignError::MissingField("proportionType"))?
        {
            ProportionType::Percentage => Discount::percent_off(to_decimal(amount)?)?,
            ProportionType::Absolute => Discount::amount_off(to_money(amount, currency)?)?,
        };

        let scope = match self
            .scope_type
            .ok_or(CampaignError::MissingField("scopeType"))?
        {
            ScopeType::AllProducts => CampaignScope::AllProducts,
            ScopeType::SpecificProducts => CampaignScope::SpecificProducts(
                self.product_ids
                    .unwrap_or_default()
                    .into_iter()
                    .map(|id| ProductId::new(id.to_string()))
                    .collect::<FxHashSet<_>>(),
            ),
            ScopeType::OrderTotal => CampaignScope::OrderTotal {
                min_order_value: to_money(self.min_order_value.unwrap_or_default(), currency)?,
            },
        };

        Ok(Campaign::new(
            CampaignId::new(id.to_string()),
            name,
            code,
            window,
            discount,
            scope,
        ))
    }
}

/// Validate a batch of records, dropping the malformed ones.
///
/// Input order is preserved among the survivors.
pub fn campaigns_from_records(
    records: impl IntoIterator<Item = CampaignRecord>,
    currency: &Currency,
) -> Vec<Campaign<'_>> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let label = record
                .id
                .as_ref()
                .map_or_else(|| format!("#{index}"), ToString::to_string);

            match record.into_campaign(currency) {
                Ok(campaign) => Some(campaign),
                Err(err) => {
                    warn!(campaign = %label, error = %err, "dropping malformed campaign record");

                    None
                }
            }
        })
        .collect()
}

/// Parse a JSON array of campaign records, as served by the storefront API.
///
/// Anything other than an array yields no campaigns. Elements that are not
/// campaign-shaped are dropped like any other malformed record.
pub fn campaigns_from_json<'a>(payload: &str, currency: &'a Currency) -> Vec<Campaign<'a>> {
    let values = match serde_json::from_str::<Vec<serde_json::Value>>(payload) {
        Ok(values) => values,
        Err(err) => {
            warn!(error = %err, "campaign payload is not a JSON array");

            return Vec::new();
        }
    };

    let records = values
        .into_iter()
        .enumerate()
        .filter_map(
            |(index, value)| match serde_json::from_value::<CampaignRecord>(value) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(record = index, error = %err, "dropping undecodable campaign record");

                    None
                }
            },
        );

    campaigns_from_records(records, currency)
}

#[derive(Debug, Clone, Copy)]
enum DayBoundary {
    Start,
    End,
}

/// Parse a record date. Plain dates resolve to the first or last instant of that day in UTC,
/// offset-less datetimes are read as UTC.
fn parse_instant(raw: &str, boundary: DayBoundary) -> Result<Timestamp, CampaignError> {
    let invalid = || CampaignError::InvalidDate(raw.to_string());
    let raw = raw.trim();

    if let Ok(timestamp) = raw.parse::<Timestamp>() {
        return Ok(timestamp);
    }

    let datetime = if raw.contains('T') || raw.contains(' ') {
        raw.parse::<DateTime>().map_err(|_err| invalid())?
    } else {
        let date = raw.parse::<Date>().map_err(|_err| invalid())?;

        match boundary {
            DayBoundary::Start => date.at(0, 0, 0, 0),
            DayBoundary::End => date.at(23, 59, 59, 999_999_999),
        }
    };

    datetime
        .to_zoned(TimeZone::UTC)
        .map(|zoned| zoned.timestamp())
        .map_err(|_err| invalid())
}

fn to_decimal(amount: f64) -> Result<Decimal, CampaignError> {
    Decimal::from_f64(amount).ok_or(CampaignError::InvalidAmount(amount))
}

/// Convert an amount in major units into money, rounding to the currency's minor unit.
fn to_money(amount: f64, currency: &Currency) -> Result<Money<'_, Currency>, CampaignError> {
    let invalid = CampaignError::InvalidAmount(amount);
    let decimal = to_decimal(amount)?;

    if decimal < Decimal::ZERO {
        return Err(invalid);
    }

    let minor = 10_i64
        .checked_pow(currency.exponent)
        .and_then(|scale| decimal.checked_mul(Decimal::from(scale)))
        .and_then(|minor| round_minor(minor).ok())
        .ok_or(invalid)?;

    Ok(Money::from_minor(minor, currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{USD, VND};
    use testresult::TestResult;

    use super::*;

    fn record() -> CampaignRecord {
        CampaignRecord {
            id: Some(RecordId::Number(1)),
            name: Some("Back to school".to_string()),
            code: Some("SCHOOL20".to_string()),
            start_date: Some("2024-08-01".to_string()),
            end_date: Some("2024-08-31".to_string()),
            discount_amount: Some(20.0),
            proportion_type: Some(ProportionType::Percentage),
            scope_type: Some(ScopeType::AllProducts),
            product_ids: None,
            min_order_value: None,
        }
    }

    #[test]
    fn valid_record_converts() -> TestResult {
        let campaign = record().into_campaign(VND)?;

        assert_eq!(campaign.id(), &CampaignId::from("1"));
        assert_eq!(campaign.code().as_str(), "SCHOOL20");
        assert_eq!(campaign.scope_type(), ScopeType::AllProducts);
        assert_eq!(campaign.discount().to_string(), "20% off");

        Ok(())
    }

    #[test]
    fn plain_dates_cover_whole_days() -> TestResult {
        let campaign = record().into_campaign(VND)?;

        assert_eq!(
            campaign.window().start(),
            "2024-08-01T00:00:00Z".parse::<Timestamp>()?
        );
        assert!(campaign.is_active("2024-08-31T23:59:59Z".parse()?));
        assert!(!campaign.is_active("2024-09-01T00:00:00Z".parse()?));

        Ok(())
    }

    #[test]
    fn timestamps_with_offsets_are_respected() -> TestResult {
        let campaign = CampaignRecord {
            start_date: Some("2024-08-01T00:00:00+07:00".to_string()),
            ..record()
        }
        .into_campaign(VND)?;

        assert_eq!(
            campaign.window().start(),
            "2024-07-31T17:00:00Z".parse::<Timestamp>()?
        );

        Ok(())
    }

    #[test]
    fn missing_dates_are_reported() {
        let result = CampaignRecord {
            end_date: None,
            ..record()
        }
        .into_campaign(VND);

        assert!(matches!(result, Err(CampaignError::MissingField("endDate"))));
    }

    #[test]
    fn missing_discount_amount_is_reported() {
        let result = CampaignRecord {
            discount_amount: None,
            ..record()
        }
        .into_campaign(VND);

        assert!(matches!(result, Err(CampaignError::MissingField("discountAmount"))));
    }

    #[test]
    fn unparseable_date_is_reported() {
        let result = CampaignRecord {
            start_date: Some("next tuesday".to_string()),
            ..record()
        }
        .into_campaign(VND);

        assert!(matches!(result, Err(CampaignError::InvalidDate(_))));
    }

    #[test]
    fn inverted_window_is_reported() {
        let result = CampaignRecord {
            start_date: Some("2024-09-01".to_string()),
            ..record()
        }
        .into_campaign(VND);

        assert!(matches!(result, Err(CampaignError::InvertedWindow { .. })));
    }

    #[test]
    fn percentage_over_one_hundred_is_rejected() {
        let result = CampaignRecord {
            discount_amount: Some(120.0),
            ..record()
        }
        .into_campaign(VND);

        assert!(matches!(result, Err(CampaignError::Discount(_))));
    }

    #[test]
    fn negative_absolute_amount_is_rejected() {
        let result = CampaignRecord {
            discount_amount: Some(-5_000.0),
            proportion_type: Some(ProportionType::Absolute),
            ..record()
        }
        .into_campaign(VND);

        assert!(matches!(result, Err(CampaignError::InvalidAmount(_))));
    }

    #[test]
    fn absolute_amounts_use_currency_minor_units() -> TestResult {
        let campaign = CampaignRecord {
            discount_amount: Some(2.5),
            proportion_type: Some(ProportionType::Absolute),
            ..record()
        }
        .into_campaign(USD)?;

        assert!(matches!(
            campaign.discount(),
            Discount::Absolute(amount) if amount.to_minor_units() == 250
        ));

        Ok(())
    }

    #[test]
    fn half_minor_units_round_away_from_zero() -> TestResult {
        let campaign = CampaignRecord {
            discount_amount: Some(2.5),
            proportion_type: Some(ProportionType::Absolute),
            ..record()
        }
        .into_campaign(VND)?;

        assert!(matches!(
            campaign.discount(),
            Discount::Absolute(amount) if amount.to_minor_units() == 3
        ));

        Ok(())
    }

    #[test]
    fn specific_products_accepts_numeric_and_string_ids() -> TestResult {
        let campaign = CampaignRecord {
            scope_type: Some(ScopeType::SpecificProducts),
            product_ids: Some(vec![RecordId::Number(7), RecordId::Text("sku-9".to_string())]),
            ..record()
        }
        .into_campaign(VND)?;

        assert!(campaign.scope().covers_product(&ProductId::from("7")));
        assert!(campaign.scope().covers_product(&ProductId::from("sku-9")));

        Ok(())
    }

    #[test]
    fn order_total_without_minimum_has_zero_threshold() -> TestResult {
        let campaign = CampaignRecord {
            scope_type: Some(ScopeType::OrderTotal),
            ..record()
        }
        .into_campaign(VND)?;

        assert_eq!(
            campaign.scope(),
            &CampaignScope::OrderTotal {
                min_order_value: Money::from_minor(0, VND)
            }
        );

        Ok(())
    }

    #[test]
    fn batch_conversion_drops_malformed_records() {
        let records = vec![
            record(),
            CampaignRecord {
                id: Some(RecordId::Number(2)),
                code: Some("bad code".to_string()),
                ..record()
            },
            CampaignRecord {
                id: Some(RecordId::Number(3)),
                ..record()
            },
        ];

        let campaigns = campaigns_from_records(records, VND);
        let ids: Vec<&str> = campaigns.iter().map(|c| c.id().as_str()).collect();

        assert_eq!(ids, ["1", "3"]);
    }

    #[test]
    fn json_payload_is_parsed_with_camel_case_fields() {
        let payload = r#"[
            {
                "id": "c-1",
                "name": "Laptop week",
                "code": "LAPTOP5M",
                "startDate": "2024-06-01T00:00:00Z",
                "endDate": "2024-06-07T23:59:59Z",
                "discountAmount": 5000000,
                "proportionType": "ABSOLUTE",
                "scopeType": "SPECIFIC_PRODUCTS",
                "productIds": [1, 2]
            },
            { "id": "c-2", "proportionType": "HALF_OFF" },
            "not a campaign"
        ]"#;

        let campaigns = campaigns_from_json(payload, VND);

        assert_eq!(campaigns.len(), 1);
        assert!(
            campaigns
                .first()
                .is_some_and(|c| c.scope().covers_product(&ProductId::from("2")))
        );
    }

    #[test]
    fn json_payload_that_is_not_a_list_yields_nothing() {
        assert!(campaigns_from_json(r#"{"campaigns": []}"#, VND).is_empty());
        assert!(campaigns_from_json("not json", VND).is_empty());
    }
}
