//! Pricing properties over campaigns loaded from an API payload.
//!
//! The payload mirrors what the storefront's campaign endpoint serves:
//! string and numeric ids mixed, plain dates and full timestamps, and a
//! record that fails validation.

use jiff::{Timestamp, ToSpan};
use rusty_money::{Money, iso::VND};
use testresult::TestResult;

use storefront_promotions::{
    campaigns::{Campaign, campaigns_from_json},
    pricing::{find_applicable_campaigns, price_product},
    products::ProductId,
};

const PAYLOAD: &str = r#"[
    {
        "id": 1,
        "name": "Anniversary",
        "code": "ANNIV20",
        "startDate": "2024-06-01",
        "endDate": "2024-06-30",
        "discountAmount": 20,
        "proportionType": "PERCENTAGE",
        "scopeType": "ALL_PRODUCTS"
    },
    {
        "id": "2",
        "name": "Phone bonus",
        "code": "PHONE5M",
        "startDate": "2024-06-10T00:00:00Z",
        "endDate": "2024-06-20T23:59:59Z",
        "discountAmount": 5000000,
        "proportionType": "ABSOLUTE",
        "scopeType": "SPECIFIC_PRODUCTS",
        "productIds": [1, "7"]
    },
    {
        "id": 3,
        "name": "Huge markdown",
        "code": "HUGE",
        "startDate": "2024-06-01",
        "endDate": "2024-06-30",
        "discountAmount": 99999999,
        "proportionType": "ABSOLUTE",
        "scopeType": "SPECIFIC_PRODUCTS",
        "productIds": [9]
    },
    {
        "id": 4,
        "name": "Big basket",
        "code": "BIG10M",
        "startDate": "2024-06-01",
        "endDate": "2024-06-30",
        "discountAmount": 500000,
        "proportionType": "ABSOLUTE",
        "scopeType": "ORDER_TOTAL",
        "minOrderValue": 10000000
    },
    {
        "id": 5,
        "name": "Backwards",
        "code": "OOPS",
        "startDate": "2024-06-30",
        "endDate": "2024-06-01",
        "discountAmount": 10,
        "proportionType": "PERCENTAGE",
        "scopeType": "ALL_PRODUCTS"
    }
]"#;

fn campaigns() -> Vec<Campaign<'static>> {
    campaigns_from_json(PAYLOAD, VND)
}

fn ids(campaigns: &[&Campaign<'_>]) -> Vec<String> {
    campaigns
        .iter()
        .map(|campaign| campaign.id().to_string())
        .collect()
}

#[test]
fn invalid_records_are_dropped() {
    let campaigns = campaigns();
    let loaded: Vec<&Campaign<'_>> = campaigns.iter().collect();

    assert_eq!(ids(&loaded), ["1", "2", "3", "4"]);
}

#[test]
fn storefront_scenario() -> TestResult {
    let campaigns = campaigns();
    let now: Timestamp = "2024-06-15T12:00:00Z".parse()?;

    let priced = price_product(
        &ProductId::from("1"),
        Money::from_minor(31_990_000, VND),
        &campaigns,
        now,
    );

    assert_eq!(priced.final_price(), Money::from_minor(25_592_000, VND));
    assert_eq!(
        priced.applied_campaign().map(Campaign::name),
        Some("Anniversary")
    );

    Ok(())
}

#[test]
fn plain_end_date_covers_the_whole_day() -> TestResult {
    let campaigns = campaigns();
    let product = ProductId::from("5");

    let last_moment: Timestamp = "2024-06-30T23:59:59Z".parse()?;
    let day_after: Timestamp = "2024-07-01T00:00:00Z".parse()?;

    assert_eq!(
        ids(&find_applicable_campaigns(&product, &campaigns, last_moment)),
        ["1"]
    );
    assert!(find_applicable_campaigns(&product, &campaigns, day_after).is_empty());

    Ok(())
}

#[test]
fn order_total_campaigns_never_price_products() -> TestResult {
    let campaigns = campaigns();
    let now: Timestamp = "2024-06-15T12:00:00Z".parse()?;

    for id in ["1", "5", "7", "9"] {
        let applicable = find_applicable_campaigns(&ProductId::from(id), &campaigns, now);

        assert!(
            !ids(&applicable).contains(&"4".to_string()),
            "order total campaign applied to product {id}"
        );
    }

    Ok(())
}

#[test]
fn final_price_stays_between_zero_and_original() -> TestResult {
    let campaigns = campaigns();
    let start: Timestamp = "2024-05-31T00:00:00Z".parse()?;

    let prices = [0, 1, 350_000, 5_000_000, 31_990_000, 150_000_000];
    let products = ["1", "7", "9", "42"];

    for day in 0..35 {
        let now = start.checked_add((day * 24 + 12).hours())?;

        for id in products {
            for minor in prices {
                let original = Money::from_minor(minor, VND);
                let outcome = price_product(&ProductId::from(id), original, &campaigns, now);
                let final_minor = outcome.final_price().to_minor_units();

                assert!(
                    (0..=minor).contains(&final_minor),
                    "product {id} at {minor} priced {final_minor} on {now}"
                );

                if !outcome.has_active_promotion() {
                    assert_eq!(outcome.final_price(), original, "unpromoted price changed");
                }
            }
        }
    }

    Ok(())
}

#[test]
fn absolute_discount_larger_than_price_clamps_to_zero() -> TestResult {
    let campaigns = campaigns();
    let now: Timestamp = "2024-06-15T12:00:00Z".parse()?;

    let priced = price_product(
        &ProductId::from("9"),
        Money::from_minor(2_000_000, VND),
        &campaigns,
        now,
    );

    assert_eq!(priced.final_price(), Money::from_minor(0, VND));
    assert_eq!(priced.savings(), Money::from_minor(2_000_000, VND));

    Ok(())
}
