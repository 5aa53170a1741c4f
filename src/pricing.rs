//! Pricing
//!
//! Resolves which campaigns apply to a product, picks the one that saves the
//! customer the most, and computes the price they pay.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::{campaigns::Campaign, products::ProductId};

/// Outcome of pricing a single product.
#[derive(Debug, Clone)]
pub struct PricedProduct<'a, 'c> {
    original_price: Money<'a, Currency>,
    final_price: Money<'a, Currency>,
    applied_campaign: Option<&'c Campaign<'a>>,
}

impl<'a, 'c> PricedProduct<'a, 'c> {
    /// A product priced without any promotion.
    pub fn full_price(price: Money<'a, Currency>) -> Self {
        Self {
            original_price: price,
            final_price: price,
            applied_campaign: None,
        }
    }

    /// Whether a campaign was applied
    pub fn has_active_promotion(&self) -> bool {
        self.applied_campaign.is_some()
    }

    /// Price before any promotion
    pub fn original_price(&self) -> Money<'a, Currency> {
        self.original_price
    }

    /// Price the customer pays
    pub fn final_price(&self) -> Money<'a, Currency> {
        self.final_price
    }

    /// The winning campaign, if any
    pub fn applied_campaign(&self) -> Option<&'c Campaign<'a>> {
        self.applied_campaign
    }

    /// Amount taken off the original price.
    pub fn savings(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.original_price
                .to_minor_units()
                .saturating_sub(self.final_price.to_minor_units()),
            self.original_price.currency(),
        )
    }
}

/// Campaigns that can discount `product_id` at `now`, in input order.
///
/// A campaign qualifies when it is active and its scope covers the product;
/// order-level campaigns never qualify here.
pub fn find_applicable_campaigns<'a, 'c>(
    product_id: &ProductId,
    campaigns: &'c [Campaign<'a>],
    now: Timestamp,
) -> SmallVec<[&'c Campaign<'a>; 4]> {
    campaigns
        .iter()
        .filter(|campaign| campaign.applies_to_product(product_id, now))
        .collect()
}

/// [`find_applicable_campaigns`] evaluated at the current time.
pub fn find_applicable_campaigns_now<'a, 'c>(
    product_id: &ProductId,
    campaigns: &'c [Campaign<'a>],
) -> SmallVec<[&'c Campaign<'a>; 4]> {
    find_applicable_campaigns(product_id, campaigns, Timestamp::now())
}

/// Price a product against the campaign list at `now`.
///
/// When several campaigns apply, the one with the greatest monetary discount
/// on `original_price` wins, whatever its scope. Discounts are compared
/// before rounding to the minor unit. Ties go to the campaign
/// listed first. The final price never drops below zero.
///
/// A campaign whose discount cannot be evaluated against this price (an
/// amount in another currency, or arithmetic overflow) is skipped.
pub fn price_product<'a, 'c>(
    product_id: &ProductId,
    original_price: Money<'a, Currency>,
    campaigns: &'c [Campaign<'a>],
    now: Timestamp,
) -> PricedProduct<'a, 'c> {
    let candidates = find_applicable_campaigns(product_id, campaigns, now);

    let mut best: Option<(&'c Campaign<'a>, Decimal, Money<'a, Currency>)> = None;

    for campaign in candidates.iter().copied() {
        let discount = campaign.discount();

        let evaluated = discount
            .exact_discount(&original_price)
            .and_then(|amount| Ok((amount, discount.apply_to(&original_price)?)));

        let (amount, final_price) = match evaluated {
            Ok(evaluated) => evaluated,
            Err(err) => {
                warn!(
                    product = %product_id,
                    campaign = %campaign.id(),
                    error = %err,
                    "skipping campaign that cannot price this product"
                );

                continue;
            }
        };

        if best
            .as_ref()
            .is_none_or(|(_, best_amount, _)| amount > *best_amount)
        {
            best = Some((campaign, amount, final_price));
        }
    }

    let Some((campaign, _, final_price)) = best else {
        return PricedProduct::full_price(original_price);
    };

    debug!(
        product = %product_id,
        campaign = %campaign.id(),
        candidates = candidates.len(),
        "selected campaign"
    );

    PricedProduct {
        original_price,
        final_price,
        applied_campaign: Some(campaign),
    }
}

/// [`price_product`] evaluated at the current time.
pub fn price_product_now<'a, 'c>(
    product_id: &ProductId,
    original_price: Money<'a, Currency>,
    campaigns: &'c [Campaign<'a>],
) -> PricedProduct<'a, 'c> {
    price_product(product_id, original_price, campaigns, Timestamp::now())
}
