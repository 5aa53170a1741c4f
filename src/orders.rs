//! Orders
//!
//! The last gate before an order is placed: strips out every selected
//! promotion that the final cart no longer entitles the customer to.

use jiff::Timestamp;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    campaigns::{Campaign, CampaignId, CampaignScope, ScopeType},
    cart::{Cart, CartItem},
    catalog::{Catalog, CatalogError},
    products::ProductId,
};

/// A campaign the customer picked (or that was auto-applied) for this order.
#[derive(Debug, Clone, Copy)]
pub struct SelectedCampaign<'c, 'a> {
    /// The campaign
    pub campaign: &'c Campaign<'a>,

    /// Whether the caller already recorded a redemption of this campaign
    pub used: bool,
}

impl<'c, 'a> SelectedCampaign<'c, 'a> {
    /// A campaign that has not been redeemed.
    pub fn new(campaign: &'c Campaign<'a>) -> Self {
        Self {
            campaign,
            used: false,
        }
    }

    /// A campaign the caller has already redeemed.
    pub fn used(campaign: &'c Campaign<'a>) -> Self {
        Self {
            campaign,
            used: true,
        }
    }
}

/// Ids of the selected campaigns that may be submitted with this order.
///
/// - Inactive or already used campaigns are dropped.
/// - Only the first remaining campaign of each scope type is kept.
/// - A product-specific campaign must cover at least one product in the cart;
///   when it covers all of them, an all-products campaign is dropped.
/// - An order-total campaign needs `order_total` to reach its minimum.
///
/// An empty cart or a negative order total yields no ids.
pub fn filter_valid_promotions_for_order<'a>(
    selected: &[SelectedCampaign<'_, 'a>],
    cart_items: &[CartItem<'a>],
    order_total: Money<'a, Currency>,
    now: Timestamp,
) -> SmallVec<[CampaignId; 3]> {
    if cart_items.is_empty() || order_total.to_minor_units() < 0 {
        debug!(
            items = cart_items.len(),
            order_total = order_total.to_minor_units(),
            "no promotions can apply to this order"
        );

        return SmallVec::new();
    }

    let cart_products: FxHashSet<&ProductId> =
        cart_items.iter().map(|item| &item.product_id).collect();

    let mut seen: SmallVec<[ScopeType; 3]> = SmallVec::new();
    let mut kept: SmallVec<[&Campaign<'a>; 3]> = SmallVec::new();

    for selection in selected {
        let campaign = selection.campaign;

        if selection.used {
            debug!(campaign = %campaign.id(), "dropping used promotion");
            continue;
        }

        if !campaign.is_active(now) {
            debug!(campaign = %campaign.id(), "dropping inactive promotion");
            continue;
        }

        let scope_type = campaign.scope_type();

        if seen.contains(&scope_type) {
            debug!(
                campaign = %campaign.id(),
                scope = %scope_type,
                "dropping second promotion of scope"
            );
            continue;
        }

        seen.push(scope_type);
        kept.push(campaign);
    }

    let mut covers_whole_cart = false;

    kept.retain(|campaign| match campaign.scope() {
        CampaignScope::AllProducts => true,
        CampaignScope::SpecificProducts(product_ids) => {
            let covered = cart_products
                .iter()
                .filter(|id| product_ids.contains(**id))
                .count();

            if covered == 0 {
                debug!(campaign = %campaign.id(), "dropping promotion for products not in cart");
                return false;
            }

            covers_whole_cart = covered == cart_products.len();

            true
        }
        CampaignScope::OrderTotal { min_order_value } => {
            let reached = min_order_value.currency() == order_total.currency()
                && order_total.to_minor_units() >= min_order_value.to_minor_units();

            if !reached {
                debug!(
                    campaign = %campaign.id(),
                    order_total = order_total.to_minor_units(),
                    min_order_value = min_order_value.to_minor_units(),
                    "dropping promotion below minimum order value"
                );
            }

            reached
        }
    });

    if covers_whole_cart {
        kept.retain(|campaign| campaign.scope_type() != ScopeType::AllProducts);
    }

    kept.into_iter()
        .map(|campaign| campaign.id().clone())
        .collect()
}

/// What the checkout step sends to the order-creation request.
#[derive(Debug, Clone)]
pub struct OrderSubmission<'a> {
    /// Cart total at catalog prices
    pub subtotal: Money<'a, Currency>,

    /// Cart total after per-product promotions
    pub total: Money<'a, Currency>,

    /// Promotions that may be submitted with the order
    pub promotion_ids: SmallVec<[CampaignId; 3]>,
}

impl<'a> OrderSubmission<'a> {
    /// Price the cart against the catalog and filter the selected promotions.
    ///
    /// Order-total minimums are checked against the cart subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the cart totals overflow.
    pub fn prepare(
        catalog: &Catalog<'a>,
        cart: &Cart<'a>,
        selected: &[SelectedCampaign<'_, 'a>],
        now: Timestamp,
    ) -> Result<Self, CatalogError> {
        let priced = catalog.price_cart(cart, now)?;

        let promotion_ids =
            filter_valid_promotions_for_order(selected, cart.items(), priced.subtotal(), now);

        Ok(Self {
            subtotal: priced.subtotal(),
            total: priced.total(),
            promotion_ids,
        })
    }
}
