//! Campaign Scope

use std::fmt;

use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::products::ProductId;

/// Which purchases a campaign can discount.
#[derive(Debug, Clone, PartialEq)]
pub enum CampaignScope<'a> {
    /// Every product, no further condition.
    AllProducts,

    /// Only the listed products.
    SpecificProducts(FxHashSet<ProductId>),

    /// The whole order, once its subtotal reaches `min_order_value`.
    OrderTotal {
        /// Minimum cart subtotal that activates the campaign
        min_order_value: Money<'a, Currency>,
    },
}

impl CampaignScope<'_> {
    /// The scope category, without its data.
    pub fn scope_type(&self) -> ScopeType {
        match self {
            CampaignScope::AllProducts => ScopeType::AllProducts,
            CampaignScope::SpecificProducts(_) => ScopeType::SpecificProducts,
            CampaignScope::OrderTotal { .. } => ScopeType::OrderTotal,
        }
    }

    /// Whether a per-product price lookup for `product_id` falls within this scope.
    ///
    /// Order-level campaigns never match a single product.
    pub fn covers_product(&self, product_id: &ProductId) -> bool {
        match self {
            CampaignScope::AllProducts => true,
            CampaignScope::SpecificProducts(product_ids) => product_ids.contains(product_id),
            CampaignScope::OrderTotal { .. } => false,
        }
    }
}

/// Scope category of a campaign, as written in campaign records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScopeType {
    /// `ALL_PRODUCTS`
    AllProducts,

    /// `SPECIFIC_PRODUCTS`
    SpecificProducts,

    /// `ORDER_TOTAL`
    OrderTotal,
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScopeType::AllProducts => "ALL_PRODUCTS",
            ScopeType::SpecificProducts => "SPECIFIC_PRODUCTS",
            ScopeType::OrderTotal => "ORDER_TOTAL",
        })
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::VND;

    use super::*;

    #[test]
    fn all_products_covers_any_product() {
        assert!(CampaignScope::AllProducts.covers_product(&ProductId::from("anything")));
    }

    #[test]
    fn specific_products_covers_listed_products_only() {
        let scope = CampaignScope::SpecificProducts(
            ["p1", "p2"].into_iter().map(ProductId::from).collect(),
        );

        assert!(scope.covers_product(&ProductId::from("p2")));
        assert!(!scope.covers_product(&ProductId::from("p3")));
    }

    #[test]
    fn order_total_never_covers_a_product() {
        let scope = CampaignScope::OrderTotal {
            min_order_value: Money::from_minor(0, VND),
        };

        assert!(!scope.covers_product(&ProductId::from("p1")));
    }

    #[test]
    fn scope_type_matches_variant() {
        let scope = CampaignScope::SpecificProducts(FxHashSet::default());

        assert_eq!(scope.scope_type(), ScopeType::SpecificProducts);
        assert_eq!(scope.scope_type().to_string(), "SPECIFIC_PRODUCTS");
    }
}
