//! Storefront promotions prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    campaigns::{
        Campaign, CampaignError, CampaignId, CampaignRecord, CampaignScope, PromotionCode,
        ScopeType, ValidityWindow, campaigns_from_json, campaigns_from_records,
    },
    cart::{Cart, CartError, CartItem},
    catalog::{Catalog, CatalogError, PricedCart, PricedLine},
    discounts::{Discount, DiscountError},
    listing::{ListingError, PriceListing},
    orders::{OrderSubmission, SelectedCampaign, filter_valid_promotions_for_order},
    pricing::{
        PricedProduct, find_applicable_campaigns, find_applicable_campaigns_now, price_product,
        price_product_now,
    },
    products::{Product, ProductId},
};
