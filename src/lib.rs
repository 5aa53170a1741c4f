//! Storefront Promotions
//!
//! Promotion pricing for an e-commerce storefront. Given a product and the
//! campaigns currently on offer, it works out which campaigns apply, picks
//! the one that saves the customer the most, and computes the final price.
//! At checkout it filters the promotions a customer selected against the
//! cart contents and order total.
//!
//! ```
//! use jiff::Timestamp;
//! use rust_decimal::Decimal;
//! use rusty_money::{Money, iso::VND};
//! use storefront_promotions::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let now: Timestamp = "2024-06-15T12:00:00Z".parse()?;
//!
//! let anniversary = Campaign::new(
//!     CampaignId::from("1"),
//!     "Anniversary",
//!     PromotionCode::parse("ANNIV20")?,
//!     ValidityWindow::new("2024-06-01T00:00:00Z".parse()?, "2024-06-30T23:59:59Z".parse()?)?,
//!     Discount::percent_off(Decimal::from(20))?,
//!     CampaignScope::AllProducts,
//! );
//!
//! let campaigns = [anniversary];
//! let phone = ProductId::from("phone");
//! let priced = price_product(&phone, Money::from_minor(31_990_000, VND), &campaigns, now);
//!
//! assert_eq!(priced.final_price(), Money::from_minor(25_592_000, VND));
//! # Ok(())
//! # }
//! ```

pub mod campaigns;
pub mod cart;
pub mod catalog;
pub mod discounts;
pub mod fixtures;
pub mod listing;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod utils;
