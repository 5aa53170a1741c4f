//! Catalog
//!
//! Products and campaigns for one currency, passed by reference to whatever
//! needs prices. Builders consume the catalog and hand back a new one.

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    campaigns::Campaign,
    cart::{Cart, CartError, CartItem, line_total},
    pricing::{PricedProduct, price_product},
    products::{Product, ProductId, ProductKey},
};

/// Errors that can occur while building or querying a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A product with this id is already in the catalog.
    #[error("duplicate product {0}")]
    DuplicateProduct(ProductId),

    /// A product's currency differs from the catalog currency (product, product currency, catalog currency).
    #[error("product {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),

    /// Cart arithmetic failed.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Catalog
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    currency: &'static Currency,
    products: SlotMap<ProductKey, Product<'a>>,
    product_keys: FxHashMap<ProductId, ProductKey>,
    campaigns: Vec<Campaign<'a>>,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            currency,
            products: SlotMap::with_key(),
            product_keys: FxHashMap::default(),
            campaigns: Vec::new(),
        }
    }

    /// Return a catalog with `product` added.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::DuplicateProduct`]: the id is already taken.
    /// - [`CatalogError::CurrencyMismatch`]: the product is priced in another currency.
    pub fn with_product(mut self, product: Product<'a>) -> Result<Self, CatalogError> {
        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                product.id,
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if self.product_keys.contains_key(&product.id) {
            return Err(CatalogError::DuplicateProduct(product.id));
        }

        let id = product.id.clone();
        let key = self.products.insert(product);

        self.product_keys.insert(id, key);

        Ok(self)
    }

    /// Return a catalog with `campaign` appended to the campaign list.
    #[must_use]
    pub fn with_campaign(mut self, campaign: Campaign<'a>) -> Self {
        self.campaigns.push(campaign);

        self
    }

    /// Return a catalog with `campaigns` appended, in order.
    #[must_use]
    pub fn with_campaigns(mut self, campaigns: impl IntoIterator<Item = Campaign<'a>>) -> Self {
        self.campaigns.extend(campaigns);

        self
    }

    /// Currency of every price in the catalog
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Look up a product by id.
    pub fn product(&self, id: &ProductId) -> Option<&Product<'a>> {
        let key = self.product_keys.get(id)?;

        self.products.get(*key)
    }

    /// Products in the order they were added.
    pub fn products(&self) -> impl Iterator<Item = &Product<'a>> {
        self.products.values()
    }

    /// All campaigns, in the order they were added.
    pub fn campaigns(&self) -> &[Campaign<'a>] {
        &self.campaigns
    }

    /// Campaigns running at `now`.
    pub fn active_campaigns(&self, now: Timestamp) -> impl Iterator<Item = &Campaign<'a>> {
        self.campaigns
            .iter()
            .filter(move |campaign| campaign.is_active(now))
    }

    /// Price one product at `now`, or `None` if it is not in the catalog.
    pub fn price(&self, id: &ProductId, now: Timestamp) -> Option<PricedProduct<'a, '_>> {
        self.product(id)
            .map(|product| price_product(&product.id, product.price, &self.campaigns, now))
    }

    /// Price every product at `now`, in catalog order.
    pub fn price_all(&self, now: Timestamp) -> Vec<(&Product<'a>, PricedProduct<'a, '_>)> {
        self.products()
            .map(|product| {
                (
                    product,
                    price_product(&product.id, product.price, &self.campaigns, now),
                )
            })
            .collect()
    }

    /// Price each cart line at its unit price and total the order.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if a line or order total overflows.
    pub fn price_cart<'c>(
        &'c self,
        cart: &'c Cart<'a>,
        now: Timestamp,
    ) -> Result<PricedCart<'a, 'c>, CatalogError> {
        let mut total = Money::from_minor(0, cart.currency());
        let mut lines = Vec::with_capacity(cart.len());

        for item in cart.items() {
            let priced = price_product(&item.product_id, item.unit_price, &self.campaigns, now);
            let line_total = line_total(&item.product_id, priced.final_price(), item.quantity)?;

            total = total.add(line_total).map_err(CartError::from)?;

            lines.push(PricedLine {
                item,
                priced,
                line_total,
            });
        }

        Ok(PricedCart {
            lines,
            subtotal: cart.subtotal()?,
            total,
        })
    }
}

/// A cart line with its promotion resolved.
#[derive(Debug, Clone)]
pub struct PricedLine<'a, 'c> {
    /// The cart line
    pub item: &'c CartItem<'a>,

    /// Unit price outcome
    pub priced: PricedProduct<'a, 'c>,

    /// Discounted unit price times quantity
    pub line_total: Money<'a, Currency>,
}

/// A cart with every line priced.
#[derive(Debug, Clone)]
pub struct PricedCart<'a, 'c> {
    lines: Vec<PricedLine<'a, 'c>>,
    subtotal: Money<'a, Currency>,
    total: Money<'a, Currency>,
}

impl<'a, 'c> PricedCart<'a, 'c> {
    /// Priced lines, in cart order
    pub fn lines(&self) -> &[PricedLine<'a, 'c>] {
        &self.lines
    }

    /// Total at catalog prices
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Total after per-product promotions
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::{USD, VND};
    use testresult::TestResult;

    use crate::{
        campaigns::{CampaignId, CampaignScope, PromotionCode, ValidityWindow},
        discounts::Discount,
    };

    use super::*;

    fn now() -> TestResult<Timestamp> {
        Ok("2024-06-15T12:00:00Z".parse()?)
    }

    fn catalog() -> TestResult<Catalog<'static>> {
        let window = ValidityWindow::new(
            "2024-06-01T00:00:00Z".parse()?,
            "2024-06-30T23:59:59Z".parse()?,
        )?;

        let summer = Campaign::new(
            CampaignId::from("summer"),
            "Summer sale",
            PromotionCode::parse("SUMMER10")?,
            window,
            Discount::percent_off(Decimal::from(10))?,
            CampaignScope::SpecificProducts(std::iter::once(ProductId::from("phone")).collect()),
        );

        Ok(Catalog::new(VND)
            .with_product(Product::new(
                "phone",
                "Phone",
                Money::from_minor(20_000_000, VND),
            ))?
            .with_product(Product::new("case", "Case", Money::from_minor(500_000, VND)))?
            .with_campaign(summer))
    }

    #[test]
    fn duplicate_products_are_rejected() -> TestResult {
        let result = catalog()?.with_product(Product::new(
            "phone",
            "Phone again",
            Money::from_minor(1, VND),
        ));

        assert!(
            matches!(result, Err(CatalogError::DuplicateProduct(id)) if id.as_str() == "phone")
        );

        Ok(())
    }

    #[test]
    fn products_in_other_currencies_are_rejected() -> TestResult {
        let result =
            catalog()?.with_product(Product::new("usd", "Import", Money::from_minor(1, USD)));

        assert!(matches!(
            result,
            Err(CatalogError::CurrencyMismatch(_, "USD", "VND"))
        ));

        Ok(())
    }

    #[test]
    fn price_uses_catalog_campaigns() -> TestResult {
        let catalog = catalog()?;

        let phone = catalog.price(&ProductId::from("phone"), now()?);
        let case = catalog.price(&ProductId::from("case"), now()?);

        assert_eq!(
            phone.map(|priced| priced.final_price()),
            Some(Money::from_minor(18_000_000, VND))
        );
        assert!(case.is_some_and(|priced| !priced.has_active_promotion()));
        assert!(catalog.price(&ProductId::from("missing"), now()?).is_none());

        Ok(())
    }

    #[test]
    fn price_all_keeps_catalog_order() -> TestResult {
        let catalog = catalog()?;

        let names: Vec<&str> = catalog
            .price_all(now()?)
            .iter()
            .map(|(product, _)| product.name.as_str())
            .collect();

        assert_eq!(names, ["Phone", "Case"]);

        Ok(())
    }

    #[test]
    fn active_campaigns_respect_window() -> TestResult {
        let catalog = catalog()?;

        assert_eq!(catalog.active_campaigns(now()?).count(), 1);
        assert_eq!(
            catalog
                .active_campaigns("2024-07-01T00:00:00Z".parse()?)
                .count(),
            0
        );

        Ok(())
    }

    #[test]
    fn price_cart_totals_discounted_lines() -> TestResult {
        let catalog = catalog()?;

        let cart = Cart::with_items(
            [
                CartItem::new("phone", Money::from_minor(20_000_000, VND), 2),
                CartItem::new("case", Money::from_minor(500_000, VND), 1),
            ],
            VND,
        )?;

        let priced = catalog.price_cart(&cart, now()?)?;

        assert_eq!(priced.subtotal(), Money::from_minor(40_500_000, VND));
        assert_eq!(priced.total(), Money::from_minor(36_500_000, VND));
        assert_eq!(priced.lines().len(), 2);
        assert!(
            priced
                .lines()
                .first()
                .is_some_and(|line| line.priced.has_active_promotion())
        );

        Ok(())
    }
}
