//! Fixtures

use std::{
    fs,
    path::{Path, PathBuf},
};

use rusty_money::iso::Currency;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::{
    campaigns::Campaign,
    cart::{Cart, CartError, CartItem},
    catalog::{Catalog, CatalogError},
    fixtures::{campaigns::CampaignsFixture, carts::CartFixture, products::ProductsFixture},
    products::Product,
};

pub mod campaigns;
pub mod carts;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Catalog creation error
    #[error("Failed to create catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
///
/// Products have to be loaded first: they fix the currency that campaign
/// amounts and cart prices are read in.
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    products: Vec<Product<'static>>,
    campaigns: Vec<Campaign<'static>>,
    cart_items: Vec<CartItem<'static>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: Vec::new(),
            campaigns: Vec::new(),
            cart_items: Vec::new(),
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = self.read("products", name)?;

        for product_fixture in fixture.products {
            let product = Product::try_from(product_fixture)?;
            let currency = product.price.currency();

            match self.currency {
                Some(existing) if existing != currency => {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => self.currency = Some(currency),
            }

            self.products.push(product);
        }

        Ok(self)
    }

    /// Load campaigns from a YAML fixture file
    ///
    /// Malformed campaign records are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if no products are loaded yet.
    pub fn load_campaigns(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let currency = self.currency()?;
        let fixture: CampaignsFixture = self.read("campaigns", name)?;
        let declared = fixture.campaigns.len();

        let campaigns = fixture.into_campaigns(currency);

        debug!(
            fixture = name,
            declared,
            loaded = campaigns.len(),
            "loaded campaign fixture"
        );

        self.campaigns.extend(campaigns);

        Ok(self)
    }

    /// Load a cart from a YAML fixture file, pricing each line from the loaded products
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if referenced products don't exist.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartFixture = self.read("carts", name)?;

        for line in fixture.items {
            let product_id = line.product.to_string();
            let product = self.product(&product_id)?;
            let item = CartItem::new(product.id.clone(), product.price, line.quantity);

            self.cart_items.push(item);
        }

        Ok(self)
    }

    /// Load a complete fixture set (products, campaigns, and cart with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a complete fixture set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture
            .load_products(name)?
            .load_campaigns(name)?
            .load_cart(name)?;

        Ok(fixture)
    }

    /// Get a product by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, id: &str) -> Result<&Product<'static>, FixtureError> {
        self.products
            .iter()
            .find(|product| product.id.as_str() == id)
            .ok_or_else(|| FixtureError::ProductNotFound(id.to_string()))
    }

    /// Get all products, in fixture order
    pub fn products(&self) -> &[Product<'static>] {
        &self.products
    }

    /// Get all campaigns that survived validation, in fixture order
    pub fn campaigns(&self) -> &[Campaign<'static>] {
        &self.campaigns
    }

    /// Build a catalog from the loaded products and campaigns
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded or if a product id is repeated.
    pub fn catalog(&self) -> Result<Catalog<'static>, FixtureError> {
        let catalog = self
            .products
            .iter()
            .cloned()
            .try_fold(Catalog::new(self.currency()?), Catalog::with_product)?;

        Ok(catalog.with_campaigns(self.campaigns.iter().cloned()))
    }

    /// Build a cart from the loaded cart lines
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded or if cart creation fails.
    pub fn cart(&self) -> Result<Cart<'static>, FixtureError> {
        let cart = self
            .cart_items
            .iter()
            .cloned()
            .try_fold(Cart::new(self.currency()?), Cart::with_item)?;

        Ok(cart)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Base path fixture files are read from
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn read<T: DeserializeOwned>(&self, category: &str, name: &str) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
