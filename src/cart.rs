//! Cart

use rustc_hash::FxHashSet;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::products::ProductId;

/// Errors related to cart construction or totals.
#[derive(Debug, Error)]
pub enum CartError {
    /// An item's currency differs from the cart currency (index, item currency, cart currency).
    #[error("Item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line total does not fit in minor units.
    #[error("line total for {0} overflowed")]
    Overflow(ProductId),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// One line of a cart: a product at a unit price, some number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem<'a> {
    /// Product in this line
    pub product_id: ProductId,

    /// Catalog price of one unit
    pub unit_price: Money<'a, Currency>,

    /// Number of units
    pub quantity: u32,
}

impl<'a> CartItem<'a> {
    /// Create a new cart line.
    pub fn new(
        product_id: impl Into<ProductId>,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            unit_price,
            quantity,
        }
    }

    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the total does not fit in minor units.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, CartError> {
        line_total(&self.product_id, self.unit_price, self.quantity)
    }
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    items: Vec<CartItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given items.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if there was a currency mismatch error.
    pub fn with_items(
        items: impl Into<Vec<CartItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let items = items.into();

        items.iter().enumerate().try_for_each(|(i, item)| {
            let item_currency = item.unit_price.currency();
            if item_currency == currency {
                Ok(())
            } else {
                Err(CartError::CurrencyMismatch(
                    i,
                    item_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        Ok(Cart { items, currency })
    }

    /// Return a cart with `item` added.
    ///
    /// Adding a product that is already in the cart increases that line's
    /// quantity; the unit price of the existing line is kept.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the item is priced in another currency.
    pub fn with_item(mut self, item: CartItem<'a>) -> Result<Self, CartError> {
        let item_currency = item.unit_price.currency();

        if item_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                self.items.len(),
                item_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        match self
            .items
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }

        Ok(self)
    }

    /// Calculate the subtotal of the cart at catalog prices.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a line total overflows.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        let zero = Money::from_minor(0, self.currency);

        self.items
            .iter()
            .try_fold(zero, |acc, item| Ok(acc.add(item.line_total()?)?))
    }

    /// Distinct product ids in the cart.
    pub fn product_ids(&self) -> FxHashSet<&ProductId> {
        self.items.iter().map(|item| &item.product_id).collect()
    }

    /// The cart lines.
    pub fn items(&self) -> &[CartItem<'a>] {
        &self.items
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Price times quantity, checked.
pub(crate) fn line_total<'a>(
    product_id: &ProductId,
    price: Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, CartError> {
    let minor = price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or_else(|| CartError::Overflow(product_id.clone()))?;

    Ok(Money::from_minor(minor, price.currency()))
}
