//! Price Listing
//!
//! Terminal tables for catalogs and carts. Used by the demos; storefront
//! pages do their own locale formatting.

use std::{fmt::Write, io};

use jiff::Timestamp;
use rusty_money::{Money, MoneyError, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    catalog::{Catalog, PricedCart},
    pricing::PricedProduct,
};

/// Errors that can occur when writing a listing.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One row of a listing.
#[derive(Debug, Clone)]
pub struct ListingRow<'a> {
    /// Product name, or id when the product is not in the catalog
    pub label: String,

    /// Units, for cart listings
    pub quantity: Option<u32>,

    /// Price before promotions
    pub base_price: Money<'a, Currency>,

    /// Price after the winning promotion
    pub final_price: Money<'a, Currency>,

    /// Winning campaign name and code
    pub promotion: Option<String>,
}

impl<'a> ListingRow<'a> {
    fn priced(label: String, quantity: Option<u32>, priced: &PricedProduct<'a, '_>) -> Self {
        Self {
            label,
            quantity,
            base_price: priced.original_price(),
            final_price: priced.final_price(),
            promotion: priced
                .applied_campaign()
                .map(|campaign| format!("{} [{}]", campaign.name(), campaign.code())),
        }
    }

    /// Base price minus final price.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the prices are in different currencies.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.base_price.sub(self.final_price)
    }
}

/// Priced rows ready to print.
#[derive(Debug, Clone)]
pub struct PriceListing<'a> {
    rows: Vec<ListingRow<'a>>,
    totals: Option<(Money<'a, Currency>, Money<'a, Currency>)>,
}

impl<'a> PriceListing<'a> {
    /// Every catalog product, priced at `now`.
    pub fn from_catalog(catalog: &Catalog<'a>, now: Timestamp) -> Self {
        let rows = catalog
            .price_all(now)
            .iter()
            .map(|(product, priced)| ListingRow::priced(product.name.clone(), None, priced))
            .collect();

        Self { rows, totals: None }
    }

    /// Each cart line with its unit prices, followed by the cart totals.
    pub fn from_cart(catalog: &Catalog<'a>, cart: &PricedCart<'a, '_>) -> Self {
        let rows = cart
            .lines()
            .iter()
            .map(|line| {
                let label = catalog
                    .product(&line.item.product_id)
                    .map_or_else(|| line.item.product_id.to_string(), |p| p.name.clone());

                ListingRow::priced(label, Some(line.item.quantity), &line.priced)
            })
            .collect();

        Self {
            rows,
            totals: Some((cart.subtotal(), cart.total())),
        }
    }

    /// The listing rows.
    pub fn rows(&self) -> &[ListingRow<'a>] {
        &self.rows
    }

    /// Writes the listing as a table.
    ///
    /// # Errors
    ///
    /// Returns an error if a savings amount cannot be computed or the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ListingError> {
        let with_quantity = self.totals.is_some();
        let mut builder = Builder::default();

        builder.push_record(header(with_quantity));

        for row in &self.rows {
            builder.push_record(cells(row, with_quantity)?);
        }

        let price_columns = if with_quantity { 2..5 } else { 1..4 };
        let final_column = price_columns.start + 1;

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(price_columns), Alignment::right());

        for (idx, row) in self.rows.iter().enumerate() {
            if row.promotion.is_some() {
                table.modify((idx + 1, final_column), Color::FG_GREEN);
            }
        }

        let table_str = dim_borders(&table.to_string());

        writeln!(out, "\n{table_str}").map_err(|_err| ListingError::IO)?;

        if let Some((subtotal, total)) = self.totals {
            let savings = subtotal.sub(total)?;

            writeln!(out, " Subtotal:  {subtotal}").map_err(|_err| ListingError::IO)?;
            writeln!(out, " \x1b[1mTotal:\x1b[0m     \x1b[1m{total}\x1b[0m")
                .map_err(|_err| ListingError::IO)?;
            writeln!(out, " Savings:   {savings}\n").map_err(|_err| ListingError::IO)?;
        }

        Ok(())
    }
}

fn header(with_quantity: bool) -> Vec<&'static str> {
    let mut header = vec!["Product"];

    if with_quantity {
        header.push("Qty");
    }

    header.extend(["Base Price", "Final Price", "Savings", "Promotion"]);

    header
}

fn cells(row: &ListingRow<'_>, with_quantity: bool) -> Result<Vec<String>, MoneyError> {
    let mut cells = vec![row.label.clone()];

    if with_quantity {
        cells.push(row.quantity.map(|q| q.to_string()).unwrap_or_default());
    }

    cells.push(format!("{}", row.base_price));

    if row.promotion.is_some() {
        cells.push(format!("{}", row.final_price));
        cells.push(format!("-{}", row.savings()?));
    } else {
        cells.extend([String::new(), String::new()]);
    }

    cells.push(row.promotion.clone().unwrap_or_default());

    Ok(cells)
}

const DIM: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

fn is_border(ch: char) -> bool {
    matches!(ch, '\u{2500}'..='\u{257F}')
}

/// Dims the table borders so prices stand out.
fn dim_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut rest = table;

    while let Some(start) = rest.find(is_border) {
        let (plain, tail) = rest.split_at(start);
        let end = tail.find(|ch: char| !is_border(ch)).unwrap_or(tail.len());
        let (border, after) = tail.split_at(end);

        out.push_str(plain);
        _ = write!(out, "{DIM}{border}{RESET}");

        rest = after;
    }

    out.push_str(rest);

    out
}
