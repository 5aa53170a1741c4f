//! Product Fixtures

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD, VND},
};
use serde::Deserialize;

use crate::{
    campaigns::records::RecordId, discounts::round_minor, fixtures::FixtureError,
    products::Product,
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Products, in catalog order
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product id
    pub id: RecordId,

    /// Product name
    pub name: String,

    /// Product price (e.g., "31990000 VND")
    pub price: String,
}

impl TryFrom<ProductFixture> for Product<'static> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(Product::new(
            fixture.id.to_string(),
            fixture.name,
            Money::from_minor(minor_units, currency),
        ))
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, if it is negative, or if
/// the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = match *currency_code {
        "VND" => VND,
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let minor_units = 10_i64
        .checked_pow(currency.exponent)
        .and_then(|scale| amount.checked_mul(Decimal::from(scale)))
        .and_then(|value| round_minor(value).ok())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99GBP");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_rejects_negative_amounts() {
        let result = parse_price("-1 VND");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_uses_currency_exponent() -> TestResult {
        let (dong, vnd) = parse_price("31990000 VND")?;
        let (pence, gbp) = parse_price("2.99 GBP")?;

        assert_eq!(dong, 31_990_000);
        assert_eq!(vnd, VND);
        assert_eq!(pence, 299);
        assert_eq!(gbp, GBP);

        Ok(())
    }

    #[test]
    fn parse_price_rounds_half_away_from_zero() -> TestResult {
        let (cents, _) = parse_price("0.125 USD")?;

        assert_eq!(cents, 13);

        Ok(())
    }

    #[test]
    fn product_fixture_converts() -> TestResult {
        let product = Product::try_from(ProductFixture {
            id: RecordId::Number(3),
            name: "Tablet".to_string(),
            price: "12500000 VND".to_string(),
        })?;

        assert_eq!(product.id.as_str(), "3");
        assert_eq!(product.price, Money::from_minor(12_500_000, VND));

        Ok(())
    }
}
