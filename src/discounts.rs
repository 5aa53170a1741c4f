//! Discounts
//!
//! The two ways a campaign can take money off a price, and the arithmetic
//! shared by the selector and the price calculator.

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Percentages are whole-number percents between 0 and 100.
    #[error("percentage {0} is outside 0-100")]
    PercentOutOfRange(Decimal),

    /// Absolute discounts cannot add money to a price.
    #[error("discount amount {0} is negative")]
    NegativeAmount(i64),

    /// The discount amount and the price use different currencies (discount, price).
    #[error("discount in {0} cannot apply to a price in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Minor unit arithmetic overflowed.
    #[error("discount arithmetic overflowed")]
    Overflow,
}

/// How much a campaign takes off a price.
#[derive(Debug, Copy, Clone)]
pub enum Discount<'a> {
    /// Take a percentage off the price (e.g., "20% off")
    Percentage(Percentage),

    /// Subtract a fixed amount from the price (e.g., "5,000,000 ₫ off")
    Absolute(Money<'a, Currency>),
}

impl<'a> Discount<'a> {
    /// Create a percentage discount from a whole-number percent (`20` is 20%).
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::PercentOutOfRange`] if `percent` is not within 0-100.
    pub fn percent_off(percent: Decimal) -> Result<Self, DiscountError> {
        if percent.is_sign_negative() || percent > Decimal::ONE_HUNDRED {
            return Err(DiscountError::PercentOutOfRange(percent));
        }

        Ok(Discount::Percentage(Percentage::from(
            percent / Decimal::ONE_HUNDRED,
        )))
    }

    /// Create an absolute discount.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::NegativeAmount`] if `amount` is below zero.
    pub fn amount_off(amount: Money<'a, Currency>) -> Result<Self, DiscountError> {
        let minor = amount.to_minor_units();

        if minor < 0 {
            return Err(DiscountError::NegativeAmount(minor));
        }

        Ok(Discount::Absolute(amount))
    }

    /// The unrounded amount this discount would take off `price`, in minor units.
    ///
    /// Candidates are compared on this value so that rounding to the minor
    /// unit never turns a real difference into a tie.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if:
    /// - the percentage share overflows (`PercentConversion`).
    /// - an absolute amount is in another currency (`CurrencyMismatch`).
    pub fn exact_discount(&self, price: &Money<'a, Currency>) -> Result<Decimal, DiscountError> {
        match self {
            Discount::Percentage(percent) => percent_share(percent, price.to_minor_units()),
            Discount::Absolute(amount) => {
                ensure_same_currency(amount, price)?;

                Ok(Decimal::from(amount.to_minor_units()))
            }
        }
    }

    /// The money this discount would take off `price`, before clamping.
    ///
    /// A percentage share is rounded to the minor unit. An absolute discount
    /// larger than the price is returned as-is; the clamp happens in
    /// [`Discount::apply_to`].
    ///
    /// # Errors
    ///
    /// See [`Discount::exact_discount`].
    pub fn monetary_discount(
        &self,
        price: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        let minor = round_minor(self.exact_discount(price)?)?;

        Ok(Money::from_minor(minor, price.currency()))
    }

    /// Apply this discount to `price`, never going below zero.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the discount cannot be evaluated
    /// against `price` (see [`Discount::monetary_discount`]).
    pub fn apply_to(
        &self,
        price: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        let discount = self.monetary_discount(price)?;

        let discounted_minor = price
            .to_minor_units()
            .checked_sub(discount.to_minor_units())
            .ok_or(DiscountError::Overflow)?;

        Ok(Money::from_minor(0.max(discounted_minor), price.currency()))
    }
}

impl fmt::Display for Discount<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discount::Percentage(percent) => {
                let whole = ((*percent) * Decimal::ONE_HUNDRED).normalize();

                write!(f, "{whole}% off")
            }
            Discount::Absolute(amount) => write!(f, "{amount} off"),
        }
    }
}

fn ensure_same_currency(
    amount: &Money<'_, Currency>,
    price: &Money<'_, Currency>,
) -> Result<(), DiscountError> {
    if amount.currency() == price.currency() {
        Ok(())
    } else {
        Err(DiscountError::CurrencyMismatch(
            amount.currency().iso_alpha_code,
            price.currency().iso_alpha_code,
        ))
    }
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// Rounds to the nearest minor unit, midpoint away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the result overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    round_minor(percent_share(percent, minor)?)
}

/// Round a decimal amount of minor units the way every price in the crate is rounded.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the value does not fit in an `i64`.
pub fn round_minor(value: Decimal) -> Result<i64, DiscountError> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

fn percent_share(percent: &Percentage, minor: i64) -> Result<Decimal, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)
}
