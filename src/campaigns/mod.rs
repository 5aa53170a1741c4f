//! Campaigns
//!
//! A campaign (a.k.a. promotion) is a time-bounded discount with a scope.
//! Campaigns arrive as loosely typed [`records::CampaignRecord`]s and are
//! validated into [`Campaign`] before the engine ever sees them.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    discounts::{Discount, DiscountError},
    products::ProductId,
};

pub mod records;
pub mod scope;

pub use records::{CampaignRecord, campaigns_from_json, campaigns_from_records};
pub use scope::{CampaignScope, ScopeType};

/// Reasons a campaign record cannot become a [`Campaign`].
#[derive(Debug, Error, PartialEq)]
pub enum CampaignError {
    /// A required field is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// The promotion code is not made of `A-Z` and `0-9`.
    #[error("invalid promotion code {0:?}")]
    InvalidCode(String),

    /// A date could not be parsed.
    #[error("invalid date {0:?}")]
    InvalidDate(String),

    /// The window ends before it starts.
    #[error("campaign ends ({end}) before it starts ({start})")]
    InvertedWindow {
        /// Window start
        start: Timestamp,
        /// Window end
        end: Timestamp,
    },

    /// The discount amount is negative, not finite, or too large for the currency.
    #[error("invalid discount amount {0}")]
    InvalidAmount(f64),

    /// The discount is not valid for its proportion type.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Opaque campaign identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(String);

impl CampaignId {
    /// Create a campaign id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CampaignId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Promotional code a customer can type in, e.g. `SUMMER20`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PromotionCode(String);

impl PromotionCode {
    /// Validate a promotion code. Codes are non-empty and only contain `A-Z` and `0-9`.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignError::InvalidCode`] for anything else.
    pub fn parse(code: &str) -> Result<Self, CampaignError> {
        let valid = !code.is_empty()
            && code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());

        if valid {
            Ok(Self(code.to_string()))
        } else {
            Err(CampaignError::InvalidCode(code.to_string()))
        }
    }

    /// Borrow the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromotionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inclusive validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    start: Timestamp,
    end: Timestamp,
}

impl ValidityWindow {
    /// Create a window running from `start` to `end`, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignError::InvertedWindow`] if `end` is before `start`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, CampaignError> {
        if start > end {
            return Err(CampaignError::InvertedWindow { start, end });
        }

        Ok(Self { start, end })
    }

    /// Window start
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Window end
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Whether `at` falls within the window, endpoints included.
    pub fn contains(&self, at: Timestamp) -> bool {
        self.start <= at && at <= self.end
    }
}

/// A validated campaign.
#[derive(Debug, Clone)]
pub struct Campaign<'a> {
    id: CampaignId,
    name: String,
    code: PromotionCode,
    window: ValidityWindow,
    discount: Discount<'a>,
    scope: CampaignScope<'a>,
}

impl<'a> Campaign<'a> {
    /// Create a new campaign.
    pub fn new(
        id: CampaignId,
        name: impl Into<String>,
        code: PromotionCode,
        window: ValidityWindow,
        discount: Discount<'a>,
        scope: CampaignScope<'a>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            code,
            window,
            discount,
            scope,
        }
    }

    /// Return the campaign id
    pub fn id(&self) -> &CampaignId {
        &self.id
    }

    /// Return the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the promotion code
    pub fn code(&self) -> &PromotionCode {
        &self.code
    }

    /// Return the validity window
    pub fn window(&self) -> &ValidityWindow {
        &self.window
    }

    /// Return the discount
    pub fn discount(&self) -> &Discount<'a> {
        &self.discount
    }

    /// Return the scope
    pub fn scope(&self) -> &CampaignScope<'a> {
        &self.scope
    }

    /// Return the scope category
    pub fn scope_type(&self) -> ScopeType {
        self.scope.scope_type()
    }

    /// Whether the campaign is running at `at`.
    pub fn is_active(&self, at: Timestamp) -> bool {
        self.window.contains(at)
    }

    /// Whether the campaign can discount `product_id` at `at`.
    pub fn applies_to_product(&self, product_id: &ProductId, at: Timestamp) -> bool {
        self.is_active(at) && self.scope.covers_product(product_id)
    }
}
