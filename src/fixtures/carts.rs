//! Cart Fixtures

use serde::Deserialize;

use crate::campaigns::records::RecordId;

/// Wrapper for a cart in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines, in the order they were added
    pub items: Vec<CartLineFixture>,
}

/// One line of a cart fixture
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Id of a product from the products fixture
    pub product: RecordId,

    /// Number of units
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn quantity_defaults_to_one() -> TestResult {
        let fixture: CartFixture =
            serde_norway::from_str("items:\n  - product: 1\n  - product: case\n    quantity: 3\n")?;

        let lines: Vec<(String, u32)> = fixture
            .items
            .iter()
            .map(|line| (line.product.to_string(), line.quantity))
            .collect();

        assert_eq!(lines, [("1".to_string(), 1), ("case".to_string(), 3)]);

        Ok(())
    }
}
