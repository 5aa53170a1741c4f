//! Utils

use std::path::PathBuf;

use clap::Parser;
use jiff::Timestamp;

use crate::fixtures::{Fixture, FixtureError};

/// Arguments for the storefront demos
#[derive(Debug, Parser)]
pub struct ExampleArgs {
    /// Fixture set to use for the products, campaigns & cart
    #[clap(short, long, default_value = "storefront")]
    pub fixture: String,

    /// Directory holding the fixture sets
    #[clap(long, env = "STOREFRONT_FIXTURES", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Instant to price at, e.g. `2024-06-15T12:00:00Z` (defaults to now)
    #[clap(short, long)]
    pub at: Option<Timestamp>,
}

impl ExampleArgs {
    /// The evaluation instant: `--at` if given, otherwise the current time.
    pub fn now(&self) -> Timestamp {
        self.at.unwrap_or_else(Timestamp::now)
    }

    /// Load the selected fixture set.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_fixture(&self) -> Result<Fixture, FixtureError> {
        Fixture::from_set_in(&self.fixtures_dir, &self.fixture)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_use_storefront_fixture() -> TestResult {
        let args = ExampleArgs::try_parse_from(["demo"])?;

        assert_eq!(args.fixture, "storefront");
        assert!(args.at.is_none());

        Ok(())
    }

    #[test]
    fn at_overrides_the_clock() -> TestResult {
        let args = ExampleArgs::try_parse_from(["demo", "--at", "2024-06-15T12:00:00Z"])?;

        assert_eq!(args.now(), "2024-06-15T12:00:00Z".parse::<Timestamp>()?);

        Ok(())
    }
}
