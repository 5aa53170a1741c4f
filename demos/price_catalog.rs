//! Price Catalog Example
//!
//! Prices every product in a fixture set against its campaigns and prints
//! the listing a product page would show: base price, final price, savings
//! and the winning campaign.
//!
//! Run with: `cargo run --example price_catalog -- --at 2024-06-15T12:00:00Z`

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use storefront_promotions::{listing::PriceListing, utils::ExampleArgs};

/// Price Catalog Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_err| "storefront_promotions=info".into()),
        )
        .init();

    let args = ExampleArgs::parse();
    let now = args.now();

    let fixture = args.load_fixture()?;
    let catalog = fixture.catalog()?;

    println!(
        "{} products, {} of {} campaigns active at {now}",
        catalog.products().count(),
        catalog.active_campaigns(now).count(),
        catalog.campaigns().len(),
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    PriceListing::from_catalog(&catalog, now).write_to(&mut handle)?;

    Ok(())
}
