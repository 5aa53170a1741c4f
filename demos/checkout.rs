//! Checkout Example
//!
//! Prices the fixture cart, then treats every campaign in the fixture set as
//! selected by the customer and filters them down to the promotion ids that
//! would be submitted with the order.
//!
//! Run with: `cargo run --example checkout -- --at 2024-06-15T12:00:00Z`

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use storefront_promotions::{
    listing::PriceListing,
    orders::{OrderSubmission, SelectedCampaign},
    utils::ExampleArgs,
};

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_err| "storefront_promotions=debug".into()),
        )
        .init();

    let args = ExampleArgs::parse();
    let now = args.now();

    let fixture = args.load_fixture()?;
    let catalog = fixture.catalog()?;
    let cart = fixture.cart()?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let priced = catalog.price_cart(&cart, now)?;

    PriceListing::from_cart(&catalog, &priced).write_to(&mut handle)?;

    let selected: Vec<SelectedCampaign<'_, '_>> = catalog
        .campaigns()
        .iter()
        .map(SelectedCampaign::new)
        .collect();

    let submission = OrderSubmission::prepare(&catalog, &cart, &selected, now)?;

    println!("Selected: {}", selected.len());

    if submission.promotion_ids.is_empty() {
        println!("Submitted promotions: none");
    } else {
        let ids: Vec<String> = submission
            .promotion_ids
            .iter()
            .map(ToString::to_string)
            .collect();

        println!("Submitted promotions: {}", ids.join(", "));
    }

    println!("Order total: {}", submission.total);

    Ok(())
}
