//! Pipeline URL example.
//!
//! Builds signed single-use and recurring pipeline URLs against the sandbox
//! pipeline endpoint. Nothing is sent over the network.
//!
//! # Running this example
//!
//! ```bash
//! export REMIT_ACCESS_KEY=AKIAEXAMPLE
//! export REMIT_SECRET_KEY=<secret>
//! cargo run --example pipeline_url
//! ```

#![allow(
    clippy::print_stdout,
    clippy::uninlined_format_args,
    reason = "examples are allowed to use println and simple formatting"
)]

use std::env;

use chrono::{Duration, Utc};
use remit::{
    config::SANDBOX_PIPELINE_ENDPOINT,
    pipeline::PipelineBuilder,
    shapes::{PipelineCommon, RecurringUsePipeline, SingleUsePipeline},
    signer::Credentials,
};
use rust_decimal::Decimal;

/// Loads credentials from the environment.
///
/// # Security Warning
///
/// Never hardcode secret keys. Always load from secure storage.
fn load_credentials() -> Result<Credentials, Box<dyn std::error::Error>> {
    let access_key = env::var("REMIT_ACCESS_KEY").map_err(|_| "REMIT_ACCESS_KEY is not set")?;
    let secret_key = env::var("REMIT_SECRET_KEY").map_err(|_| "REMIT_SECRET_KEY is not set")?;
    Ok(Credentials::new(access_key, secret_key)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("remit: Pipeline URL Example\n");

    println!("1. Loading credentials from environment...");
    let builder = PipelineBuilder::new(SANDBOX_PIPELINE_ENDPOINT, load_credentials()?)?;
    println!("   Endpoint: {}\n", builder.endpoint());

    println!("2. Single-use pipeline for 10.50...");
    let single_use = SingleUsePipeline {
        common: PipelineCommon::returning_to("https://shop.example.com/return"),
        caller_reference: Some("order-17".to_owned()),
        payment_reason: Some("Order #17".to_owned()),
        transaction_amount: Some(Decimal::new(1050, 2)),
        ..SingleUsePipeline::default()
    };
    println!("   {}\n", builder.url(&single_use)?);

    println!("3. Recurring pipeline, monthly for a year...");
    let start = Utc::now();
    let recurring = RecurringUsePipeline {
        common: PipelineCommon::returning_to("https://shop.example.com/return"),
        caller_reference: Some("subscription-4".to_owned()),
        transaction_amount: Some(Decimal::new(499, 2)),
        validity_start: Some(start),
        validity_expiry: Some(start + Duration::days(365)),
        recurring_period: Some("1 Month".to_owned()),
        ..RecurringUsePipeline::default()
    };
    println!("   {}\n", builder.url(&recurring)?);

    println!("Redirect the buyer to one of these URLs to start the hosted flow.");
    Ok(())
}
