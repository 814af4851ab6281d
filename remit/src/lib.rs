//! Remit: signed pipeline URLs and API calls for a hosted payment service
//!
//! A Rust library that assembles named request parameters into either a signed
//! redirect URL that hands a buyer to a hosted payment page (a *pipeline*), or
//! a signed server-to-server API call whose JSON response is decoded into
//! typed structs.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   typed struct   ┌──────────────────┐
//! │  shapes          │─────────────────▶│  coerce::Record  │  validated against
//! │  (pipelines,     │                  │                  │  schema::Schema
//! │   GetResults)    │                  └────────┬─────────┘
//! └──────────────────┘                           │ Parameters (wire keys)
//!                                                ▼
//! ┌──────────────────┐                  ┌──────────────────┐
//! │  pipeline        │◀─────────────────│  signer          │  HMAC over the
//! │  api             │   signed query   │  (QuerySigner)   │  canonical string
//! └────────┬─────────┘                  └──────────────────┘
//!          │ SignedCall
//!          ▼
//! ┌──────────────────┐   JSON body      ┌──────────────────┐
//! │  transport       │─────────────────▶│  coerce::Payload │──▶ typed response
//! │  (HttpTransport) │                  │  Record::decode  │
//! └──────────────────┘                  └──────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## 1. Build a Pipeline URL
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use remit::{
//!     pipeline::PipelineBuilder,
//!     shapes::{PipelineCommon, SingleUsePipeline},
//!     signer::Credentials,
//! };
//!
//! # fn example() -> remit::Result<()> {
//! let builder = PipelineBuilder::new(
//!     "https://authorize.payments-sandbox.amazon.com/cobranded-ui/actions/start",
//!     Credentials::new("AKIAEXAMPLE", "secret")?,
//! )?;
//!
//! let url = builder.url(&SingleUsePipeline {
//!     common: PipelineCommon::returning_to("https://shop.example.com/return"),
//!     caller_reference: Some("order-17".to_owned()),
//!     transaction_amount: Some(Decimal::new(1050, 2)),
//!     ..SingleUsePipeline::default()
//! })?;
//!
//! assert!(url.contains("&transactionAmount=10.50&"));
//! assert!(url.contains("&SignatureVersion=2&Signature="));
//! # Ok(())
//! # }
//! ```
//!
//! ## 2. Call the API
//!
//! ```rust,no_run
//! use remit::{Remit, config::RemitConfig, shapes::GetResultsRequest};
//!
//! # async fn example() -> remit::Result<()> {
//! let config = RemitConfig::from_file("remit.toml")?;
//! let client = Remit::from_config(&config)?;
//!
//! let results = client
//!     .get_results(&GetResultsRequest { operation: Some("Pay".to_owned()), max_results_count: Some(10) })
//!     .await?;
//! for result in &results.transaction_results {
//!     println!("{:?}: {:?}", result.transaction_id, result.transaction_status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## 3. Sign Parameters Directly
//!
//! ```rust
//! use remit::{Parameters, signer};
//!
//! # fn example() -> remit::Result<()> {
//! let params: Parameters = [("Action", "GetResults")].into_iter().collect();
//! let signature = signer::sign("fps.sandbox.amazonaws.com", "/", "secret", &params)?;
//! assert_eq!(signature.len(), 44);
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`schema`]: shapes, field declarations and the wire-key transform
//! - [`coerce`]: typed values, records and response payloads
//! - [`signer`]: canonical string and HMAC signature
//! - [`shapes`]: standard shape catalog and typed structs
//! - [`pipeline`]: signed pipeline URLs
//! - [`api`]: signed API calls and response decoding
//! - [`transport`]: transport trait and reqwest implementation
//! - [`config`]: TOML client configuration
//!
//! # Security Considerations
//!
//! - Secret keys are held in zeroize-on-drop buffers and never appear in
//!   `Debug` output or tracing spans.
//! - Endpoints must be HTTPS and may not point at loopback hosts.
//! - Nothing in the library retries; failed calls are returned to the caller.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod api;
pub mod client;
pub mod coerce;
pub mod config;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod schema;
pub mod shapes;
pub mod signer;
pub mod transport;

pub use client::Remit;
pub use error::{RemitError, Result};
pub use params::Parameters;
