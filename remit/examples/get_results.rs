//! `GetResults` example.
//!
//! Loads a client configuration, performs one signed `GetResults` call over
//! HTTPS and prints the decoded transaction results.
//!
//! # Running this example
//!
//! ```bash
//! cat > remit.toml <<'TOML'
//! access_key = "AKIAEXAMPLE"
//! secret_key_env = "REMIT_SECRET_KEY"
//! sandbox = true
//! TOML
//! export REMIT_SECRET_KEY=<secret>
//! cargo run --example get_results -- remit.toml
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::uninlined_format_args,
    reason = "examples are allowed to use println and simple formatting"
)]

use std::env;

use remit::{Remit, RemitError, config::RemitConfig, shapes::GetResultsRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("remit: GetResults Example\n");

    let path = env::args().nth(1).unwrap_or_else(|| "remit.toml".to_owned());
    println!("1. Loading configuration from {}...", path);
    let config = RemitConfig::from_file(&path)?;
    println!("   {:?}\n", config);

    let client = Remit::from_config(&config)?;
    println!("2. Calling GetResults at {}...", client.api().endpoint());

    let request = GetResultsRequest { operation: Some("Pay".to_owned()), max_results_count: Some(10) };
    match client.get_results(&request).await {
        Ok(response) => {
            println!("   Pending: {:?}", response.number_pending);
            for (n, result) in response.transaction_results.iter().enumerate() {
                println!(
                    "   {}. {} {} {}",
                    n + 1,
                    result.transaction_id.as_deref().unwrap_or("-"),
                    result.operation_type.as_deref().unwrap_or("-"),
                    result.transaction_status.as_deref().unwrap_or("-"),
                );
            }
        }
        Err(RemitError::TransportError(msg)) => {
            eprintln!("   Service rejected the call: {}", msg);
            eprintln!("   Check the access key, secret and endpoint.");
        }
        Err(RemitError::HttpError(e)) => {
            eprintln!("   Network failure: {}", e);
            eprintln!("   The call may be retried.");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
