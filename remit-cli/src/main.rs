//! remit: command-line front end for signed pipeline URLs and API calls.
//!
//! ```text
//! remit --config remit.toml single-use --return-url https://shop.example.com/return --amount 10.50
//! remit --config remit.toml results --operation Pay --max-results-count 10
//! ```
//!
//! Pipeline commands print the signed URL. `results` performs `GetResults`
//! and prints the decoded response as JSON.

mod observability;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use remit::{
    Remit,
    config::RemitConfig,
    shapes::{
        GetResultsRequest, PipelineCommon, PostpaidPipeline, RecurringUsePipeline,
        SingleUsePipeline, UsageLimit,
    },
};
use rust_decimal::Decimal;
use tracing::info;

use crate::observability::{LogFormat, init_observability};

/// Signed pipeline URLs and API calls for a hosted payment service
#[derive(Parser, Debug)]
#[command(name = "remit")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Client configuration file
    #[arg(short, long, default_value = "remit.toml", env = "REMIT_CONFIG")]
    config: PathBuf,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, env = "LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a signed single-use pipeline URL
    SingleUse {
        #[command(flatten)]
        common: CommonArgs,

        /// Amount to authorize
        #[arg(long)]
        amount: Option<Decimal>,

        /// Token of the receiving party
        #[arg(long)]
        recipient_token: Option<String>,
    },

    /// Print a signed recurring-use pipeline URL
    Recurring {
        #[command(flatten)]
        common: CommonArgs,

        /// Amount of each charge
        #[arg(long)]
        amount: Option<Decimal>,

        /// Token of the receiving party
        #[arg(long)]
        recipient_token: Option<String>,

        /// Start of the validity window (RFC 3339)
        #[arg(long)]
        validity_start: Option<DateTime<Utc>>,

        /// End of the validity window (RFC 3339)
        #[arg(long)]
        validity_expiry: Option<DateTime<Utc>>,

        /// Charge period, e.g. "1 Month"
        #[arg(long)]
        recurring_period: Option<String>,
    },

    /// Print a signed postpaid pipeline URL
    Postpaid {
        #[command(flatten)]
        common: CommonArgs,

        /// Caller reference for the settlement token
        #[arg(long)]
        caller_reference_settlement: Option<String>,

        /// Start of the validity window (RFC 3339)
        #[arg(long)]
        validity_start: Option<DateTime<Utc>>,

        /// End of the validity window (RFC 3339)
        #[arg(long)]
        validity_expiry: Option<DateTime<Utc>>,

        /// Credit extended before settlement is due
        #[arg(long)]
        credit_limit: Option<Decimal>,

        /// Total spend across the authorization
        #[arg(long)]
        global_amount_limit: Option<Decimal>,

        /// Usage tier as TYPE:VALUE or TYPE:VALUE:PERIOD (at most two)
        #[arg(long = "usage-limit", value_parser = parse_usage_limit)]
        usage_limits: Vec<UsageLimit>,
    },

    /// Fetch pending transaction results
    Results {
        /// Restrict results to one operation, e.g. Pay
        #[arg(long)]
        operation: Option<String>,

        /// Upper bound on the number of results
        #[arg(long)]
        max_results_count: Option<i64>,
    },
}

/// Arguments shared by every pipeline command.
#[derive(Args, Debug)]
struct CommonArgs {
    /// Where the hosted flow returns the buyer
    #[arg(long)]
    return_url: String,

    /// Caller's own reference (sender reference for postpaid)
    #[arg(long)]
    caller_reference: Option<String>,

    /// Reason shown to the buyer
    #[arg(long)]
    payment_reason: Option<String>,

    /// Accepted payment methods
    #[arg(long)]
    payment_method: Option<String>,

    /// Overrides the pipeline name sent to the service
    #[arg(long)]
    pipeline_name: Option<String>,
}

impl CommonArgs {
    fn pipeline_common(&self) -> PipelineCommon {
        PipelineCommon {
            pipeline_name: self.pipeline_name.clone(),
            return_url: Some(self.return_url.clone()),
            caller_key: None,
        }
    }
}

fn parse_usage_limit(raw: &str) -> Result<UsageLimit, String> {
    let mut parts = raw.splitn(3, ':');
    let (Some(limit_type), Some(value)) = (parts.next(), parts.next()) else {
        return Err(format!("expected TYPE:VALUE[:PERIOD], got '{raw}'"));
    };
    if limit_type.is_empty() {
        return Err("usage limit type is empty".to_owned());
    }
    let value = value.parse::<Decimal>().map_err(|e| format!("invalid usage limit value '{value}': {e}"))?;
    Ok(UsageLimit {
        limit_type: limit_type.to_owned(),
        period: parts.next().filter(|p| !p.is_empty()).map(str::to_owned),
        value,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_observability(cli.log_format);

    let config = RemitConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let client = Remit::from_config(&config).context("failed to build client")?;

    run(&client, cli.command).await
}

async fn run(client: &Remit, command: Commands) -> Result<()> {
    match command {
        Commands::SingleUse { common, amount, recipient_token } => {
            let pipeline = SingleUsePipeline {
                common: common.pipeline_common(),
                caller_reference: common.caller_reference,
                payment_reason: common.payment_reason,
                payment_method: common.payment_method,
                transaction_amount: amount,
                recipient_token,
            };
            println!("{}", client.pipeline_url(&pipeline)?);
        }
        Commands::Recurring {
            common,
            amount,
            recipient_token,
            validity_start,
            validity_expiry,
            recurring_period,
        } => {
            let pipeline = RecurringUsePipeline {
                common: common.pipeline_common(),
                caller_reference: common.caller_reference,
                payment_reason: common.payment_reason,
                recipient_token,
                transaction_amount: amount,
                validity_start,
                validity_expiry,
                payment_method: common.payment_method,
                recurring_period,
            };
            println!("{}", client.pipeline_url(&pipeline)?);
        }
        Commands::Postpaid {
            common,
            caller_reference_settlement,
            validity_start,
            validity_expiry,
            credit_limit,
            global_amount_limit,
            usage_limits,
        } => {
            if usage_limits.len() > 2 {
                bail!("at most two --usage-limit tiers are supported, got {}", usage_limits.len());
            }
            let mut tiers = usage_limits.into_iter();
            let pipeline = PostpaidPipeline {
                common: common.pipeline_common(),
                caller_reference_sender: common.caller_reference,
                caller_reference_settlement,
                payment_reason: common.payment_reason,
                payment_method: common.payment_method,
                validity_start,
                validity_expiry,
                credit_limit,
                global_amount_limit,
                usage_limit1: tiers.next(),
                usage_limit2: tiers.next(),
            };
            println!("{}", client.pipeline_url(&pipeline)?);
        }
        Commands::Results { operation, max_results_count } => {
            let request = GetResultsRequest { operation, max_results_count };
            let response = client.get_results(&request).await.context("GetResults failed")?;
            info!(
                results = response.transaction_results.len(),
                pending = response.number_pending,
                "fetched transaction results"
            );
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_single_use() {
        let cli = Cli::try_parse_from([
            "remit",
            "--config",
            "sandbox.toml",
            "single-use",
            "--return-url",
            "https://shop.example.com/return",
            "--amount",
            "10.50",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("sandbox.toml"));
        let Commands::SingleUse { common, amount, .. } = cli.command else {
            panic!("expected single-use");
        };
        assert_eq!(common.return_url, "https://shop.example.com/return");
        assert_eq!(amount, Some(Decimal::new(1050, 2)));
    }

    #[test]
    fn test_parse_recurring_validity() {
        let cli = Cli::try_parse_from([
            "remit",
            "recurring",
            "--return-url",
            "https://shop.example.com/return",
            "--validity-start",
            "2021-01-01T00:00:30Z",
            "--recurring-period",
            "1 Month",
        ])
        .unwrap();

        let Commands::Recurring { validity_start, recurring_period, .. } = cli.command else {
            panic!("expected recurring");
        };
        assert_eq!(validity_start.map(|t| t.timestamp()), Some(1_609_459_230));
        assert_eq!(recurring_period.as_deref(), Some("1 Month"));
    }

    #[test]
    fn test_parse_results() {
        let cli = Cli::try_parse_from(["remit", "results", "--max-results-count", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Results { operation: None, max_results_count: Some(5) }
        ));
    }

    #[test]
    fn test_return_url_required() {
        assert!(Cli::try_parse_from(["remit", "single-use"]).is_err());
    }

    #[test]
    fn test_parse_usage_limit() {
        let limit = parse_usage_limit("Amount:20:1 Month").unwrap();
        assert_eq!(limit.limit_type, "Amount");
        assert_eq!(limit.value, Decimal::from(20));
        assert_eq!(limit.period.as_deref(), Some("1 Month"));

        let limit = parse_usage_limit("Count:5").unwrap();
        assert_eq!(limit.period, None);

        assert!(parse_usage_limit("Count").is_err());
        assert!(parse_usage_limit(":5").is_err());
        assert!(parse_usage_limit("Count:many").is_err());
    }

    #[test]
    fn test_parse_postpaid_usage_limits() {
        let cli = Cli::try_parse_from([
            "remit",
            "postpaid",
            "--return-url",
            "https://shop.example.com/return",
            "--usage-limit",
            "Amount:20:1 Month",
            "--usage-limit",
            "Count:5",
        ])
        .unwrap();

        let Commands::Postpaid { usage_limits, .. } = cli.command else {
            panic!("expected postpaid");
        };
        assert_eq!(usage_limits.len(), 2);
        assert_eq!(usage_limits[1].limit_type, "Count");
    }
}
