//! Pipeline variants.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{PipelineRequest, standard};
use crate::{coerce::Record, error::Result};

/// Fields every pipeline variant carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineCommon {
    /// Sent as `pipelineName`; defaults to the variant's own name.
    pub pipeline_name: Option<String>,
    /// Where the hosted flow sends the buyer afterwards (`returnURL`).
    pub return_url: Option<String>,
    /// Sent as `callerKey`; defaults to the configured access key.
    pub caller_key: Option<String>,
}

impl PipelineCommon {
    /// Common fields with only the return URL set.
    #[must_use]
    pub fn returning_to(return_url: impl Into<String>) -> Self {
        Self { return_url: Some(return_url.into()), ..Self::default() }
    }

    fn record(&self, shape: &str) -> Result<Record> {
        Record::new(standard(), shape)?
            .with("pipeline_name", self.pipeline_name.clone())?
            .with("return_URL", self.return_url.clone())?
            .with("caller_key", self.caller_key.clone())
    }
}

/// One-off payment authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SingleUsePipeline {
    /// Shared pipeline fields.
    pub common: PipelineCommon,
    /// Caller's own reference for the payment.
    pub caller_reference: Option<String>,
    /// Reason shown to the buyer.
    pub payment_reason: Option<String>,
    /// Accepted payment methods.
    pub payment_method: Option<String>,
    /// Amount to authorize.
    pub transaction_amount: Option<Decimal>,
    /// Token of the receiving party.
    pub recipient_token: Option<String>,
}

impl PipelineRequest for SingleUsePipeline {
    const SHAPE: &'static str = "SingleUsePipeline";
    const PIPELINE_NAME: &'static str = "SingleUse";

    fn to_record(&self) -> Result<Record> {
        self.common
            .record(Self::SHAPE)?
            .with("caller_reference", self.caller_reference.clone())?
            .with("payment_reason", self.payment_reason.clone())?
            .with("payment_method", self.payment_method.clone())?
            .with("transaction_amount", self.transaction_amount)?
            .with("recipient_token", self.recipient_token.clone())
    }
}

/// Authorization for repeated charges within a validity window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurringUsePipeline {
    /// Shared pipeline fields.
    pub common: PipelineCommon,
    /// Caller's own reference for the authorization.
    pub caller_reference: Option<String>,
    /// Reason shown to the buyer.
    pub payment_reason: Option<String>,
    /// Token of the receiving party.
    pub recipient_token: Option<String>,
    /// Amount of each charge.
    pub transaction_amount: Option<Decimal>,
    /// Start of the validity window.
    pub validity_start: Option<DateTime<Utc>>,
    /// End of the validity window.
    pub validity_expiry: Option<DateTime<Utc>>,
    /// Accepted payment methods.
    pub payment_method: Option<String>,
    /// Charge period, e.g. `1 Month`.
    pub recurring_period: Option<String>,
}

impl PipelineRequest for RecurringUsePipeline {
    const SHAPE: &'static str = "RecurringUsePipeline";
    const PIPELINE_NAME: &'static str = "Recurring";

    fn to_record(&self) -> Result<Record> {
        self.common
            .record(Self::SHAPE)?
            .with("caller_reference", self.caller_reference.clone())?
            .with("payment_reason", self.payment_reason.clone())?
            .with("recipient_token", self.recipient_token.clone())?
            .with("transaction_amount", self.transaction_amount)?
            .with("validity_start", self.validity_start)?
            .with("validity_expiry", self.validity_expiry)?
            .with("payment_method", self.payment_method.clone())?
            .with("recurring_period", self.recurring_period.clone())
    }
}

/// One usage tier of a postpaid authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageLimit {
    /// Limit kind, e.g. `Amount` or `Count`.
    pub limit_type: String,
    /// Period the limit applies to, e.g. `1 Month`.
    pub period: Option<String>,
    /// Limit value.
    pub value: Decimal,
}

/// Credit-line style authorization settled later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostpaidPipeline {
    /// Shared pipeline fields.
    pub common: PipelineCommon,
    /// Caller reference for the sender token.
    pub caller_reference_sender: Option<String>,
    /// Caller reference for the settlement token.
    pub caller_reference_settlement: Option<String>,
    /// Reason shown to the buyer.
    pub payment_reason: Option<String>,
    /// Accepted payment methods.
    pub payment_method: Option<String>,
    /// Start of the validity window.
    pub validity_start: Option<DateTime<Utc>>,
    /// End of the validity window.
    pub validity_expiry: Option<DateTime<Utc>>,
    /// Credit extended before settlement is due.
    pub credit_limit: Option<Decimal>,
    /// Total spend across the authorization.
    pub global_amount_limit: Option<Decimal>,
    /// First usage tier.
    pub usage_limit1: Option<UsageLimit>,
    /// Second usage tier.
    pub usage_limit2: Option<UsageLimit>,
}

impl PipelineRequest for PostpaidPipeline {
    const SHAPE: &'static str = "PostpaidPipeline";
    const PIPELINE_NAME: &'static str = "SetupPostpaid";

    fn to_record(&self) -> Result<Record> {
        let mut record = self
            .common
            .record(Self::SHAPE)?
            .with("caller_reference_sender", self.caller_reference_sender.clone())?
            .with("caller_reference_settlement", self.caller_reference_settlement.clone())?
            .with("payment_reason", self.payment_reason.clone())?
            .with("payment_method", self.payment_method.clone())?
            .with("validity_start", self.validity_start)?
            .with("validity_expiry", self.validity_expiry)?
            .with("credit_limit", self.credit_limit)?
            .with("global_amount_limit", self.global_amount_limit)?;

        for (tier, limit) in [(1, &self.usage_limit1), (2, &self.usage_limit2)] {
            if let Some(limit) = limit {
                record
                    .set(&format!("usage_limit_type{tier}"), limit.limit_type.as_str())?
                    .set(&format!("usage_limit_period{tier}"), limit.period.clone())?
                    .set(&format!("usage_limit_value{tier}"), limit.value)?;
            }
        }
        Ok(record)
    }
}
