//! Standard shape catalog and typed request/response structs.
//!
//! [`standard`] returns the process-wide [`Schema`] holding every pipeline and
//! API shape this crate knows about. It is built on first use and read-only
//! afterwards.
//!
//! # Shapes
//!
//! | Shape                  | Parent     | Own fields                                              |
//! |------------------------|------------|---------------------------------------------------------|
//! | `Pipeline`             |            | `pipeline_name`, `return_URL`, `caller_key`             |
//! | `SingleUsePipeline`    | `Pipeline` | caller reference, reason, method, amount, recipient     |
//! | `RecurringUsePipeline` | `Pipeline` | as above plus validity window and `recurring_period`    |
//! | `PostpaidPipeline`     | `Pipeline` | sender/settlement references, limits, two usage tiers   |
//! | `GetResultsRequest`    | `Request`  | `operation`, `max_results_count`                        |
//! | `GetResultsResponse`   | `Response` | `transaction_results`, `number_pending`                 |
//! | `TransactionResult`    | `Response` | id, operation type, caller reference, status            |

mod get_results;
mod pipeline;

use std::sync::LazyLock;

pub use get_results::{GetResultsRequest, GetResultsResponse, TransactionResult};
pub use pipeline::{
    PipelineCommon, PostpaidPipeline, RecurringUsePipeline, SingleUsePipeline, UsageLimit,
};

use crate::{
    coerce::Record,
    error::Result,
    schema::{Coercion, Schema, SchemaBuilder},
};

static STANDARD: LazyLock<Schema> = LazyLock::new(|| {
    #[allow(clippy::expect_used, reason = "catalog is static and covered by tests")]
    build_standard().expect("standard shape catalog is valid")
});

/// Returns the standard shape catalog.
///
/// # Examples
///
/// ```
/// use remit::shapes;
///
/// let keys: Vec<_> = shapes::standard()
///     .shape("SingleUsePipeline")
///     .unwrap()
///     .fields()
///     .iter()
///     .map(|f| f.wire_key())
///     .collect();
/// assert_eq!(&keys[..3], ["pipelineName", "returnURL", "callerKey"]);
/// ```
#[must_use]
pub fn standard() -> &'static Schema {
    &STANDARD
}

fn build_standard() -> Result<Schema> {
    let mut b = SchemaBuilder::new();

    b.declare("Pipeline", None)?;
    b.add_fields("Pipeline", &["pipeline_name", "return_URL", "caller_key"])?;

    b.declare("SingleUsePipeline", Some("Pipeline"))?;
    b.add_fields(
        "SingleUsePipeline",
        &["caller_reference", "payment_reason", "payment_method", "transaction_amount", "recipient_token"],
    )?;

    b.declare("RecurringUsePipeline", Some("Pipeline"))?;
    b.add_fields(
        "RecurringUsePipeline",
        &["caller_reference", "payment_reason", "recipient_token", "transaction_amount"],
    )?;
    b.add_field("RecurringUsePipeline", "validity_start", Coercion::Timestamp)?;
    b.add_field("RecurringUsePipeline", "validity_expiry", Coercion::Timestamp)?;
    b.add_fields("RecurringUsePipeline", &["payment_method", "recurring_period"])?;

    b.declare("PostpaidPipeline", Some("Pipeline"))?;
    b.add_fields(
        "PostpaidPipeline",
        &["caller_reference_sender", "caller_reference_settlement", "payment_reason", "payment_method"],
    )?;
    b.add_field("PostpaidPipeline", "validity_start", Coercion::Timestamp)?;
    b.add_field("PostpaidPipeline", "validity_expiry", Coercion::Timestamp)?;
    b.add_fields(
        "PostpaidPipeline",
        &[
            "credit_limit",
            "global_amount_limit",
            "usage_limit_type1",
            "usage_limit_period1",
            "usage_limit_value1",
            "usage_limit_type2",
            "usage_limit_period2",
            "usage_limit_value2",
        ],
    )?;

    b.declare("Request", None)?;
    b.declare("GetResultsRequest", Some("Request"))?;
    b.add_field("GetResultsRequest", "operation", Coercion::PassThrough)?;
    b.add_field("GetResultsRequest", "max_results_count", Coercion::Integer)?;

    b.declare("Response", None)?;
    b.declare("TransactionResult", Some("Response"))?;
    b.add_fields(
        "TransactionResult",
        &["transaction_id", "operation_type", "caller_reference", "transaction_status"],
    )?;
    b.declare("GetResultsResponse", Some("Response"))?;
    b.add_field(
        "GetResultsResponse",
        "transaction_results",
        Coercion::Collection("TransactionResult".to_owned()),
    )?;
    b.add_field("GetResultsResponse", "number_pending", Coercion::Integer)?;

    b.build()
}

/// A typed pipeline variant.
pub trait PipelineRequest {
    /// Shape name in the standard catalog.
    const SHAPE: &'static str;

    /// Value sent as `pipelineName` when the caller leaves it unset.
    const PIPELINE_NAME: &'static str;

    /// Converts the typed fields into a record of [`Self::SHAPE`].
    ///
    /// # Errors
    ///
    /// Returns an error if a value does not fit its declared field.
    fn to_record(&self) -> Result<Record>;
}

/// A typed API request with its response type.
pub trait ApiRequest {
    /// Value sent as the `Action` parameter.
    const ACTION: &'static str;

    /// Shape name in the standard catalog.
    const SHAPE: &'static str;

    /// Typed response decoded from the call's payload.
    type Response: FromRecord;

    /// Converts the typed fields into a record of [`Self::SHAPE`].
    ///
    /// # Errors
    ///
    /// Returns an error if a value does not fit its declared field.
    fn to_record(&self) -> Result<Record>;
}

/// Construction of a typed struct from a decoded record.
pub trait FromRecord: Sized {
    /// Shape name in the standard catalog.
    const SHAPE: &'static str;

    /// Reads the typed fields out of a record of [`Self::SHAPE`].
    ///
    /// # Errors
    ///
    /// Returns an error if a field holds a value of the wrong kind.
    fn from_record(record: &Record) -> Result<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_keys(shape: &str) -> Vec<&'static str> {
        standard().shape(shape).unwrap().fields().iter().map(|f| f.wire_key()).collect()
    }

    #[test]
    fn test_catalog_builds() {
        assert!(build_standard().is_ok());
    }

    #[test]
    fn test_pipeline_variants_share_base_fields() {
        for shape in ["SingleUsePipeline", "RecurringUsePipeline", "PostpaidPipeline"] {
            assert_eq!(&wire_keys(shape)[..3], ["pipelineName", "returnURL", "callerKey"]);
        }
    }

    #[test]
    fn test_recurring_pipeline_field_order() {
        assert_eq!(
            wire_keys("RecurringUsePipeline"),
            [
                "pipelineName",
                "returnURL",
                "callerKey",
                "callerReference",
                "paymentReason",
                "recipientToken",
                "transactionAmount",
                "validityStart",
                "validityExpiry",
                "paymentMethod",
                "recurringPeriod",
            ]
        );
    }

    #[test]
    fn test_postpaid_usage_limit_keys() {
        let keys = wire_keys("PostpaidPipeline");
        assert!(keys.contains(&"usageLimitType1"));
        assert!(keys.contains(&"usageLimitValue2"));
        assert_eq!(keys.len(), 3 + 14);
    }

    #[test]
    fn test_get_results_shapes() {
        assert_eq!(wire_keys("GetResultsRequest"), ["operation", "maxResultsCount"]);
        assert_eq!(wire_keys("GetResultsResponse"), ["transactionResults", "numberPending"]);
        assert_eq!(
            standard().shape("TransactionResult").unwrap().parent(),
            Some("Response")
        );
    }
}
