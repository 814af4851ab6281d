//! `GetResults` request and response.

use serde::Serialize;

use super::{ApiRequest, FromRecord, standard};
use crate::{
    coerce::{Record, Value},
    error::{RemitError, Result},
};

/// Asks for the outcome of pending transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetResultsRequest {
    /// Restricts results to one operation, e.g. `Pay`.
    pub operation: Option<String>,
    /// Upper bound on the number of results returned.
    pub max_results_count: Option<i64>,
}

impl ApiRequest for GetResultsRequest {
    const ACTION: &'static str = "GetResults";
    const SHAPE: &'static str = "GetResultsRequest";
    type Response = GetResultsResponse;

    fn to_record(&self) -> Result<Record> {
        Record::new(standard(), Self::SHAPE)?
            .with("operation", self.operation.clone())?
            .with("max_results_count", self.max_results_count)
    }
}

/// Outcome of one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionResult {
    /// Service-assigned transaction id.
    pub transaction_id: Option<String>,
    /// Operation that created the transaction.
    pub operation_type: Option<String>,
    /// Caller reference given when the transaction was created.
    pub caller_reference: Option<String>,
    /// Final status, e.g. `Success` or `Failure`.
    pub transaction_status: Option<String>,
}

impl FromRecord for TransactionResult {
    const SHAPE: &'static str = "TransactionResult";

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            transaction_id: record.text("transaction_id"),
            operation_type: record.text("operation_type"),
            caller_reference: record.text("caller_reference"),
            transaction_status: record.text("transaction_status"),
        })
    }
}

/// Decoded `GetResults` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GetResultsResponse {
    /// Results in the order the service returned them.
    pub transaction_results: Vec<TransactionResult>,
    /// Transactions still awaiting a result.
    pub number_pending: Option<i64>,
}

impl FromRecord for GetResultsResponse {
    const SHAPE: &'static str = "GetResultsResponse";

    /// An absent and an empty `transaction_results` both decode to an empty list.
    fn from_record(record: &Record) -> Result<Self> {
        let transaction_results = match record.get("transaction_results") {
            None => Vec::new(),
            Some(Value::Records(records)) => {
                records.iter().map(TransactionResult::from_record).collect::<Result<_>>()?
            }
            Some(_) => {
                return Err(RemitError::mismatch("transaction_results", "expected records"));
            }
        };
        Ok(Self { transaction_results, number_pending: record.integer("number_pending") })
    }
}
