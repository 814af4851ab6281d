//! Integration tests for API calls through a mock transport.

use std::sync::Mutex;

use remit::{
    Remit, RemitError,
    api::SignedCall,
    config::RemitConfig,
    shapes::{GetResultsRequest, TransactionResult},
    transport::{Transport, TransportResponse},
};

/// Returns a canned body and records every call it receives.
struct MockTransport {
    body: &'static str,
    status: u16,
    calls: Mutex<Vec<SignedCall>>,
}

impl MockTransport {
    fn ok(body: &'static str) -> Self {
        Self { body, status: 200, calls: Mutex::new(Vec::new()) }
    }
}

impl Transport for MockTransport {
    async fn execute<'a>(&'a self, call: &'a SignedCall) -> remit::Result<TransportResponse> {
        self.calls.lock().unwrap().push(call.clone());
        if self.status >= 400 {
            return Err(RemitError::TransportError(format!("status {}", self.status)));
        }
        Ok(TransportResponse { status: self.status, body: self.body.as_bytes().to_vec(), headers: vec![] })
    }

    fn protocol_name(&self) -> &'static str {
        "mock"
    }
}

fn config() -> RemitConfig {
    RemitConfig::from_toml(
        r#"
        access_key = "AKIAEXAMPLE"
        secret_key = "secret-key"
        sandbox = true
        "#,
    )
    .unwrap()
}

const THREE_RESULTS: &str = r#"{
    "numberPending": "4",
    "transactionResults": [
        {"transactionId": "t-1", "operationType": "Pay", "callerReference": "order-1", "transactionStatus": "Success"},
        {"transactionId": "t-2", "operationType": "Refund", "callerReference": "order-2", "transactionStatus": "Failure"},
        {"transactionId": "t-3", "operationType": "Pay", "callerReference": "order-3", "transactionStatus": "Success"}
    ],
    "requestId": "r-99"
}"#;

#[tokio::test]
async fn test_get_results_decodes_three_records_in_order() {
    let client = Remit::with_transport(&config(), MockTransport::ok(THREE_RESULTS)).unwrap();

    let response = client.get_results(&GetResultsRequest::default()).await.unwrap();

    assert_eq!(response.number_pending, Some(4));
    let ids: Vec<_> =
        response.transaction_results.iter().map(|r| r.transaction_id.as_deref().unwrap()).collect();
    assert_eq!(ids, ["t-1", "t-2", "t-3"]);
    assert_eq!(response.transaction_results[1].operation_type.as_deref(), Some("Refund"));
    assert_eq!(response.transaction_results[2].caller_reference.as_deref(), Some("order-3"));
}

#[tokio::test]
async fn test_get_results_sends_signed_call() {
    let transport = MockTransport::ok(r#"{"numberPending": 0}"#);
    let client = Remit::with_transport(&config(), transport).unwrap();

    let request =
        GetResultsRequest { operation: Some("Pay".to_owned()), max_results_count: Some(25) };
    client.get_results(&request).await.unwrap();

    let calls = client.transport().calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.action, "GetResults");
    assert_eq!(call.endpoint.as_str(), "https://fps.sandbox.amazonaws.com/");
    assert!(call.query.starts_with("Action=GetResults&AWSAccessKeyId=AKIAEXAMPLE&Timestamp="));
    assert!(call.query.contains("&operation=Pay&maxResultsCount=25&SignatureMethod=HmacSHA256&"));
}

#[tokio::test]
async fn test_mock_receives_one_call_per_request() {
    let transport = MockTransport::ok(r#"{}"#);
    let config = config();
    let api = remit::api::ApiRequestBuilder::new(
        config.api_endpoint(),
        config.credentials().unwrap(),
    )
    .unwrap();

    let response = api.call(&transport, &GetResultsRequest::default()).await.unwrap();
    assert!(response.transaction_results.is_empty());
    assert_eq!(response.number_pending, None);

    let calls = transport.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].url().starts_with("https://fps.sandbox.amazonaws.com/?Action=GetResults&"));
}

#[tokio::test]
async fn test_gap_in_indices_is_malformed_collection() {
    let body = r#"{
        "transactionResults.1.transactionId": "t-1",
        "transactionResults.3.transactionId": "t-3",
        "numberPending": "0"
    }"#;
    let client = Remit::with_transport(&config(), MockTransport::ok(body)).unwrap();

    let err = client.get_results(&GetResultsRequest::default()).await.unwrap_err();
    assert!(matches!(err, RemitError::MalformedCollection { ref field, .. } if field == "transactionResults"));
}

#[tokio::test]
async fn test_empty_result_element_keeps_its_position() {
    let body = r#"{"transactionResults": [{"transactionId": "t-1"}, {}, {"transactionId": "t-3"}]}"#;
    let client = Remit::with_transport(&config(), MockTransport::ok(body)).unwrap();

    let response = client.get_results(&GetResultsRequest::default()).await.unwrap();

    let ids: Vec<_> = response.transaction_results.iter().map(|r| r.transaction_id.as_deref()).collect();
    assert_eq!(ids, [Some("t-1"), None, Some("t-3")]);
}

#[tokio::test]
async fn test_trailing_null_result_element_is_not_dropped() {
    let body = r#"{"transactionResults": [{"transactionId": "t-1"}, {"transactionId": "t-2"}, {"transactionId": null}]}"#;
    let client = Remit::with_transport(&config(), MockTransport::ok(body)).unwrap();

    let response = client.get_results(&GetResultsRequest::default()).await.unwrap();

    assert_eq!(response.transaction_results.len(), 3);
    assert_eq!(response.transaction_results[2], TransactionResult::default());
}

#[tokio::test]
async fn test_bad_number_pending_is_type_mismatch() {
    let client =
        Remit::with_transport(&config(), MockTransport::ok(r#"{"numberPending": "lots"}"#)).unwrap();
    let err = client.get_results(&GetResultsRequest::default()).await.unwrap_err();
    assert!(matches!(err, RemitError::TypeMismatch { ref field, .. } if field == "number_pending"));
}

#[tokio::test]
async fn test_non_json_body_is_encoding_error() {
    let client = Remit::with_transport(&config(), MockTransport::ok("<Response/>")).unwrap();
    let err = client.get_results(&GetResultsRequest::default()).await.unwrap_err();
    assert!(matches!(err, RemitError::EncodingError(_)));
}

#[tokio::test]
async fn test_transport_error_surfaces_unchanged() {
    let transport = MockTransport { body: "", status: 503, calls: Mutex::new(Vec::new()) };
    let client = Remit::with_transport(&config(), transport).unwrap();
    let err = client.get_results(&GetResultsRequest::default()).await.unwrap_err();
    assert!(matches!(err, RemitError::TransportError(ref m) if m == "status 503"));
}
