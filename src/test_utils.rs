//! Shared test utilities for unit tests
//!
//! Integration tests (in tests/) cannot see this module because it is
//! compiled only with `cfg(test)`; they carry their own copy in
//! tests/common/mod.rs.

use async_trait::async_trait;
use kcwater_core::error::{KcWaterError, Result};
use kcwater_core::types::UsageKind;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::diagnostics::DiagnosticSink;
use crate::transport::{ApiRequest, Transport};

/// Transport that replays scripted responses and remembers every request
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Value>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful JSON response
    pub fn with_response(self, response: Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a failure
    pub fn with_error(self, error: KcWaterError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, request: ApiRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(KcWaterError::UnexpectedResponse("no scripted response".into())))
    }
}

/// Sink that keeps every recorded response in memory
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<(UsageKind, Value)>>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<(UsageKind, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&self, kind: UsageKind, response: &Value) -> Result<()> {
        self.calls.lock().unwrap().push((kind, response.clone()));
        Ok(())
    }
}

pub fn token_response(access_token: &str, customer_id: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "user": {"customerId": customer_id}
    })
}

pub fn customer_info_response(account_number: &str, service_id: &str) -> Value {
    json!({
        "accountSummaryType": {"services": [{"serviceId": service_id, "serviceType": "WATER"}]},
        "accountContext": {"accountNumber": account_number}
    })
}

pub fn usage_response(history: Value) -> Value {
    json!({
        "history": history,
        "jsonData": "{\"usageHistory\":[]}"
    })
}
