//! Common test utilities and helpers for kcwater tests
//!
//! Provides a scripted transport, canned portal responses, and clock
//! helpers so integration tests never touch the network.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use kcwater::{
    client::{Endpoints, UsageClient},
    clock::{Clock, FixedClock},
    error::{KcWaterError, Result},
    transport::{ApiRequest, Transport},
    types::Credentials,
};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const TEST_BASE_URL: &str = "https://portal.test";

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

    pub fn with_response(self, response: Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn with_error(self, error: KcWaterError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Queue the token and customer-info responses of a successful login
    pub fn with_login(self) -> Self {
        self.with_response(token_response())
            .with_response(customer_info_response())
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

pub fn token_response() -> Value {
    json!({
        "access_token": "access-123",
        "token_type": "bearer",
        "expires_in": 3599,
        "user": {"customerId": 987654}
    })
}

pub fn customer_info_response() -> Value {
    json!({
        "accountSummaryType": {
            "services": [
                {"serviceId": "SVC-1", "serviceType": "WATER"},
                {"serviceId": "SVC-2", "serviceType": "SEWER"}
            ]
        },
        "accountContext": {"accountNumber": "ACCT-42"}
    })
}

/// Build an hourly record for `charge_date` at `read_time`
pub fn hourly_record(charge_date: &str, read_time: &str, gallons: f64) -> Value {
    json!({
        "chargeDateRaw": charge_date,
        "readDate": charge_date,
        "readDateTime": read_time,
        "gallonsConsumption": gallons,
        "meterNumber": "M-1"
    })
}

/// Build a daily record for `charge_date`
pub fn daily_record(charge_date: &str, gallons: f64) -> Value {
    json!({
        "chargeDateRaw": charge_date,
        "readDate": charge_date,
        "gallonsConsumption": gallons
    })
}

pub fn usage_response(history: Vec<Value>) -> Value {
    json!({
        "history": history,
        "jsonData": "{\"usageHistory\":[]}"
    })
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

pub fn fixed_clock(now: NaiveDateTime) -> Arc<dyn Clock> {
    Arc::new(FixedClock(now))
}

/// Client wired to a mock transport with a frozen clock
pub fn test_client(transport: MockTransport, now: NaiveDateTime) -> UsageClient<MockTransport> {
    UsageClient::with_transport(transport, Credentials::new("resident@example.com", "pw"))
        .with_endpoints(Endpoints::new(TEST_BASE_URL))
        .with_clock(fixed_clock(now))
}
