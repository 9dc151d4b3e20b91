//! Portal client: login sequence and usage requests
//!
//! # Examples
//!
//! ```no_run
//! use kcwater::client::UsageClient;
//! use kcwater::types::Credentials;
//!
//! #[tokio::main]
//! async fn main() -> kcwater::Result<()> {
//!     let mut client = UsageClient::new(Credentials::new("me@example.com", "secret"));
//!     client.login().await?;
//!
//!     if let Some(history) = client.get_usage_daily_today().await? {
//!         println!("{} daily readings so far", history.len());
//!     }
//!     Ok(())
//! }
//! ```

use chrono::NaiveDate;
use kcwater_core::clock::{Clock, SystemClock};
use kcwater_core::error::{KcWaterError, Result};
use kcwater_core::filters::HistoryFilter;
use kcwater_core::types::{Credentials, UsageHistory, UsageKind, format_api_date};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::diagnostics::{DiagnosticSink, NoopSink};
use crate::session::Session;
use crate::transport::{ApiRequest, HttpTransport, Transport};

/// Production portal address
pub const DEFAULT_BASE_URL: &str = "https://my.kcwater.us";

/// Basic-auth value identifying the portal's public web client
const CLIENT_BASIC_AUTH: &str = "Basic d2ViQ2xpZW50SWRQYXNzd29yZDpzZWNyZXQ=";

/// Meter port sent with hourly requests
pub const DEFAULT_PORT: &str = "1";

/// Endpoint URLs of the portal API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub token: String,
    pub customer_info: String,
    pub hourly_usage: String,
    pub daily_usage: String,
}

impl Endpoints {
    /// Build the endpoint set for a portal at `base_url`
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            token: format!("{base}/rest/oauth/token"),
            customer_info: format!("{base}/rest/account/customer/"),
            hourly_usage: format!("{base}/rest/usage/month/day"),
            daily_usage: format!("{base}/rest/usage/month"),
        }
    }

    /// URL serving usage of the given granularity
    pub fn usage(&self, kind: UsageKind) -> &str {
        match kind {
            UsageKind::Hourly => &self.hourly_usage,
            UsageKind::Daily => &self.daily_usage,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Extract an identifier that the API sends either as a string or a number
fn json_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Turn a rejected HTTP status during login into an authentication failure
fn login_failure(step: &'static str) -> impl FnOnce(KcWaterError) -> KcWaterError {
    move |e| match e {
        KcWaterError::HttpStatus { status, .. } => {
            KcWaterError::Auth(format!("{step} rejected with HTTP {status}"))
        }
        other => other,
    }
}

/// Client for one portal account
///
/// Usage requests are only sent after [`login`](Self::login) succeeded.
/// Every returned history has readings whose period has not elapsed yet
/// removed, judged against the client's [`Clock`].
pub struct UsageClient<T = HttpTransport> {
    transport: T,
    credentials: Credentials,
    endpoints: Endpoints,
    session: Session,
    clock: Arc<dyn Clock>,
    diagnostics: Arc<dyn DiagnosticSink>,
    port: String,
}

impl UsageClient<HttpTransport> {
    /// Create a client talking to the production portal
    pub fn new(credentials: Credentials) -> Self {
        Self::with_transport(HttpTransport::new(), credentials)
    }
}

impl<T: Transport> UsageClient<T> {
    /// Create a client on top of a custom transport
    pub fn with_transport(transport: T, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
            endpoints: Endpoints::default(),
            session: Session::new(),
            clock: Arc::new(SystemClock::default()),
            diagnostics: Arc::new(NoopSink),
            port: DEFAULT_PORT.to_string(),
        }
    }

    /// Use different endpoint URLs
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Use a different source of "now"
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Send raw usage responses to `sink`
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// Today's date according to the client's clock
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Exchange the credentials for an access token
    ///
    /// On success the session holds the token and customer id but is not
    /// logged in yet.
    pub async fn acquire_token(&mut self) -> Result<()> {
        info!("Logging in with username: {}", self.credentials.username);

        let request = ApiRequest::form(
            self.endpoints.token.as_str(),
            [
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
                ("grant_type", "password"),
            ],
        )
        .header("Authorization", CLIENT_BASIC_AUTH);

        let response = self
            .transport
            .post(request)
            .await
            .map_err(login_failure("token request"))?;

        let access_token = response
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| KcWaterError::Auth("token response has no access_token".into()))?
            .to_string();
        let customer_id = json_id(response.pointer("/user/customerId"))
            .ok_or_else(|| KcWaterError::Auth("token response has no user.customerId".into()))?;

        debug!("Token acquired for customer {}", customer_id);
        self.session.token_acquired(access_token, customer_id);
        Ok(())
    }

    /// Look up the account number and service id of the customer
    pub async fn resolve_customer_info(&mut self) -> Result<()> {
        let (Some(customer_id), Some(headers)) =
            (self.session.customer_id(), self.session.auth_headers())
        else {
            return Err(KcWaterError::Auth(
                "no access token, acquire a token first".into(),
            ));
        };

        let request = ApiRequest::json(
            self.endpoints.customer_info.as_str(),
            json!({ "customerId": customer_id }),
        )
        .headers(headers);

        let response = self
            .transport
            .post(request)
            .await
            .map_err(login_failure("customer info request"))?;

        let service_id = json_id(response.pointer("/accountSummaryType/services/0/serviceId"))
            .ok_or_else(|| {
                KcWaterError::Auth(
                    "customer info has no accountSummaryType.services[0].serviceId".into(),
                )
            })?;
        let account_number = json_id(response.pointer("/accountContext/accountNumber"))
            .ok_or_else(|| {
                KcWaterError::Auth("customer info has no accountContext.accountNumber".into())
            })?;

        if !self.session.logged_in(account_number, service_id) {
            return Err(KcWaterError::Auth("session lost its access token".into()));
        }

        if let Some(account) = self.session.account_context() {
            debug!(
                "Account number = {}, service ID = {}, customer ID = {}",
                account.account_number, account.service_id, account.customer_id
            );
        }
        Ok(())
    }

    /// Acquire a token and resolve the account, in that order
    ///
    /// Any previous login is discarded first, so a failure always leaves the
    /// client logged out.
    pub async fn login(&mut self) -> Result<()> {
        self.session.reset();
        self.acquire_token().await?;
        self.resolve_customer_info().await
    }

    /// Hourly readings for `date`
    ///
    /// Returns `Ok(None)` without contacting the server when not logged in.
    pub async fn get_usage_hourly(&self, date: NaiveDate) -> Result<Option<UsageHistory>> {
        self.fetch_usage(UsageKind::Hourly, date).await
    }

    /// Daily readings for the month containing `date`
    ///
    /// Returns `Ok(None)` without contacting the server when not logged in.
    pub async fn get_usage_daily(&self, date: NaiveDate) -> Result<Option<UsageHistory>> {
        self.fetch_usage(UsageKind::Daily, date).await
    }

    /// Hourly readings for today
    pub async fn get_usage_hourly_today(&self) -> Result<Option<UsageHistory>> {
        self.get_usage_hourly(self.today()).await
    }

    /// Daily readings for the current month
    pub async fn get_usage_daily_today(&self) -> Result<Option<UsageHistory>> {
        self.get_usage_daily(self.today()).await
    }

    async fn fetch_usage(&self, kind: UsageKind, date: NaiveDate) -> Result<Option<UsageHistory>> {
        let (Some(body), Some(headers)) = (
            self.usage_request_body(kind, date),
            self.session.auth_headers(),
        ) else {
            error!(kind = %kind, "Must log in first");
            return Ok(None);
        };

        info!("Fetching {} usage for {}", kind, format_api_date(date));
        let request = ApiRequest::json(self.endpoints.usage(kind), body).headers(headers);
        let mut response = self.transport.post(request).await?;

        if let Err(e) = self.diagnostics.record(kind, &response) {
            warn!("Failed to record {} diagnostics: {}", kind, e);
        }

        let history = match response.get_mut("history").map(Value::take) {
            Some(history @ Value::Array(_)) => serde_json::from_value::<UsageHistory>(history)?,
            Some(_) => {
                return Err(KcWaterError::UnexpectedResponse(format!(
                    "{kind} usage history is not an array"
                )));
            }
            None => {
                return Err(KcWaterError::UnexpectedResponse(format!(
                    "{kind} usage response has no history"
                )));
            }
        };

        let filtered = HistoryFilter::from_clock(&*self.clock).apply(history)?;
        Ok(Some(filtered))
    }

    /// Request body for a usage call, or `None` when not logged in
    fn usage_request_body(&self, kind: UsageKind, date: NaiveDate) -> Option<Value> {
        let account = self.session.account_context()?;
        let formatted = format_api_date(date);

        let mut body = json!({
            "customerId": account.customer_id,
            "accountContext": {
                "accountNumber": account.account_number,
                "serviceId": account.service_id,
            },
            "month": formatted,
        });
        if kind == UsageKind::Hourly {
            body["day"] = json!(formatted);
            body["port"] = json!(self.port);
        }
        Some(body)
    }
}
