//! Authentication state for one portal account
//!
//! A session moves through three states and never backwards except by
//! starting a new login:
//!
//! ```text
//! Anonymous --acquire_token--> TokenAcquired --resolve_customer_info--> LoggedIn
//! ```
//!
//! The state is only held in memory and is never persisted.

use std::fmt;

/// Where a session is in the login sequence
#[derive(Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No token yet
    #[default]
    Anonymous,
    /// Token issued, account identifiers not resolved yet
    TokenAcquired {
        access_token: String,
        customer_id: String,
    },
    /// Ready for usage requests
    LoggedIn {
        access_token: String,
        customer_id: String,
        account_number: String,
        service_id: String,
    },
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Anonymous => f.write_str("Anonymous"),
            SessionState::TokenAcquired { customer_id, .. } => f
                .debug_struct("TokenAcquired")
                .field("customer_id", customer_id)
                .finish_non_exhaustive(),
            SessionState::LoggedIn {
                customer_id,
                account_number,
                service_id,
                ..
            } => f
                .debug_struct("LoggedIn")
                .field("customer_id", customer_id)
                .field("account_number", account_number)
                .field("service_id", service_id)
                .finish_non_exhaustive(),
        }
    }
}

/// Identifiers that scope usage requests to one meter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountContext<'a> {
    pub customer_id: &'a str,
    pub account_number: &'a str,
    pub service_id: &'a str,
}

/// In-memory authentication state
///
/// Not meant to be shared between tasks; callers that need to must serialize
/// access themselves.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    /// Create an anonymous session
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Record a freshly issued token, discarding any previous login
    pub(crate) fn token_acquired(&mut self, access_token: String, customer_id: String) {
        self.state = SessionState::TokenAcquired {
            access_token,
            customer_id,
        };
    }

    /// Promote a token-holding session to logged in
    ///
    /// Returns `false` and leaves the state untouched if no token is held.
    pub(crate) fn logged_in(&mut self, account_number: String, service_id: String) -> bool {
        let (access_token, customer_id) = match &self.state {
            SessionState::TokenAcquired {
                access_token,
                customer_id,
            }
            | SessionState::LoggedIn {
                access_token,
                customer_id,
                ..
            } => (access_token.clone(), customer_id.clone()),
            SessionState::Anonymous => return false,
        };

        self.state = SessionState::LoggedIn {
            access_token,
            customer_id,
            account_number,
            service_id,
        };
        true
    }

    /// Drop all credentials
    pub fn reset(&mut self) {
        self.state = SessionState::Anonymous;
    }

    /// True only once the token and all account identifiers are known
    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn { .. })
    }

    pub fn access_token(&self) -> Option<&str> {
        match &self.state {
            SessionState::Anonymous => None,
            SessionState::TokenAcquired { access_token, .. }
            | SessionState::LoggedIn { access_token, .. } => Some(access_token.as_str()),
        }
    }

    pub fn customer_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::Anonymous => None,
            SessionState::TokenAcquired { customer_id, .. }
            | SessionState::LoggedIn { customer_id, .. } => Some(customer_id.as_str()),
        }
    }

    pub fn account_number(&self) -> Option<&str> {
        match &self.state {
            SessionState::LoggedIn { account_number, .. } => Some(account_number.as_str()),
            _ => None,
        }
    }

    pub fn service_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::LoggedIn { service_id, .. } => Some(service_id.as_str()),
            _ => None,
        }
    }

    /// Account identifiers, available once logged in
    pub fn account_context(&self) -> Option<AccountContext<'_>> {
        match &self.state {
            SessionState::LoggedIn {
                customer_id,
                account_number,
                service_id,
                ..
            } => Some(AccountContext {
                customer_id: customer_id.as_str(),
                account_number: account_number.as_str(),
                service_id: service_id.as_str(),
            }),
            _ => None,
        }
    }

    /// Headers for authenticated JSON requests, once a token is held
    pub fn auth_headers(&self) -> Option<Vec<(String, String)>> {
        self.access_token().map(|token| {
            vec![
                ("Authorization".to_string(), format!("Bearer {token}")),
                ("Content-Type".to_string(), "application/json".to_string()),
            ]
        })
    }
}
