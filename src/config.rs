// src/config.rs

//! Configuration types for the api limiter

// dependencies
use crate::errors::{ApiLimiterError, Result};
use std::time::Duration;

/// Client token meaning "every client shares this rule".
pub const ALL_CLIENTS: &str = "*";

/// Trailing marker that turns an API name into a root API.
pub const ROOT_API_MARKER: char = '*';

/// Calls allowed per window when none are given.
pub const DEFAULT_MAX_CALLS: u32 = 5;

/// Window length when none is given.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

/// One limiting rule: `client` may call `api_name` at most `max_calls` times per `window`.
///
/// An `api_name` ending in [`ROOT_API_MARKER`] applies to every API name starting with
/// the part before the marker. A `client` of [`ALL_CLIENTS`] applies one shared counter
/// to every caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    api_name: String,
    client: String,
    max_calls: u32,
    window: Duration,
}

impl ApiConfig {
    /// Rule for all clients with the default limits (5 calls per 10 seconds)
    pub fn new(api_name: impl Into<String>) -> Self {
        Self::with_limits(api_name, DEFAULT_MAX_CALLS, DEFAULT_WINDOW, ALL_CLIENTS)
    }

    /// Rule for one client with the default limits
    pub fn for_client(api_name: impl Into<String>, client: impl Into<String>) -> Self {
        Self::with_limits(api_name, DEFAULT_MAX_CALLS, DEFAULT_WINDOW, client)
    }

    /// Fully specified rule
    pub fn with_limits(
        api_name: impl Into<String>,
        max_calls: u32,
        window: Duration,
        client: impl Into<String>,
    ) -> Self {
        Self {
            api_name: api_name.into(),
            client: client.into(),
            max_calls,
            window,
        }
    }

    /// Build one rule per listed client, all sharing the same API and limits.
    ///
    /// Fails with [`ApiLimiterError::MissingClients`] when `clients` is `None`.
    /// An empty list is accepted and yields no rules.
    pub fn of<S: AsRef<str>>(
        api_name: &str,
        max_calls: u32,
        window: Duration,
        clients: Option<&[S]>,
    ) -> Result<Vec<ApiConfig>> {
        let clients = clients.ok_or(ApiLimiterError::MissingClients)?;
        Ok(clients
            .iter()
            .map(|client| Self::with_limits(api_name, max_calls, window, client.as_ref()))
            .collect())
    }

    /// Builder-style: set max calls per window
    pub fn max_calls(mut self, max_calls: u32) -> Self {
        self.max_calls = max_calls;
        self
    }

    /// Builder-style: set window length
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Builder-style: set the client this rule applies to
    pub fn client(mut self, client: impl Into<String>) -> Self {
        self.client = client.into();
        self
    }

    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    pub fn client_name(&self) -> &str {
        &self.client
    }

    pub fn call_limit(&self) -> u32 {
        self.max_calls
    }

    pub fn window_length(&self) -> Duration {
        self.window
    }

    /// True when the rule covers every client
    pub fn is_all_clients(&self) -> bool {
        self.client == ALL_CLIENTS
    }

    /// True when the API name ends with the root marker
    pub fn is_root_api(&self) -> bool {
        self.api_name.ends_with(ROOT_API_MARKER)
    }

    /// The prefix a root API matches against, or `None` for an exact API.
    pub fn root_prefix(&self) -> Option<&str> {
        self.api_name.strip_suffix(ROOT_API_MARKER)
    }
}
