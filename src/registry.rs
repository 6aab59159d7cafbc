// src/registry.rs

// the public gate: rule registration and per-call limiter resolution

// dependencies
use crate::clock::{Clock, SystemClock};
use crate::config::{ALL_CLIENTS, ApiConfig, ROOT_API_MARKER};
use crate::errors::{ApiLimiterError, Result};
use crate::limiter::Limiter;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

type ClientLimiters<C> = HashMap<String, Arc<Limiter<C>>>;

#[derive(Debug)]
struct Rules<C: Clock> {
    apis: HashMap<String, ClientLimiters<C>>,
    // stripped root prefixes, in registration order
    root_apis: Vec<String>,
}

/// Registry of API rules and the single admission check callers go through.
///
/// Build one per process and share it behind an `Arc`. Registration takes a write lock
/// over every rule; resolution takes a read lock only long enough to pick the limiter,
/// and the limiter then serializes its own clients.
///
/// ```rust
/// use api_limiter::{ApiConfig, ApiLimiter};
/// use std::time::Duration;
///
/// let limiter = ApiLimiter::new();
/// limiter.register_apis([ApiConfig::with_limits("pay", 1, Duration::from_secs(1), "alice")]);
///
/// assert!(limiter.consume_as("pay", "alice").unwrap());
/// assert!(!limiter.consume_as("pay", "alice").unwrap());
/// assert!(limiter.consume_as("pay", "bob").is_err());
/// ```
#[derive(Debug)]
pub struct ApiLimiter<C = SystemClock>
where
    C: Clock + Clone,
{
    rules: RwLock<Rules<C>>,
    clock: C,
}

impl ApiLimiter<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for ApiLimiter<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ApiLimiter<C>
where
    C: Clock + Clone,
{
    /// Registry whose limiters all read time from `clock`
    pub fn with_clock(clock: C) -> Self {
        Self {
            rules: RwLock::new(Rules {
                apis: HashMap::new(),
                root_apis: Vec::new(),
            }),
            clock,
        }
    }

    /// Register rules, replacing any earlier limiter for the same (API, client) pair.
    ///
    /// The whole batch is applied under one write lock. Root APIs keep their marker in
    /// the stored key and record their prefix once, in registration order.
    pub fn register_apis<I>(&self, configs: I)
    where
        I: IntoIterator<Item = ApiConfig>,
    {
        let mut rules = self.rules.write();

        for config in configs {
            let api = config.api_name().to_owned();
            let client = config.client_name().to_owned();

            if let Some(prefix) = config.root_prefix()
                && !rules.root_apis.iter().any(|known| known == prefix)
            {
                trace!(api = %api, prefix, "recorded root API prefix");
                rules.root_apis.push(prefix.to_owned());
            }

            trace!(
                api = %api,
                client = %client,
                max_calls = config.call_limit(),
                window = ?config.window_length(),
                "registered API limit"
            );

            let limiter = Arc::new(Limiter::new(config, self.clock.clone()));
            let clients = rules.apis.entry(api.clone()).or_default();
            clients.insert(client, limiter);

            if clients.len() > 1 && clients.contains_key(ALL_CLIENTS) {
                trace!(
                    api = %api,
                    "client-specific limits are shadowed by the all-clients limit"
                );
            }
        }
    }

    /// True iff `api_name` was registered under exactly that name.
    /// Root prefixes are not consulted here, and an absent name is never configured.
    pub fn is_api_configured<'a>(&self, api_name: impl Into<Option<&'a str>>) -> bool {
        api_name
            .into()
            .is_some_and(|api_name| self.rules.read().apis.contains_key(api_name))
    }

    /// Registered API names, sorted.
    pub fn configured_api_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rules.read().apis.keys().cloned().collect();
        names.sort();
        names
    }

    /// Recorded root prefixes, in the order they are matched.
    pub fn root_prefixes(&self) -> Vec<String> {
        self.rules.read().root_apis.clone()
    }

    /// Consume one call on behalf of all clients.
    pub fn consume<'a>(&self, api_name: impl Into<Option<&'a str>>) -> Result<bool> {
        self.consume_as(api_name, ALL_CLIENTS)
    }

    /// Consume one call to `api_name` on behalf of `client`.
    ///
    /// `client` is ignored when the API has an all-clients rule. Returns `Ok(false)` when
    /// the call would exceed the rule's limit for the current window. An absent
    /// `api_name` is rejected; the empty string is an ordinary name.
    pub fn consume_as<'a, 'b>(
        &self,
        api_name: impl Into<Option<&'a str>>,
        client: impl Into<Option<&'b str>>,
    ) -> Result<bool> {
        let (limiter, effective_client) = self.resolve_limiter(api_name.into(), client.into())?;
        let allowed = limiter.consume(&effective_client)?;
        trace!(
            api = %limiter.config().api_name(),
            client = %effective_client,
            allowed,
            "admission decision"
        );
        Ok(allowed)
    }

    /// The limiter `consume_as(api_name, client)` would charge.
    pub fn resolve<'a, 'b>(
        &self,
        api_name: impl Into<Option<&'a str>>,
        client: impl Into<Option<&'b str>>,
    ) -> Result<Arc<Limiter<C>>> {
        self.resolve_limiter(api_name.into(), client.into())
            .map(|(limiter, _)| limiter)
    }

    /// Drop expired client windows from every registered limiter.
    /// Returns the total number of client entries removed.
    pub fn cleanup_expired_clients(&self) -> Result<usize> {
        let limiters: Vec<Arc<Limiter<C>>> = self
            .rules
            .read()
            .apis
            .values()
            .flat_map(|clients| clients.values().cloned())
            .collect();

        let mut removed = 0;
        for limiter in limiters {
            removed += limiter.cleanup_expired_clients()?;
        }
        trace!(removed, "cleaned up expired client windows");
        Ok(removed)
    }

    fn resolve_limiter(
        &self,
        api_name: Option<&str>,
        client: Option<&str>,
    ) -> Result<(Arc<Limiter<C>>, String)> {
        let api_name = api_name.ok_or(ApiLimiterError::MissingApiName)?;

        let rules = self.rules.read();

        // first registered prefix wins
        let api_key = rules
            .root_apis
            .iter()
            .find(|prefix| api_name.starts_with(prefix.as_str()))
            .map(|prefix| format!("{prefix}{ROOT_API_MARKER}"))
            .unwrap_or_else(|| api_name.to_owned());

        let clients = rules
            .apis
            .get(&api_key)
            .ok_or_else(|| ApiLimiterError::ApiNotRegistered {
                api: api_key.clone(),
            })?;

        if let Some(limiter) = clients.get(ALL_CLIENTS) {
            return Ok((Arc::clone(limiter), ALL_CLIENTS.to_owned()));
        }

        let client = client.ok_or_else(|| ApiLimiterError::MissingClient {
            api: api_key.clone(),
        })?;

        clients
            .get(client)
            .map(|limiter| (Arc::clone(limiter), client.to_owned()))
            .ok_or_else(|| ApiLimiterError::ClientNotFound {
                client: client.to_owned(),
                api: api_key,
            })
    }
}
