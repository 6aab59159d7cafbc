// src/limiter.rs

// fixed-window call tracking for a single registered rule

// dependencies
use crate::clock::{Clock, SystemClock};
use crate::config::ApiConfig;
use crate::errors::Result;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::trace;

/// Calls recorded for one client in its current fixed window.
///
/// States are never edited in place: every admitted call stores a fresh value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    /// Calls admitted since `window_start`, always at least 1
    pub count: u32,
    /// When the window opened, in clock nanoseconds
    pub window_start: u64,
}

impl WindowState {
    fn opened_at(now: u64) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }

    fn with_one_more_call(self) -> Self {
        Self {
            count: self.count + 1,
            window_start: self.window_start,
        }
    }
}

/// Tracks consumption of one rule across a growing set of clients.
/// C is the clock type, defaulting to SystemClock.
/// Each client's read-check-replace runs under the DashMap entry lock for that client,
/// so calls for one client are linearized while other clients proceed in parallel.
#[derive(Debug)]
pub struct Limiter<C = SystemClock>
where
    C: Clock,
{
    config: ApiConfig,
    window_nanos: u64,
    client_state: DashMap<String, WindowState>,
    clock: C,
}

impl<C> Limiter<C>
where
    C: Clock,
{
    pub fn new(config: ApiConfig, clock: C) -> Self {
        // windows beyond u64 nanoseconds saturate rather than wrap
        let window_nanos = u64::try_from(config.window_length().as_nanos()).unwrap_or(u64::MAX);
        Self {
            config,
            window_nanos,
            client_state: DashMap::new(),
            clock,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Record one call for `client`.
    ///
    /// Returns `Ok(true)` when the call fits in the client's window and `Ok(false)` when
    /// it would exceed the limit. A denied call leaves the window untouched. An expired
    /// window is replaced outright, so even an over-limit client starts over at 1.
    pub fn consume(&self, client: &str) -> Result<bool> {
        let now = self.clock.now()?;

        match self.client_state.entry(client.to_owned()) {
            Entry::Vacant(entry) => {
                entry.insert(WindowState::opened_at(now));
                trace!(api = %self.config.api_name(), client, "opened first window");
                Ok(true)
            }
            Entry::Occupied(mut entry) => {
                let state = *entry.get();
                if self.window_expired(&state, now) {
                    entry.insert(WindowState::opened_at(now));
                    trace!(api = %self.config.api_name(), client, "window expired, reset");
                    Ok(true)
                } else if self.limit_exceeded(&state) {
                    trace!(
                        api = %self.config.api_name(),
                        client,
                        count = state.count,
                        max_calls = self.config.call_limit(),
                        "call limit exceeded"
                    );
                    Ok(false)
                } else {
                    entry.insert(state.with_one_more_call());
                    trace!(
                        api = %self.config.api_name(),
                        client,
                        count = state.count + 1,
                        "call admitted"
                    );
                    Ok(true)
                }
            }
        }
    }

    /// Snapshot of the client's current window, if it has called at all
    pub fn window_state(&self, client: &str) -> Option<WindowState> {
        self.client_state.get(client).map(|entry| *entry.value())
    }

    pub fn tracked_clients(&self) -> usize {
        self.client_state.len()
    }

    /// Drop clients whose window has already expired.
    ///
    /// Their next call would open a fresh window anyway, so no decision changes.
    /// Returns how many clients were removed.
    pub fn cleanup_expired_clients(&self) -> Result<usize> {
        let now = self.clock.now()?;
        let before = self.client_state.len();
        self.client_state
            .retain(|_, state| !self.window_expired(state, now));
        Ok(before.saturating_sub(self.client_state.len()))
    }

    // a clock that stepped backwards reads as zero elapsed time
    fn window_expired(&self, state: &WindowState, now: u64) -> bool {
        now.saturating_sub(state.window_start) > self.window_nanos
    }

    fn limit_exceeded(&self, state: &WindowState) -> bool {
        state.count >= self.config.call_limit()
    }
}
