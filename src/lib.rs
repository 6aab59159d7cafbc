// src/lib.rs

//! # API Limiter
//!
//! An in-process admission gate that caps how many calls a client may make to a named
//! API within a fixed window.
//!
//! Rules are registered per (API, client) pair. A client of [`ALL_CLIENTS`] shares one
//! counter across every caller of that API, and an API name ending in
//! [`ROOT_API_MARKER`] covers every API name starting with the same prefix.
//!
//! ## Quick Example
//!
//! ```rust
//! use api_limiter::{ApiConfig, ApiLimiter};
//! use std::time::Duration;
//!
//! let limiter = ApiLimiter::new();
//! limiter.register_apis([ApiConfig::with_limits("orders*", 2, Duration::from_secs(1), "*")]);
//!
//! assert!(limiter.consume("orders/123").unwrap());
//! assert!(limiter.consume("orders/456").unwrap());
//! assert!(!limiter.consume("orders/789").unwrap());
//! ```

// private modules
mod clock;
mod config;
mod errors;
mod limiter;
mod registry;

// public API exports
pub use clock::{Clock, ClockError, SystemClock};
pub use config::{ALL_CLIENTS, ApiConfig, DEFAULT_MAX_CALLS, DEFAULT_WINDOW, ROOT_API_MARKER};
pub use errors::{ApiLimiterError, ErrorKind, Result};
pub use limiter::{Limiter, WindowState};
pub use registry::ApiLimiter;
