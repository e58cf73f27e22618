//! Application-level configuration.
//!
//! - [`DispatchConfig`] - engine parameters (model, window, cache TTL, time bounds)
//! - [`RateLimitConfig`] - fixed-window limiter parameters

pub mod dispatch_config;

pub use dispatch_config::{DispatchConfig, RateLimitConfig, RateLimitScope};
