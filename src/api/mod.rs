//! Graph API access layer
//!
//! Everything the engine sends over the wire goes through [`GraphClient`],
//! which layers retry, backoff and client-side rate limiting over a pluggable
//! transport.

pub mod client;
pub mod constants;
pub mod error;
pub mod resilience;

pub use client::{GraphClient, GraphRequest, GraphTransport, HttpTransport, Method};
pub use error::RemoteError;
pub use resilience::{
    RateLimitConfig, RateLimiter, RateLimiterStats, ResilienceConfig, RetryConfig, RetryPolicy,
};
