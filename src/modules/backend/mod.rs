//! Backend integration: HTTP client, response envelopes, request cache and
//! rate limiter.

mod client;
mod envelope;
mod rate_limiter;
mod request_cache;

pub use client::{BackendAuth, BackendClient, BackendError};
pub use envelope::{decode_list, decode_payload, Envelope};
pub use rate_limiter::RateLimiter;
pub use request_cache::RequestCache;
