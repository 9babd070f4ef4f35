//! Admission control ports and application service.
//!
//! Requests are counted per client key over a trailing window. The counting
//! state lives behind [`RateLimitRepository`] so that the service itself holds
//! no shared mutable data.

mod config;
mod ports;
mod service;

#[cfg(test)]
mod tests;

pub use config::RateLimitRule;
pub use ports::{RateLimitDecision, RateLimitRepository};
pub use service::RateLimitService;
