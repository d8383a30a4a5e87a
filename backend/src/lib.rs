//! Hangout consensus and meetup location recommendation library.
//!
//! [`domain`] holds the lifecycle rules and the location pipeline behind
//! ports; [`outbound`] adapts those ports to PostgreSQL and the HTTP
//! providers; [`config`] loads runtime settings.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
