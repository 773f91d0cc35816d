//! Core types and trait definitions for the VALIS lifecycle core.
//!
//! This crate is deliberately free of HTTP and database dependencies. It holds
//! the typed records every other crate exchanges, the [`store::VitalStore`]
//! abstraction, and the pure scoring and clamping rules.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod agent;
pub mod cognition;
pub mod error;
pub mod legacy;
pub mod lineage;
pub mod mortality;
pub mod personality;
pub mod stats;
pub mod store;

use chrono::{DateTime, SubsecRound as _, Utc};
pub use error::{Error, Result};

/// The current time, truncated to the microsecond precision records are
/// stored at so a returned value equals its later read.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

#[cfg(test)]
mod tests {
  use chrono::Timelike as _;

  #[test]
  fn now_has_whole_microseconds() {
    assert_eq!(super::now().nanosecond() % 1_000, 0);
  }
}
