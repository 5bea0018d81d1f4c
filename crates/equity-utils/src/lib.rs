//! Shared utilities for equity-research
//!
//! Currently this is the tracing setup shared by the binary and any
//! ad-hoc tooling built on top of `equity-valuation`.

pub mod logging;

pub use logging::{init_tracing, init_tracing_with_default};
