//! Test harness
//!
//! Case registration, per-case session lifecycle, whole-test retries, and
//! failure diagnostics.
//!
//! Module structure:
//! - `case`: test cases and their execution context
//! - `retry`: the per-case retry state machine
//! - `runner`: suite execution and reporting
//! - `diagnostics`: failure snapshot capture

pub mod case;
pub mod retry;
pub mod runner;
pub mod diagnostics;

#[cfg(test)]
mod tests;

pub use case::{require, TestCase, TestContext};
pub use diagnostics::capture_failure_snapshot;
pub use retry::{RetryDecision, RetryPolicy, RetryState};
pub use runner::{AttemptReport, CaseReport, Runner, SuiteReport};
