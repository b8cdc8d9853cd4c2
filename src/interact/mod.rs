//! Resilient UI interaction layer
//!
//! Stateless-per-call operations over one session, each with bounded local
//! retry against the browser's timing non-determinism: elements not yet
//! rendered, stale after a DOM mutation, or obscured by overlays.
//!
//! Module structure:
//! - `retry`: the bounded-retry combinator with transience filtering
//! - `engine`: scroll / click / script-click / wait primitives
//! - `consent`: best-effort cookie banner dismissal

pub mod retry;
pub mod engine;
pub mod consent;


pub use consent::ConsentDismisser;
pub use engine::{InteractionEngine, InteractionTarget, WaitSettings};
pub use retry::with_retries;
