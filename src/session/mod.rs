//! Session management
//!
//! One browser session per worker for the lifetime of one test attempt:
//! created lazily on first access, never shared, torn down at test teardown.
//!
//! Module structure:
//! - `traits`: the session and element abstractions
//! - `remote`: WebDriver-backed implementation
//! - `factory`: launches driver servers and opens sessions
//! - `registry`: worker-keyed session ownership
//! - `mock`: scriptable implementation for testing

pub mod traits;
pub mod remote;
pub mod factory;
pub mod registry;
pub mod mock;

#[cfg(test)]
mod tests;

pub use traits::{keys, BrowserKind, ElementHandle, Locator, Session};

// Re-export implementation structs
pub use factory::SessionFactory;
pub use registry::{SessionRegistry, WorkerId};
pub use remote::{RemoteElement, RemoteSession};

// Re-export mock for development/testing
pub use mock::{MockElement, MockSession, TransientKind};
