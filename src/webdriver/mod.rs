//! W3C WebDriver wire layer
//!
//! HTTP/JSON plumbing between the harness and the per-browser WebDriver
//! servers (chromedriver, geckodriver, msedgedriver). The rest of the crate
//! consumes this protocol opaquely through the [`WireClient`] trait; only the
//! endpoints the harness actually uses are implemented.
//!
//! Module structure:
//! - `traits`: the wire transport trait
//! - `types`: wire constants and W3C error-code mapping
//! - `client`: HTTP implementation over reqwest
//! - `process`: WebDriver server process lifecycle
//! - `mock`: mock transport for testing

pub mod traits;
pub mod types;
pub mod client;
pub mod process;
pub mod mock;


pub use traits::{WireClient, WireMethod};
pub use types::{element_id_from, ELEMENT_KEY};

// Re-export implementation structs
pub use client::HttpWireClient;
pub use process::DriverServer;

// Re-export mock for development/testing
pub use mock::MockWireClient;
