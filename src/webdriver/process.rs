//! WebDriver server process lifecycle
//!
//! Spawns the per-browser driver executable on a free local port and waits
//! for its status endpoint to report ready. The child is killed when the
//! handle is dropped, so an abandoned session cannot leak a server process.

use std::net::TcpListener;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{info, warn};

use super::client::HttpWireClient;
use crate::{Error, Result};

/// Handle to one running WebDriver server process
#[derive(Debug)]
pub struct DriverServer {
    child: Child,
    binary: String,
    port: u16,
    endpoint: String,
}

impl DriverServer {
    /// Launch a driver binary and wait until its `/status` reports ready
    pub async fn launch(binary: &str, ready_timeout: Duration) -> Result<Self> {
        let port = free_port()?;
        let endpoint = format!("http://127.0.0.1:{}", port);

        info!("Launching {} on port {}", binary, port);

        let child = Command::new(binary)
            .arg(format!("--port={}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::configuration(format!("Failed to launch driver '{}': {}", binary, e))
            })?;

        let server = Self {
            child,
            binary: binary.to_string(),
            port,
            endpoint,
        };

        let probe = HttpWireClient::new(server.endpoint.clone())?;
        probe.wait_ready(ready_timeout).await?;

        info!("{} ready at {}", server.binary, server.endpoint);
        Ok(server)
    }

    /// Server root URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Port the server listens on
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Terminate the server process
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.child.kill().await {
            warn!("Failed to kill {} on port {}: {}", self.binary, self.port, e);
        }
    }
}

/// Ask the OS for a free loopback port
fn free_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|e| Error::internal(format!("No free local port: {}", e)))?;
    let port = listener
        .local_addr()
        .map_err(|e| Error::internal(format!("No local addr: {}", e)))?
        .port();
    drop(listener);
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_port_is_nonzero() {
        let port = free_port().unwrap();
        assert!(port > 0);
    }

    #[test]
    fn test_free_ports_vary() {
        // Two consecutive requests are allowed to collide in principle, but
        // both must at least be bindable.
        let a = free_port().unwrap();
        let b = free_port().unwrap();
        assert!(a > 0 && b > 0);
    }

    #[tokio::test]
    async fn test_launch_missing_binary_fails() {
        let result =
            DriverServer::launch("definitely-not-a-driver-binary", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
