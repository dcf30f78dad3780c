//! HTTP relay outlet client.
//!
//! Drives outlets that expose a relay endpoint of the form
//! `GET http://<address>/relay/0?turn=on|off`, optionally protected by HTTP
//! basic authentication.
//!
//! # Example Usage
//!
//! ```no_run
//! use cardplug_hardware::adapters::{HttpOutlet, HttpOutletConfig};
//! use cardplug_hardware::traits::OutletDevice;
//! use std::time::Duration;
//!
//! # async fn example() -> cardplug_hardware::Result<()> {
//! let mut outlet = HttpOutlet::new(HttpOutletConfig {
//!     address: "192.168.1.50".to_string(),
//!     username: Some("admin".to_string()),
//!     password: Some("secret".to_string()),
//!     timeout: Duration::from_secs(5),
//! })?;
//!
//! outlet.on().await?;
//! outlet.off().await?;
//! # Ok(())
//! # }
//! ```

use crate::{
    HardwareError, Result,
    traits::OutletDevice,
    types::OutletCommand,
};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Relay channel switched by the client.
const RELAY_PATH: &str = "relay/0";

/// Connection settings for [`HttpOutlet`].
#[derive(Clone)]
pub struct HttpOutletConfig {
    /// Host, host:port, or full base URL of the outlet.
    pub address: String,

    pub username: Option<String>,

    pub password: Option<String>,

    /// Transport-level timeout applied to each request.
    pub timeout: Duration,
}

impl std::fmt::Debug for HttpOutletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpOutletConfig")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Outlet reachable over HTTP.
#[derive(Debug)]
pub struct HttpOutlet {
    client: reqwest::Client,
    relay_url: String,
    username: Option<String>,
    password: Option<String>,
    timeout: Duration,
}

impl HttpOutlet {
    /// Build the client. No request is sent until the first command.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InitializationFailed` if the HTTP client
    /// cannot be constructed.
    pub fn new(config: HttpOutletConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| HardwareError::initialization_failed(e.to_string()))?;

        let base = config.address.trim().trim_end_matches('/');
        let relay_url = if base.starts_with("http://") || base.starts_with("https://") {
            format!("{base}/{RELAY_PATH}")
        } else {
            format!("http://{base}/{RELAY_PATH}")
        };

        debug!(url = %relay_url, "Creating HTTP outlet client");

        Ok(Self {
            client,
            relay_url,
            username: config.username,
            password: config.password,
            timeout: config.timeout,
        })
    }

    /// URL the relay commands are sent to.
    pub fn relay_url(&self) -> &str {
        &self.relay_url
    }

    async fn send(&self, command: OutletCommand) -> Result<()> {
        trace!(url = %self.relay_url, %command, "Sending outlet command");

        let mut request = self
            .client
            .get(&self.relay_url)
            .query(&[("turn", command.as_str())]);

        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                HardwareError::timeout(self.timeout.as_millis() as u64)
            } else if e.is_connect() {
                HardwareError::disconnected(format!("{}: {e}", self.relay_url))
            } else {
                HardwareError::communication(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%command, %status, "Outlet rejected command");
            return Err(HardwareError::communication(format!(
                "outlet answered {status} to {command}"
            )));
        }

        trace!(%command, "Outlet command acknowledged");
        Ok(())
    }
}

impl OutletDevice for HttpOutlet {
    async fn on(&mut self) -> Result<()> {
        self.send(OutletCommand::On).await
    }

    async fn off(&mut self) -> Result<()> {
        self.send(OutletCommand::Off).await
    }

    async fn close(&mut self) -> Result<()> {
        // reqwest releases pooled connections when the client is dropped.
        debug!(url = %self.relay_url, "Closing HTTP outlet client");
        Ok(())
    }
}
