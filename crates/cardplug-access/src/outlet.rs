//! Timeout-bounded command surface over an [`OutletDevice`].
//!
//! Every command resolves to an [`OutletResult`] within the configured
//! budget. Device errors and hangs become [`OutletFault`] values that the
//! controller handles locally.

use cardplug_hardware::{HardwareError, OutletCommand, OutletDevice};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

/// Why an outlet command did not take effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutletFault {
    /// Transport failure or an error answer from the outlet
    #[error("Outlet unavailable: {reason}")]
    DeviceUnavailable { reason: String },

    /// No answer within the command budget
    #[error("Outlet command timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

impl From<HardwareError> for OutletFault {
    fn from(err: HardwareError) -> Self {
        match err {
            HardwareError::Timeout { duration_ms } => Self::Timeout { duration_ms },
            other => Self::DeviceUnavailable {
                reason: other.to_string(),
            },
        }
    }
}

/// Result of a single outlet command.
pub type OutletResult = Result<(), OutletFault>;

/// Outlet whose commands are each bounded by `timeout`.
#[derive(Debug)]
pub struct OutletController<O> {
    device: O,
    timeout: Duration,
}

impl<O: OutletDevice> OutletController<O> {
    pub fn new(device: O, timeout: Duration) -> Self {
        Self { device, timeout }
    }

    pub async fn on(&mut self) -> OutletResult {
        self.send(OutletCommand::On).await
    }

    pub async fn off(&mut self) -> OutletResult {
        self.send(OutletCommand::Off).await
    }

    /// Release the underlying device.
    pub async fn close(&mut self) -> cardplug_hardware::Result<()> {
        self.device.close().await
    }

    async fn send(&mut self, command: OutletCommand) -> OutletResult {
        trace!(%command, timeout_ms = self.timeout.as_millis() as u64, "Outlet command");

        let outcome = match command {
            OutletCommand::On => tokio::time::timeout(self.timeout, self.device.on()).await,
            OutletCommand::Off => tokio::time::timeout(self.timeout, self.device.off()).await,
        };

        match outcome {
            Ok(Ok(())) => {
                debug!(%command, "Outlet command acknowledged");
                Ok(())
            }
            Ok(Err(e)) => Err(OutletFault::from(e)),
            Err(_) => Err(OutletFault::Timeout {
                duration_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}
