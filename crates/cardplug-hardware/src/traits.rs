//! Hardware device trait definitions.
//!
//! This module defines the contracts between the access controller and its
//! peripherals: the card reader that produces raw identifiers, the outlet
//! that accepts on/off commands, and the indicator that shows feedback
//! patterns. Mock and real implementations can be swapped freely.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{DeviceInfo, IndicatorPattern};

/// Proximity card reader abstraction.
///
/// # Object Safety and Dynamic Dispatch
///
/// This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic parameters, or the enum wrappers from the
/// [`devices`](crate::devices) module when the concrete reader is chosen at
/// runtime.
///
/// # Examples
///
/// ```no_run
/// use cardplug_hardware::traits::CardReader;
/// use cardplug_hardware::error::Result;
///
/// async fn wait_for_card<R: CardReader>(reader: &mut R) -> Result<Vec<u8>> {
///     loop {
///         if let Some(uid) = reader.poll().await? {
///             return Ok(uid);
///         }
///         tokio::time::sleep(std::time::Duration::from_millis(500)).await;
///     }
/// }
/// ```
pub trait CardReader: Send + Sync {
    /// Check the reader field once.
    ///
    /// Returns the raw UID of a newly presented card, or `None` when no card
    /// is present. This method does not wait for a card to arrive.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The reader is disconnected
    /// - A communication error occurs
    /// - The card answered with malformed data
    async fn poll(&mut self) -> Result<Option<Vec<u8>>>;

    /// Get reader information.
    async fn get_info(&self) -> Result<DeviceInfo>;

    /// Release the reader.
    async fn close(&mut self) -> Result<()>;
}

/// Remotely switchable power outlet.
///
/// Implementations perform a single transport round trip per call. The
/// access controller bounds each call with its own timeout, so adapters do
/// not need to retry.
pub trait OutletDevice: Send + Sync {
    /// Switch the outlet on.
    ///
    /// # Errors
    ///
    /// Returns an error if the outlet cannot be reached or rejects the
    /// command.
    async fn on(&mut self) -> Result<()>;

    /// Switch the outlet off.
    ///
    /// # Errors
    ///
    /// Returns an error if the outlet cannot be reached or rejects the
    /// command.
    async fn off(&mut self) -> Result<()>;

    /// Release the client handle.
    async fn close(&mut self) -> Result<()>;
}

/// Status indicator (typically a single LED).
///
/// `flash` is fire-and-forget: implementations start the pattern and return
/// without waiting for it to finish. A new request replaces any pattern still
/// running.
pub trait IndicatorDevice: Send + Sync {
    /// Start flashing a pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the indicator hardware is missing. Callers are
    /// expected to log and ignore such errors.
    async fn flash(&mut self, pattern: IndicatorPattern, repeat: u8, interval_ms: u64)
    -> Result<()>;

    /// Stop any running pattern and switch the indicator off.
    async fn close(&mut self) -> Result<()>;
}
