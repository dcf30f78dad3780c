//! Hardware device abstraction layer for the cardplug access controller.
//!
//! This crate provides trait-based abstractions for the peripherals the
//! controller talks to: a proximity card reader, a remotely switchable power
//! outlet, and a status indicator LED. The traits allow substitution between
//! mock implementations (for development and testing) and real adapters.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations use native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Enum dispatch**: Runtime selection goes through the wrappers in
//!   [`devices`] instead of trait objects.
//! - **Thread-safe**: All traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: All operations return [`Result<T>`][error::Result].
//!
//! # Device Traits
//!
//! ## Card Readers
//!
//! [`CardReader`] polls the reader field once and returns the raw UID of a
//! newly presented card:
//!
//! ```no_run
//! use cardplug_hardware::traits::CardReader;
//! use cardplug_hardware::error::Result;
//!
//! async fn scan_once<R: CardReader>(reader: &mut R) -> Result<Option<String>> {
//!     let uid = reader.poll().await?;
//!     Ok(uid.map(|bytes| bytes.iter().map(|b| format!("{b:02x}")).collect()))
//! }
//! ```
//!
//! ## Outlets
//!
//! [`OutletDevice`] accepts `on`/`off` commands. Callers bound each command
//! with their own timeout.
//!
//! ## Indicators
//!
//! [`IndicatorDevice`] shows an [`IndicatorPattern`]. Flashing is
//! fire-and-forget and failures are meant to be logged, never acted upon.
//!
//! # Adapters
//!
//! - [`adapters::HttpOutlet`]: HTTP relay endpoint (`/relay/0?turn=on|off`)
//! - [`adapters::SysfsLed`]: Linux LED class device
//! - `adapters::PcscReader`: PC/SC reader (feature `hardware-pcsc`)
//!
//! [`CardReader`]: traits::CardReader
//! [`OutletDevice`]: traits::OutletDevice
//! [`IndicatorDevice`]: traits::IndicatorDevice

pub mod adapters;
pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyCardReader, AnyIndicator, AnyOutlet};
pub use error::{HardwareError, Result};
pub use traits::{CardReader, IndicatorDevice, OutletDevice};
pub use types::{DeviceInfo, IndicatorPattern, OutletCommand};
