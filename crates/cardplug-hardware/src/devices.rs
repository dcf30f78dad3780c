//! Enum wrappers for hardware device dispatch.
//!
//! Native `async fn` in traits (RPITIT) is not object-safe, so devices chosen
//! at runtime are wrapped in enums that forward each call to the concrete
//! implementation. Hardware variants are gated behind their cargo features.
//!
//! # Examples
//!
//! ```
//! use cardplug_hardware::devices::AnyOutlet;
//! use cardplug_hardware::mock::MockOutlet;
//!
//! let (outlet, _handle) = MockOutlet::new();
//! let any_outlet = AnyOutlet::Mock(outlet);
//! ```

use crate::adapters::{HttpOutlet, SysfsLed};
#[cfg(feature = "hardware-pcsc")]
use crate::adapters::PcscReader;
use crate::mock::{MockCardReader, MockIndicator, MockOutlet};
use crate::traits::{CardReader, IndicatorDevice, OutletDevice};
use crate::{DeviceInfo, IndicatorPattern, Result};

/// Enum wrapper for card reader dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyCardReader {
    /// Mock reader for development and testing.
    Mock(MockCardReader),

    /// PC/SC contactless reader.
    #[cfg(feature = "hardware-pcsc")]
    Pcsc(PcscReader),
}

impl CardReader for AnyCardReader {
    async fn poll(&mut self) -> Result<Option<Vec<u8>>> {
        match self {
            Self::Mock(device) => device.poll().await,
            #[cfg(feature = "hardware-pcsc")]
            Self::Pcsc(device) => device.poll().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
            #[cfg(feature = "hardware-pcsc")]
            Self::Pcsc(device) => device.get_info().await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.close().await,
            #[cfg(feature = "hardware-pcsc")]
            Self::Pcsc(device) => device.close().await,
        }
    }
}

/// Enum wrapper for outlet dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyOutlet {
    /// Mock outlet for development and testing.
    Mock(MockOutlet),

    /// HTTP relay outlet.
    Http(HttpOutlet),
}

impl OutletDevice for AnyOutlet {
    async fn on(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.on().await,
            Self::Http(device) => device.on().await,
        }
    }

    async fn off(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.off().await,
            Self::Http(device) => device.off().await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.close().await,
            Self::Http(device) => device.close().await,
        }
    }
}

/// Enum wrapper for indicator dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyIndicator {
    /// Mock indicator for development and testing.
    Mock(MockIndicator),

    /// Linux LED class device.
    Sysfs(SysfsLed),

    /// No indicator configured; requests are discarded.
    Disabled,
}

impl IndicatorDevice for AnyIndicator {
    async fn flash(
        &mut self,
        pattern: IndicatorPattern,
        repeat: u8,
        interval_ms: u64,
    ) -> Result<()> {
        match self {
            Self::Mock(device) => device.flash(pattern, repeat, interval_ms).await,
            Self::Sysfs(device) => device.flash(pattern, repeat, interval_ms).await,
            Self::Disabled => Ok(()),
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.close().await,
            Self::Sysfs(device) => device.close().await,
            Self::Disabled => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockFailure;
    use crate::types::OutletCommand;

    #[tokio::test]
    async fn test_any_reader_forwards_to_mock() {
        let (reader, handle) = MockCardReader::new();
        let mut any_reader = AnyCardReader::Mock(reader);

        handle.present_card(vec![0xCC, 0x33, 0xDD, 0x44]).await.unwrap();
        assert_eq!(
            any_reader.poll().await.unwrap(),
            Some(vec![0xCC, 0x33, 0xDD, 0x44])
        );
        assert_eq!(any_reader.get_info().await.unwrap().model, "mock");
    }

    #[tokio::test]
    async fn test_any_outlet_forwards_to_mock() {
        let (outlet, handle) = MockOutlet::new();
        let mut any_outlet = AnyOutlet::Mock(outlet);

        handle.fail(OutletCommand::Off, MockFailure::Error);
        any_outlet.on().await.unwrap();
        assert!(any_outlet.off().await.is_err());
        assert_eq!(handle.commands(), vec![OutletCommand::On, OutletCommand::Off]);
    }

    #[tokio::test]
    async fn test_disabled_indicator_accepts_everything() {
        let mut indicator = AnyIndicator::Disabled;
        indicator
            .flash(IndicatorPattern::Fault, 10, 50)
            .await
            .unwrap();
        indicator.close().await.unwrap();
    }
}
