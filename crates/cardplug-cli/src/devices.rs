//! Device construction from configuration.

use anyhow::{Context, Result};
use cardplug_core::CardId;
use cardplug_core::config::{IndicatorConfig, OutletConfig, ReaderConfig, ReaderDriver};
use cardplug_hardware::adapters::{HttpOutlet, HttpOutletConfig, SysfsLed};
use cardplug_hardware::mock::{MockCardReader, MockCardReaderHandle};
use cardplug_hardware::{AnyCardReader, AnyIndicator, AnyOutlet};
use std::io::BufRead;
use tokio::runtime::Handle;
use tracing::{info, warn};

/// Open the configured card reader.
///
/// With the `mock` driver, card identifiers typed on standard input (one hex
/// id per line) are presented to the reader.
///
/// # Errors
///
/// Fails if no reader hardware is present, or if the PC/SC driver is selected
/// in a build without the `hardware-pcsc` feature.
pub async fn reader(config: &ReaderConfig) -> Result<AnyCardReader> {
    match config.driver {
        ReaderDriver::Mock => {
            let (reader, handle) = MockCardReader::with_name("stdin".to_string());
            let runtime = Handle::current();

            // A plain thread: blocking stdin reads must not hold up runtime shutdown.
            std::thread::Builder::new()
                .name("stdin-cards".to_string())
                .spawn(move || {
                    feed_lines(std::io::stdin().lock(), &handle, &runtime);
                    info!("Standard input closed, no more cards will be presented");
                    loop {
                        std::thread::park();
                    }
                })
                .context("cannot start stdin reader thread")?;

            info!("Using mock card reader fed from standard input");
            Ok(AnyCardReader::Mock(reader))
        }
        ReaderDriver::Pcsc => pcsc_reader(config).await,
    }
}

#[cfg(feature = "hardware-pcsc")]
async fn pcsc_reader(config: &ReaderConfig) -> Result<AnyCardReader> {
    use cardplug_hardware::CardReader;

    let reader = cardplug_hardware::adapters::PcscReader::open(config.name.as_deref())
        .context("no usable card reader")?;
    let info = reader.get_info().await?;
    info!(reader = %info.name, "Card reader ready");

    Ok(AnyCardReader::Pcsc(reader))
}

#[cfg(not(feature = "hardware-pcsc"))]
async fn pcsc_reader(_config: &ReaderConfig) -> Result<AnyCardReader> {
    anyhow::bail!(
        "reader.driver = \"pcsc\" requires a build with the `hardware-pcsc` feature"
    )
}

/// Build the outlet client. No request is sent yet.
pub fn outlet(config: &OutletConfig) -> Result<AnyOutlet> {
    let outlet = HttpOutlet::new(HttpOutletConfig {
        address: config.address.clone(),
        username: config.username.clone(),
        password: config.password.clone(),
        timeout: config.timeout,
    })
    .context("cannot create outlet client")?;

    info!(url = %outlet.relay_url(), "Outlet client ready");
    Ok(AnyOutlet::Http(outlet))
}

/// Open the status LED, or a no-op indicator when none is configured.
pub async fn indicator(config: &IndicatorConfig) -> AnyIndicator {
    match &config.led_path {
        Some(path) => {
            info!(path = %path.display(), "Using sysfs LED indicator");
            AnyIndicator::Sysfs(SysfsLed::open(path).await)
        }
        None => {
            info!("No indicator configured");
            AnyIndicator::Disabled
        }
    }
}

/// Present every valid hex id read from `input` to the mock reader.
///
/// Returns at end of input or once the reader is gone.
fn feed_lines<B: BufRead>(input: B, handle: &MockCardReaderHandle, runtime: &Handle) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to read standard input");
                return;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match CardId::parse(&line) {
            Ok(card) => {
                let uid = decode_hex(card.as_str());
                if runtime.block_on(handle.present_card(uid)).is_err() {
                    return;
                }
            }
            Err(e) => warn!(input = %line.trim(), error = %e, "Not a card identifier"),
        }
    }
}

/// Decode a normalized (even-length, lowercase) hex string.
fn decode_hex(hex: &str) -> Vec<u8> {
    hex.as_bytes()
        .chunks(2)
        .filter_map(|pair| std::str::from_utf8(pair).ok())
        .filter_map(|pair| u8::from_str_radix(pair, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardplug_hardware::CardReader;
    use std::path::PathBuf;

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("aa11bb22"), vec![0xAA, 0x11, 0xBB, 0x22]);
        assert!(decode_hex("").is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_feed_lines_presents_valid_ids() {
        let (mut reader, handle) = MockCardReader::new();
        let runtime = Handle::current();

        // Returning the handle keeps the reader's channel open
        let _handle = tokio::task::spawn_blocking(move || {
            let input = std::io::Cursor::new("aa11bb22\n\nnot-a-card\nCC33DD44\n");
            feed_lines(input, &handle, &runtime);
            handle
        })
        .await
        .unwrap();

        assert_eq!(
            reader.poll().await.unwrap(),
            Some(vec![0xAA, 0x11, 0xBB, 0x22])
        );
        assert_eq!(
            reader.poll().await.unwrap(),
            Some(vec![0xCC, 0x33, 0xDD, 0x44])
        );
        assert_eq!(reader.poll().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_no_led_path_disables_indicator() {
        let indicator = indicator(&IndicatorConfig { led_path: None }).await;
        assert!(matches!(indicator, AnyIndicator::Disabled));
    }

    #[tokio::test]
    async fn test_led_path_opens_sysfs_led() {
        let dir = tempfile::tempdir().unwrap();
        let config = IndicatorConfig {
            led_path: Some(PathBuf::from(dir.path())),
        };

        assert!(matches!(indicator(&config).await, AnyIndicator::Sysfs(_)));
    }

    #[tokio::test]
    async fn test_outlet_from_config() {
        let config = cardplug_core::Config::parse(
            r#"
            [outlet]
            address = "192.168.1.50"
            on_time_secs = 3

            [access]
            master_cards = ["ffff0001"]
            "#,
        )
        .unwrap();

        let outlet = outlet(&config.outlet).unwrap();
        assert!(matches!(outlet, AnyOutlet::Http(_)));
    }

    #[cfg(not(feature = "hardware-pcsc"))]
    #[tokio::test]
    async fn test_pcsc_without_feature_is_fatal() {
        let config = ReaderConfig {
            driver: ReaderDriver::Pcsc,
            name: None,
        };
        assert!(reader(&config).await.is_err());
    }
}
