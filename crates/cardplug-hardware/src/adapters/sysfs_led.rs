//! Status LED driven through the Linux LED class interface.
//!
//! The LED is controlled by writing to `<led_path>/brightness`. On open the
//! kernel trigger is set to `none` so nothing else drives the LED while the
//! controller owns it.

use crate::{
    HardwareError, Result,
    traits::IndicatorDevice,
    types::IndicatorPattern,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// LED under `/sys/class/leds/<name>`.
#[derive(Debug)]
pub struct SysfsLed {
    led_path: PathBuf,
    brightness: PathBuf,

    /// Pattern currently blinking, if any.
    running: Option<Blink>,
}

/// Spawned blink task and its stop signal.
///
/// The task only checks the signal between writes, so once it has stopped
/// no write of its own can land on `brightness` afterwards. Dropping the
/// sender stops it as well.
#[derive(Debug)]
struct Blink {
    task: JoinHandle<()>,
    stop: oneshot::Sender<()>,
}

impl SysfsLed {
    /// Take control of the LED at `led_path`.
    ///
    /// A missing directory is not an error here; it is reported on each
    /// `flash()` so the controller can log it without stopping.
    pub async fn open(led_path: impl Into<PathBuf>) -> Self {
        let led_path = led_path.into();
        let brightness = led_path.join("brightness");

        let trigger = led_path.join("trigger");
        if let Err(e) = tokio::fs::write(&trigger, "none").await {
            warn!(path = %trigger.display(), error = %e, "Could not disable LED trigger");
        }

        Self {
            led_path,
            brightness,
            running: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.led_path
    }

    /// Stop the running pattern and wait until its task has exited.
    async fn stop_running(&mut self) {
        if let Some(Blink { task, stop }) = self.running.take() {
            let _ = stop.send(());
            if let Err(e) = task.await {
                warn!(error = %e, "LED blink task ended abnormally");
            }
        }
    }

    async fn blink(
        brightness: PathBuf,
        repeat: u8,
        interval: Duration,
        mut stop: oneshot::Receiver<()>,
    ) {
        for _ in 0..repeat {
            for level in ["1", "0"] {
                if let Err(e) = tokio::fs::write(&brightness, level).await {
                    warn!(path = %brightness.display(), error = %e, "LED write failed");
                    return;
                }

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = &mut stop => return,
                }
            }
        }
    }
}

impl IndicatorDevice for SysfsLed {
    async fn flash(
        &mut self,
        pattern: IndicatorPattern,
        repeat: u8,
        interval_ms: u64,
    ) -> Result<()> {
        if !tokio::fs::try_exists(&self.brightness).await.unwrap_or(false) {
            return Err(HardwareError::disconnected(
                self.brightness.display().to_string(),
            ));
        }

        self.stop_running().await;

        debug!(%pattern, repeat, interval_ms, "Flashing LED");
        let (stop, stop_rx) = oneshot::channel();
        let task = tokio::spawn(Self::blink(
            self.brightness.clone(),
            repeat,
            Duration::from_millis(interval_ms),
            stop_rx,
        ));
        self.running = Some(Blink { task, stop });

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.stop_running().await;

        if tokio::fs::try_exists(&self.brightness).await.unwrap_or(false) {
            tokio::fs::write(&self.brightness, "0").await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_brightness(dir: &Path) -> String {
        tokio::fs::read_to_string(dir.join("brightness"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_disables_trigger() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("trigger"), "mmc0").await.unwrap();
        tokio::fs::write(dir.path().join("brightness"), "0").await.unwrap();

        let led = SysfsLed::open(dir.path()).await;
        assert_eq!(led.path(), dir.path());

        let trigger = tokio::fs::read_to_string(dir.path().join("trigger"))
            .await
            .unwrap();
        assert_eq!(trigger, "none");
    }

    #[tokio::test]
    async fn test_flash_missing_led_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut led = SysfsLed::open(dir.path().join("led0")).await;

        let result = led.flash(IndicatorPattern::Granted, 1, 10).await;
        assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
    }

    #[tokio::test]
    async fn test_flash_ends_with_led_off() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("brightness"), "0").await.unwrap();

        let mut led = SysfsLed::open(dir.path()).await;
        led.flash(IndicatorPattern::Denied, 2, 5).await.unwrap();

        if let Some(blink) = led.running.take() {
            blink.task.await.unwrap();
        }
        assert_eq!(read_brightness(dir.path()).await, "0");
    }

    #[tokio::test]
    async fn test_close_turns_led_off() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("brightness"), "1").await.unwrap();

        let mut led = SysfsLed::open(dir.path()).await;
        led.flash(IndicatorPattern::Fault, 200, 1000).await.unwrap();
        led.close().await.unwrap();

        assert!(led.running.is_none());
        assert_eq!(read_brightness(dir.path()).await, "0");
    }

    #[tokio::test]
    async fn test_close_waits_for_blink_task() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("brightness"), "0").await.unwrap();

        let mut led = SysfsLed::open(dir.path()).await;
        led.flash(IndicatorPattern::Fault, 200, 1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        led.close().await.unwrap();

        // Nothing from the stopped pattern may land after close
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(read_brightness(dir.path()).await, "0");
    }

    #[tokio::test]
    async fn test_new_flash_replaces_running_pattern() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("brightness"), "0").await.unwrap();

        let mut led = SysfsLed::open(dir.path()).await;
        led.flash(IndicatorPattern::Heartbeat, 200, 1000).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(read_brightness(dir.path()).await, "1");

        led.flash(IndicatorPattern::Granted, 1, 5).await.unwrap();
        if let Some(blink) = led.running.take() {
            blink.task.await.unwrap();
        }
        assert_eq!(read_brightness(dir.path()).await, "0");
    }
}
