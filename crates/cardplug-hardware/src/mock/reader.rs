//! Mock card reader implementation for testing and development.
//!
//! This module provides a simulated reader whose field is fed
//! programmatically through a [`MockCardReaderHandle`].

use crate::{
    HardwareError, Result,
    traits::CardReader,
    types::DeviceInfo,
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Mock card reader for testing and development.
///
/// Each presented card is reported by exactly one `poll()` call, in the order
/// it was presented. Polls with nothing queued report no card.
///
/// # Examples
///
/// ```
/// use cardplug_hardware::mock::MockCardReader;
/// use cardplug_hardware::traits::CardReader;
///
/// #[tokio::main]
/// async fn main() -> cardplug_hardware::Result<()> {
///     let (mut reader, handle) = MockCardReader::new();
///
///     handle.present_card(vec![0xAA, 0x11, 0xBB, 0x22]).await?;
///
///     assert_eq!(reader.poll().await?, Some(vec![0xAA, 0x11, 0xBB, 0x22]));
///     assert_eq!(reader.poll().await?, None);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockCardReader {
    /// Channel receiver for field events
    event_rx: mpsc::Receiver<ReaderEvent>,

    /// Device name
    name: String,

    closed: bool,
}

impl MockCardReader {
    /// Create a new mock reader with the default name.
    ///
    /// Returns a tuple of (MockCardReader, MockCardReaderHandle) where the
    /// handle can be used to simulate card presentations.
    pub fn new() -> (Self, MockCardReaderHandle) {
        Self::with_name("Mock Card Reader".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockCardReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);

        let reader = Self {
            event_rx,
            name,
            closed: false,
        };

        (reader, MockCardReaderHandle { event_tx })
    }

    /// Returns `true` once `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl CardReader for MockCardReader {
    async fn poll(&mut self) -> Result<Option<Vec<u8>>> {
        if self.closed {
            return Err(HardwareError::disconnected(self.name.clone()));
        }

        match self.event_rx.try_recv() {
            Ok(ReaderEvent::CardPresented(uid)) => Ok(Some(uid)),
            Ok(ReaderEvent::Failure(message)) => Err(HardwareError::communication(message)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(HardwareError::disconnected("reader event channel closed"))
            }
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "mock"))
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.event_rx.close();
        Ok(())
    }
}

/// Internal event type for mock reader.
#[derive(Debug, Clone)]
enum ReaderEvent {
    CardPresented(Vec<u8>),
    Failure(String),
}

/// Handle for feeding a mock reader.
#[derive(Debug, Clone)]
pub struct MockCardReaderHandle {
    event_tx: mpsc::Sender<ReaderEvent>,
}

impl MockCardReaderHandle {
    /// Present a card to the reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped or closed.
    pub async fn present_card(&self, uid: Vec<u8>) -> Result<()> {
        self.send(ReaderEvent::CardPresented(uid)).await
    }

    /// Make the next poll fail with a communication error.
    pub async fn inject_failure(&self, message: impl Into<String>) -> Result<()> {
        self.send(ReaderEvent::Failure(message.into())).await
    }

    async fn send(&self, event: ReaderEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("reader event channel closed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_reader_reports_each_card_once() {
        let (mut reader, handle) = MockCardReader::new();

        handle.present_card(vec![0x01, 0x02, 0x03, 0x04]).await.unwrap();
        handle.present_card(vec![0x05, 0x06, 0x07, 0x08]).await.unwrap();

        assert_eq!(
            reader.poll().await.unwrap(),
            Some(vec![0x01, 0x02, 0x03, 0x04])
        );
        assert_eq!(
            reader.poll().await.unwrap(),
            Some(vec![0x05, 0x06, 0x07, 0x08])
        );
        assert_eq!(reader.poll().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mock_reader_empty_field() {
        let (mut reader, _handle) = MockCardReader::new();
        assert_eq!(reader.poll().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mock_reader_injected_failure() {
        let (mut reader, handle) = MockCardReader::new();

        handle.inject_failure("antenna fault").await.unwrap();

        let result = reader.poll().await;
        assert!(matches!(
            result,
            Err(HardwareError::CommunicationError { .. })
        ));
        assert_eq!(reader.poll().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mock_reader_handle_dropped() {
        let (mut reader, handle) = MockCardReader::new();
        drop(handle);

        let result = reader.poll().await;
        assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
    }

    #[tokio::test]
    async fn test_mock_reader_close() {
        let (mut reader, handle) = MockCardReader::with_name("Test Reader".to_string());

        reader.close().await.unwrap();
        assert!(reader.is_closed());
        assert!(handle.present_card(vec![0x01, 0x02]).await.is_err());
        assert!(reader.poll().await.is_err());
    }

    #[tokio::test]
    async fn test_mock_reader_info() {
        let (reader, _handle) = MockCardReader::with_name("Test Reader".to_string());

        let info = reader.get_info().await.unwrap();
        assert_eq!(info.name, "Test Reader");
        assert_eq!(info.model, "mock");
    }
}
