//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled
//! programmatically without requiring physical hardware.

pub mod indicator;
pub mod outlet;
pub mod reader;

// Re-export commonly used types
pub use indicator::{FlashRequest, MockIndicator, MockIndicatorHandle};
pub use outlet::{MockFailure, MockOutlet, MockOutletHandle, RecordedCommand};
pub use reader::{MockCardReader, MockCardReaderHandle};
