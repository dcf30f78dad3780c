//! Mock indicator that records flash requests.

use crate::{
    HardwareError, Result,
    traits::IndicatorDevice,
    types::IndicatorPattern,
};
use std::sync::{Arc, Mutex, MutexGuard};

/// One flash request received by the mock indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashRequest {
    pub pattern: IndicatorPattern,
    pub repeat: u8,
    pub interval_ms: u64,
}

#[derive(Debug, Default)]
struct IndicatorState {
    requests: Vec<FlashRequest>,
    missing: bool,
    closed: bool,
}

/// Mock indicator for testing.
///
/// Requests are recorded even when the indicator is configured as missing,
/// so tests can assert on what the controller asked for.
#[derive(Debug)]
pub struct MockIndicator {
    state: Arc<Mutex<IndicatorState>>,
}

impl MockIndicator {
    pub fn new() -> (Self, MockIndicatorHandle) {
        let state = Arc::new(Mutex::new(IndicatorState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockIndicatorHandle { state },
        )
    }
}

impl IndicatorDevice for MockIndicator {
    async fn flash(
        &mut self,
        pattern: IndicatorPattern,
        repeat: u8,
        interval_ms: u64,
    ) -> Result<()> {
        let mut state = lock(&self.state);
        state.requests.push(FlashRequest {
            pattern,
            repeat,
            interval_ms,
        });

        if state.missing {
            return Err(HardwareError::disconnected("mock indicator"));
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        lock(&self.state).closed = true;
        Ok(())
    }
}

/// Handle for inspecting a [`MockIndicator`].
#[derive(Debug, Clone)]
pub struct MockIndicatorHandle {
    state: Arc<Mutex<IndicatorState>>,
}

impl MockIndicatorHandle {
    /// Patterns requested so far, in order.
    pub fn patterns(&self) -> Vec<IndicatorPattern> {
        lock(&self.state).requests.iter().map(|r| r.pattern).collect()
    }

    pub fn requests(&self) -> Vec<FlashRequest> {
        lock(&self.state).requests.clone()
    }

    /// Number of times `pattern` was requested.
    pub fn count(&self, pattern: IndicatorPattern) -> usize {
        lock(&self.state)
            .requests
            .iter()
            .filter(|r| r.pattern == pattern)
            .count()
    }

    /// Simulate missing hardware: every flash fails after being recorded.
    pub fn set_missing(&self, missing: bool) {
        lock(&self.state).missing = missing;
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }
}

fn lock(state: &Mutex<IndicatorState>) -> MutexGuard<'_, IndicatorState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
