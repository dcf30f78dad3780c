//! Mock outlet implementation for testing and development.
//!
//! Records every command it receives together with the (possibly paused)
//! tokio clock reading, and can be scripted to fail or hang per command.

use crate::{
    HardwareError, Result,
    traits::OutletDevice,
    types::OutletCommand,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;

/// How a scripted command misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Return a communication error immediately.
    Error,

    /// Never complete; only a caller-side timeout ends the call.
    Hang,
}

/// One command received by the mock outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedCommand {
    pub command: OutletCommand,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct OutletState {
    commands: Vec<RecordedCommand>,
    on_failure: Option<MockFailure>,
    off_failure: Option<MockFailure>,
    powered: bool,
    closed: bool,
}

/// Mock outlet.
///
/// # Examples
///
/// ```
/// use cardplug_hardware::mock::{MockFailure, MockOutlet};
/// use cardplug_hardware::traits::OutletDevice;
/// use cardplug_hardware::types::OutletCommand;
///
/// #[tokio::main]
/// async fn main() {
///     let (mut outlet, handle) = MockOutlet::new();
///
///     outlet.on().await.unwrap();
///     assert!(handle.is_powered());
///
///     handle.fail(OutletCommand::Off, MockFailure::Error);
///     assert!(outlet.off().await.is_err());
///     assert_eq!(handle.commands(), vec![OutletCommand::On, OutletCommand::Off]);
/// }
/// ```
#[derive(Debug)]
pub struct MockOutlet {
    state: Arc<Mutex<OutletState>>,
}

impl MockOutlet {
    /// Create a mock outlet and the handle used to script and inspect it.
    pub fn new() -> (Self, MockOutletHandle) {
        let state = Arc::new(Mutex::new(OutletState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockOutletHandle { state },
        )
    }

    async fn execute(&mut self, command: OutletCommand) -> Result<()> {
        let failure = {
            let mut state = lock(&self.state);
            if state.closed {
                return Err(HardwareError::disconnected("mock outlet closed"));
            }

            state.commands.push(RecordedCommand {
                command,
                at: Instant::now(),
            });

            let failure = match command {
                OutletCommand::On => state.on_failure,
                OutletCommand::Off => state.off_failure,
            };

            if failure.is_none() {
                state.powered = command == OutletCommand::On;
            }
            failure
        };

        match failure {
            None => Ok(()),
            Some(MockFailure::Error) => Err(HardwareError::communication(format!(
                "mock outlet refused {command}"
            ))),
            Some(MockFailure::Hang) => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}

impl OutletDevice for MockOutlet {
    async fn on(&mut self) -> Result<()> {
        self.execute(OutletCommand::On).await
    }

    async fn off(&mut self) -> Result<()> {
        self.execute(OutletCommand::Off).await
    }

    async fn close(&mut self) -> Result<()> {
        lock(&self.state).closed = true;
        Ok(())
    }
}

/// Handle for scripting and inspecting a [`MockOutlet`].
#[derive(Debug, Clone)]
pub struct MockOutletHandle {
    state: Arc<Mutex<OutletState>>,
}

impl MockOutletHandle {
    /// Make every future `command` misbehave as described.
    pub fn fail(&self, command: OutletCommand, failure: MockFailure) {
        let mut state = lock(&self.state);
        match command {
            OutletCommand::On => state.on_failure = Some(failure),
            OutletCommand::Off => state.off_failure = Some(failure),
        }
    }

    /// Remove all scripted failures.
    pub fn clear_failures(&self) {
        let mut state = lock(&self.state);
        state.on_failure = None;
        state.off_failure = None;
    }

    /// Commands received so far, including failed attempts.
    pub fn commands(&self) -> Vec<OutletCommand> {
        lock(&self.state).commands.iter().map(|c| c.command).collect()
    }

    /// Commands received so far with their arrival time.
    pub fn recorded(&self) -> Vec<RecordedCommand> {
        lock(&self.state).commands.clone()
    }

    /// Returns `true` if the last successful command was `on`.
    pub fn is_powered(&self) -> bool {
        lock(&self.state).powered
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }
}

fn lock(state: &Mutex<OutletState>) -> MutexGuard<'_, OutletState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
