//! Access-control core for the cardplug outlet controller.
//!
//! This crate turns card observations into outlet, indicator and whitelist
//! actions.
//!
//! # Components
//!
//! - [`AccessStateMachine`] - Pure mode transitions and classification
//! - [`OutletController`] - Timeout-bounded `on`/`off` with explicit faults
//! - [`AccessController`] - Carries out decisions, owns all mutable state
//! - [`ScanLoop`] - Fixed-interval reader polling feeding the controller
//!
//! # Flow
//!
//! ```text
//! ScanLoop ──poll──▶ CardReader
//!    │
//!    └─ScanEvent─▶ AccessController ──▶ AccessStateMachine (decision)
//!                        │
//!                        ├──▶ WhitelistStore (enroll: persist first)
//!                        ├──▶ OutletController (grant: on, hold, off)
//!                        └──▶ IndicatorDevice (feedback pattern)
//! ```

pub mod controller;
pub mod outlet;
pub mod scan_loop;
pub mod state_machine;

pub use controller::AccessController;
pub use outlet::{OutletController, OutletFault, OutletResult};
pub use scan_loop::ScanLoop;
pub use state_machine::{
    AccessStateMachine, CardClass, Decision, ENROLL_TIMEOUT, Mode, ScanEvent, classify,
};
