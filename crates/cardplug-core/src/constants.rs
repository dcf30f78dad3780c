//! Core constants for the cardplug access controller.
//!
//! Timing values that the access-control flow depends on are fixed here so
//! that every crate agrees on them. Values marked as defaults can be
//! overridden through [`Config`](crate::Config); the enrollment window cannot.
//!
//! # Usage
//!
//! ```
//! use cardplug_core::constants::*;
//! use std::time::Duration;
//!
//! let window = Duration::from_secs(ENROLL_TIMEOUT_SECS);
//! assert_eq!(window.as_secs(), 10);
//! ```

// ============================================================================
// Access Flow Timing
// ============================================================================

/// Length of the enrollment window opened by a master card, in seconds.
///
/// The window reverts to normal mode on the first poll tick where strictly
/// more than this amount of time has passed since the master card was seen.
pub const ENROLL_TIMEOUT_SECS: u64 = 10;

/// Default budget for a single outlet command, in seconds.
pub const DEFAULT_OUTLET_TIMEOUT_SECS: u64 = 5;

/// Default reader polling cadence in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Default number of poll cycles between heartbeat flashes (0 disables).
pub const DEFAULT_HEARTBEAT_EVERY: u64 = 20;

// ============================================================================
// Card Identifiers
// ============================================================================

/// Minimum raw UID length in bytes accepted from a reader.
///
/// ISO 14443 UIDs are 4, 7 or 10 bytes, but some readers report shorter
/// serials, so only empty identifiers are rejected.
pub const MIN_UID_BYTES: usize = 1;

/// Maximum raw UID length in bytes accepted from a reader.
pub const MAX_UID_BYTES: usize = 32;

// ============================================================================
// Storage
// ============================================================================

/// Default whitelist location, relative to the working directory.
pub const DEFAULT_WHITELIST_PATH: &str = "whitelist.txt";

/// Suffix appended to the whitelist path for the temporary file used during
/// atomic replacement.
pub const TEMP_FILE_SUFFIX: &str = "tmp";
