//! Common types shared across device implementations.

use std::fmt;

/// Generic device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Device name (e.g., "ACS ACR122U", "Mock Card Reader").
    pub name: String,

    /// Device model or driver identifier.
    pub model: String,
}

impl DeviceInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Command accepted by an outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutletCommand {
    On,
    Off,
}

impl OutletCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for OutletCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual feedback patterns shown on the status indicator.
///
/// Each pattern carries a default repeat count and blink interval so callers
/// only need to name the situation.
///
/// | Pattern   | Repeat | Interval |
/// |-----------|--------|----------|
/// | Enrolling | 5      | 200ms    |
/// | Granted   | 1      | 1000ms   |
/// | Denied    | 3      | 100ms    |
/// | Enrolled  | 2      | 500ms    |
/// | Fault     | 10     | 50ms     |
/// | Timeout   | 2      | 300ms    |
/// | Heartbeat | 1      | 50ms     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum IndicatorPattern {
    /// Enrollment window opened by a master card.
    Enrolling,

    /// Whitelisted card accepted; outlet is being switched on.
    Granted,

    /// Unknown card rejected.
    Denied,

    /// Card added to the whitelist.
    Enrolled,

    /// Outlet unreachable or whitelist write failed.
    Fault,

    /// Enrollment window expired without a card.
    Timeout,

    /// Periodic liveness blink.
    Heartbeat,
}

impl IndicatorPattern {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enrolling => "enrolling",
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Enrolled => "enrolled",
            Self::Fault => "fault",
            Self::Timeout => "timeout",
            Self::Heartbeat => "heartbeat",
        }
    }

    pub fn default_repeat(&self) -> u8 {
        match self {
            Self::Enrolling => 5,
            Self::Granted => 1,
            Self::Denied => 3,
            Self::Enrolled => 2,
            Self::Fault => 10,
            Self::Timeout => 2,
            Self::Heartbeat => 1,
        }
    }

    pub fn default_interval_ms(&self) -> u64 {
        match self {
            Self::Enrolling => 200,
            Self::Granted => 1000,
            Self::Denied => 100,
            Self::Enrolled => 500,
            Self::Fault => 50,
            Self::Timeout => 300,
            Self::Heartbeat => 50,
        }
    }
}

impl fmt::Display for IndicatorPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
