//! Process configuration.
//!
//! Configuration is read once at startup from a TOML file and validated into
//! a [`Config`] that is passed explicitly to the components that need it.
//! Missing required settings are reported as [`Error::MissingConfig`] so the
//! process can exit before entering the scan loop.
//!
//! # File Format
//!
//! ```toml
//! [outlet]
//! address = "192.168.1.50"
//! username = "admin"
//! password = "secret"
//! on_time_secs = 3
//! timeout_secs = 5
//!
//! [access]
//! master_cards = ["ffff0001"]
//! whitelist_path = "whitelist.txt"
//! audit_log_path = "access_log.csv"
//!
//! [scan]
//! poll_interval_ms = 500
//! heartbeat_every = 20
//! reload_every = 0
//!
//! [indicator]
//! led_path = "/sys/class/leds/led0"
//!
//! [reader]
//! driver = "pcsc"
//! name = "ACS ACR122U"
//! ```

use crate::{
    CardId, MasterSet, Result,
    constants::{
        DEFAULT_HEARTBEAT_EVERY, DEFAULT_OUTLET_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_MS,
        DEFAULT_WHITELIST_PATH,
    },
    error::Error,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Validated process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub outlet: OutletConfig,
    pub access: AccessConfig,
    pub scan: ScanConfig,
    pub indicator: IndicatorConfig,
    pub reader: ReaderConfig,
}

/// Outlet connection and grant timing.
#[derive(Clone, PartialEq, Eq)]
pub struct OutletConfig {
    /// Network address of the outlet (host or host:port).
    pub address: String,

    pub username: Option<String>,

    pub password: Option<String>,

    /// How long the outlet stays on for a single grant.
    pub on_time: Duration,

    /// Budget for each individual on/off command.
    pub timeout: Duration,
}

// Credentials stay out of logs.
impl std::fmt::Debug for OutletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutletConfig")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("on_time", &self.on_time)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Authorization sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessConfig {
    pub master_cards: MasterSet,
    pub whitelist_path: PathBuf,
    pub audit_log_path: Option<PathBuf>,
}

/// Scheduler cadence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub poll_interval: Duration,

    /// Poll cycles between heartbeat flashes; 0 disables the heartbeat.
    pub heartbeat_every: u64,

    /// Poll cycles between whitelist reloads; 0 disables live reload.
    pub reload_every: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            heartbeat_every: DEFAULT_HEARTBEAT_EVERY,
            reload_every: 0,
        }
    }
}

/// Status LED location. `None` runs without an indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorConfig {
    pub led_path: Option<PathBuf>,
}

/// Card reader backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReaderDriver {
    /// PC/SC reader (requires the `hardware-pcsc` feature).
    #[default]
    Pcsc,

    /// In-process mock reader for development without hardware.
    Mock,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderConfig {
    pub driver: ReaderDriver,

    /// Reader name to open; the first available reader when absent.
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    outlet: OutletSection,
    #[serde(default)]
    access: AccessSection,
    #[serde(default)]
    scan: ScanSection,
    #[serde(default)]
    indicator: IndicatorSection,
    #[serde(default)]
    reader: ReaderSection,
}

#[derive(Debug, Default, Deserialize)]
struct OutletSection {
    address: Option<String>,
    username: Option<String>,
    password: Option<String>,
    on_time_secs: Option<u64>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AccessSection {
    #[serde(default)]
    master_cards: Vec<CardId>,
    whitelist_path: Option<PathBuf>,
    audit_log_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ScanSection {
    poll_interval_ms: Option<u64>,
    heartbeat_every: Option<u64>,
    reload_every: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct IndicatorSection {
    led_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ReaderSection {
    #[serde(default)]
    driver: ReaderDriver,
    name: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file cannot be read or parsed, and
    /// `Error::MissingConfig` if a required setting is absent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;

        let outlet = Self::outlet_from(file.outlet)?;

        if file.access.master_cards.is_empty() {
            return Err(Error::MissingConfig("access.master_cards".to_string()));
        }

        let access = AccessConfig {
            master_cards: MasterSet::new(file.access.master_cards),
            whitelist_path: file
                .access
                .whitelist_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WHITELIST_PATH)),
            audit_log_path: file.access.audit_log_path,
        };

        let poll_interval_ms = file
            .scan
            .poll_interval_ms
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        if poll_interval_ms == 0 {
            return Err(Error::Config(
                "scan.poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        let scan = ScanConfig {
            poll_interval: Duration::from_millis(poll_interval_ms),
            heartbeat_every: file.scan.heartbeat_every.unwrap_or(DEFAULT_HEARTBEAT_EVERY),
            reload_every: file.scan.reload_every.unwrap_or(0),
        };

        Ok(Self {
            outlet,
            access,
            scan,
            indicator: IndicatorConfig {
                led_path: file.indicator.led_path,
            },
            reader: ReaderConfig {
                driver: file.reader.driver,
                name: file.reader.name,
            },
        })
    }

    fn outlet_from(section: OutletSection) -> Result<OutletConfig> {
        let address = section
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or_else(|| Error::MissingConfig("outlet.address".to_string()))?;

        let on_time_secs = section
            .on_time_secs
            .ok_or_else(|| Error::MissingConfig("outlet.on_time_secs".to_string()))?;

        let timeout_secs = section.timeout_secs.unwrap_or(DEFAULT_OUTLET_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config(
                "outlet.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(OutletConfig {
            address,
            username: section.username,
            password: section.password,
            on_time: Duration::from_secs(on_time_secs),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
