//! Real device adapters.

pub mod http_outlet;
#[cfg(feature = "hardware-pcsc")]
pub mod pcsc_reader;
pub mod sysfs_led;

pub use http_outlet::{HttpOutlet, HttpOutletConfig};
#[cfg(feature = "hardware-pcsc")]
pub use pcsc_reader::PcscReader;
pub use sysfs_led::SysfsLed;
