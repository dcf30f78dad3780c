//! PC/SC contactless reader (ACR122U and compatible).
//!
//! Available with the `hardware-pcsc` feature. The UID is read with the
//! pseudo-APDU `GET DATA` (`FF CA 00 00 00`) that PC/SC part 3 readers
//! answer for any ISO 14443 card.

use crate::{
    HardwareError, Result,
    traits::CardReader,
    types::DeviceInfo,
};
use pcsc::{Context, Protocols, Scope, ShareMode};
use std::ffi::CString;
use tracing::{debug, info, trace};

/// `GET DATA` for the card UID.
const GET_UID_APDU: [u8; 5] = [0xFF, 0xCA, 0x00, 0x00, 0x00];

/// Status word for a successful command.
const SW_SUCCESS: [u8; 2] = [0x90, 0x00];

/// Reader opened through the PC/SC daemon.
///
/// A card resting on the reader is reported once; it is reported again only
/// after it has been removed (or replaced by a different card).
pub struct PcscReader {
    context: Context,
    reader: CString,
    last_uid: Option<Vec<u8>>,
}

impl std::fmt::Debug for PcscReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PcscReader")
            .field("reader", &self.reader)
            .field("last_uid", &self.last_uid)
            .finish_non_exhaustive()
    }
}

impl PcscReader {
    /// Open the reader whose name contains `name`, or the first reader.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Disconnected` if no matching reader is
    /// attached and `HardwareError::InitializationFailed` if the PC/SC
    /// service is unavailable.
    pub fn open(name: Option<&str>) -> Result<Self> {
        let context = Context::establish(Scope::User)
            .map_err(|e| HardwareError::initialization_failed(format!("PC/SC context: {e}")))?;

        let len = context.list_readers_len().map_err(map_list_error)?;
        let mut buf = vec![0u8; len];
        let readers: Vec<CString> = context
            .list_readers(&mut buf)
            .map_err(map_list_error)?
            .map(|r| r.to_owned())
            .collect();

        let reader = readers
            .into_iter()
            .find(|r| name.is_none_or(|wanted| r.to_string_lossy().contains(wanted)))
            .ok_or_else(|| {
                HardwareError::disconnected(name.unwrap_or("any PC/SC reader").to_string())
            })?;

        info!(reader = %reader.to_string_lossy(), "Opened PC/SC reader");

        Ok(Self {
            context,
            reader,
            last_uid: None,
        })
    }

    fn read_uid(&self) -> Result<Option<Vec<u8>>> {
        let card = match self
            .context
            .connect(&self.reader, ShareMode::Shared, Protocols::ANY)
        {
            Ok(card) => card,
            Err(pcsc::Error::NoSmartcard | pcsc::Error::RemovedCard) => return Ok(None),
            Err(pcsc::Error::ReaderUnavailable | pcsc::Error::UnknownReader) => {
                return Err(HardwareError::disconnected(
                    self.reader.to_string_lossy().into_owned(),
                ));
            }
            Err(e) => return Err(HardwareError::communication(e.to_string())),
        };

        let mut buf = [0u8; pcsc::MAX_BUFFER_SIZE];
        let response = match card.transmit(&GET_UID_APDU, &mut buf) {
            Ok(response) => response,
            Err(pcsc::Error::RemovedCard) => return Ok(None),
            Err(e) => return Err(HardwareError::card_read(e.to_string())),
        };

        if response.len() <= SW_SUCCESS.len() {
            return Err(HardwareError::invalid_data(format!(
                "short GET DATA response: {response:02X?}"
            )));
        }

        let (uid, status) = response.split_at(response.len() - SW_SUCCESS.len());
        if status != SW_SUCCESS {
            return Err(HardwareError::card_read(format!(
                "GET DATA status {status:02X?}"
            )));
        }

        trace!(uid = ?uid, "Card UID read");
        Ok(Some(uid.to_vec()))
    }
}

fn map_list_error(e: pcsc::Error) -> HardwareError {
    match e {
        pcsc::Error::NoReadersAvailable => HardwareError::disconnected("no PC/SC reader attached"),
        other => HardwareError::initialization_failed(other.to_string()),
    }
}

/// Report `current` only when it differs from what the previous poll saw.
fn edge(previous: &Option<Vec<u8>>, current: &Option<Vec<u8>>) -> Option<Vec<u8>> {
    match (previous, current) {
        (Some(prev), Some(uid)) if prev == uid => None,
        (_, current) => current.clone(),
    }
}

impl CardReader for PcscReader {
    async fn poll(&mut self) -> Result<Option<Vec<u8>>> {
        // SCardConnect returns immediately when the field is empty.
        let current = self.read_uid()?;
        let fresh = edge(&self.last_uid, &current);
        self.last_uid = current;
        Ok(fresh)
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.reader.to_string_lossy(), "pcsc"))
    }

    async fn close(&mut self) -> Result<()> {
        debug!(reader = %self.reader.to_string_lossy(), "Closing PC/SC reader");
        self.last_uid = None;
        Ok(())
    }
}
