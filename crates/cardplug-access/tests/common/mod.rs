//! Common test utilities for access-flow integration tests.
//!
//! Builds an [`AccessController`] wired to mock devices and a whitelist file
//! in a temporary directory, plus handles to inspect what it did.

#![allow(dead_code)]

use cardplug_access::{AccessController, OutletController};
use cardplug_core::{CardId, MasterSet};
use cardplug_hardware::mock::{MockIndicator, MockIndicatorHandle, MockOutlet, MockOutletHandle};
use cardplug_storage::{FileWhitelistStore, Whitelist};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

pub const MASTER: &str = "ffff0001";
pub const KNOWN: &str = "aa11bb22";
pub const NEW: &str = "cc33dd44";

pub const ON_TIME: Duration = Duration::from_secs(3);
pub const OUTLET_TIMEOUT: Duration = Duration::from_secs(5);

pub type MockController = AccessController<MockOutlet, MockIndicator, FileWhitelistStore>;

pub fn card(hex: &str) -> CardId {
    CardId::parse(hex).unwrap()
}

/// Controller plus everything needed to observe it.
pub struct Rig {
    pub controller: MockController,
    pub outlet: MockOutletHandle,
    pub indicator: MockIndicatorHandle,
    pub whitelist_path: PathBuf,
    pub dir: TempDir,
}

/// Masters = {MASTER}, whitelist = {KNOWN}, file-backed store in a temp dir.
pub fn rig() -> Rig {
    rig_with(&[KNOWN], |dir| dir.join("whitelist.txt"))
}

/// Rig with a custom initial whitelist and store location.
pub fn rig_with(cards: &[&str], path: impl FnOnce(&std::path::Path) -> PathBuf) -> Rig {
    let dir = tempfile::tempdir().unwrap();
    let whitelist_path = path(dir.path());

    let (outlet, outlet_handle) = MockOutlet::new();
    let (indicator, indicator_handle) = MockIndicator::new();
    let whitelist: Whitelist = cards.iter().map(|hex| card(hex)).collect();

    let controller = AccessController::new(
        OutletController::new(outlet, OUTLET_TIMEOUT),
        indicator,
        FileWhitelistStore::new(&whitelist_path),
        MasterSet::new([card(MASTER)]),
        whitelist,
        ON_TIME,
    );

    Rig {
        controller,
        outlet: outlet_handle,
        indicator: indicator_handle,
        whitelist_path,
        dir,
    }
}

/// Whitelist file contents, empty if the file does not exist.
pub async fn whitelist_file(path: &std::path::Path) -> String {
    tokio::fs::read_to_string(path).await.unwrap_or_default()
}
