//! Storage layer for the cardplug access controller.
//!
//! This crate provides file-backed persistence for the card whitelist and an
//! append-only CSV audit trail of access decisions.
//!
//! # Architecture
//!
//! - [`Whitelist`] - In-memory set of authorized cards
//! - [`WhitelistStore`] - Load/save contract used by the access controller
//! - [`FileWhitelistStore`] - Newline-delimited file with atomic replacement
//! - [`CsvAuditLog`] - One CSV row per access decision
//!
//! # Persistence Contract
//!
//! Mutations never happen in place. A new set is built with
//! [`Whitelist::added`], written with [`WhitelistStore::save`], and only
//! adopted by the caller after the save succeeded. Saves write a sibling
//! temporary file, flush it to disk and rename it over the target, so a
//! concurrent reader (such as an administration UI) sees either the old or
//! the new file, never a partial one.
//!
//! # Examples
//!
//! ```no_run
//! use cardplug_core::CardId;
//! use cardplug_storage::{FileWhitelistStore, WhitelistStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileWhitelistStore::new("whitelist.txt");
//!
//! let whitelist = store.load().await;
//! let updated = whitelist.added(CardId::parse("cc33dd44")?);
//!
//! store.save(&updated).await?;
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod error;
pub mod store;
pub mod whitelist;

pub use audit::{AuditOutcome, CsvAuditLog};
pub use error::{StorageError, StorageResult};
pub use store::{FileWhitelistStore, WhitelistStore};
pub use whitelist::Whitelist;
