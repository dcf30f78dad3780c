//! Append-only CSV audit trail.
//!
//! Each access decision produces one row `timestamp,card,outcome`, with an
//! RFC 3339 UTC timestamp. Decisions that involve no card (an enrollment
//! window expiring) leave the card column empty.

use crate::error::{StorageError, StorageResult};
use cardplug_core::CardId;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Header written when the log file is created.
pub const AUDIT_HEADER: &str = "timestamp,card,outcome";

/// Recorded result of an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditOutcome {
    Granted,
    Denied,
    EnrollmentOpened,
    Enrolled,
    EnrollmentFailed,
    EnrollmentTimeout,
    /// Outlet command failed during a grant
    Fault,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::EnrollmentOpened => "enrollment_opened",
            Self::Enrolled => "enrolled",
            Self::EnrollmentFailed => "enrollment_failed",
            Self::EnrollmentTimeout => "enrollment_timeout",
            Self::Fault => "fault",
        }
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CSV file that access decisions are appended to.
#[derive(Debug, Clone)]
pub struct CsvAuditLog {
    path: PathBuf,
}

impl CsvAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a row stamped with the current time.
    pub async fn record(&self, card: Option<&CardId>, outcome: AuditOutcome) -> StorageResult<()> {
        self.record_at(Utc::now(), card, outcome).await
    }

    /// Append a row with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Persistence` if the file cannot be opened or
    /// written.
    pub async fn record_at(
        &self,
        at: DateTime<Utc>,
        card: Option<&CardId>,
        outcome: AuditOutcome,
    ) -> StorageResult<()> {
        let persist = |e: std::io::Error| StorageError::persistence(&self.path, e);

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(persist)?;

        let mut row = String::new();
        if file.metadata().await.map_err(persist)?.len() == 0 {
            row.push_str(AUDIT_HEADER);
            row.push('\n');
        }
        row.push_str(&format_row(at, card, outcome));
        row.push('\n');

        file.write_all(row.as_bytes()).await.map_err(persist)?;
        file.flush().await.map_err(persist)?;
        Ok(())
    }
}

fn format_row(at: DateTime<Utc>, card: Option<&CardId>, outcome: AuditOutcome) -> String {
    format!(
        "{},{},{}",
        at.to_rfc3339_opts(SecondsFormat::Secs, true),
        card.map(CardId::as_str).unwrap_or_default(),
        outcome
    )
}
