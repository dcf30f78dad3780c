//! Executes state machine decisions against the collaborators.
//!
//! [`AccessController`] owns everything the access flow touches: the mode,
//! the whitelist, the master set, the outlet, the indicator, the whitelist
//! store and the optional audit log. All methods take `&mut self`, so only one
//! event is ever in flight.
//!
//! Failures never escape: outlet faults and indicator errors are logged and
//! shown on the indicator, persistence failures keep enrollment open so the
//! operator can present the card again.

use crate::outlet::{OutletController, OutletFault};
use crate::state_machine::{AccessStateMachine, Decision, Mode, ScanEvent};
use cardplug_core::{CardId, MasterSet};
use cardplug_hardware::{IndicatorDevice, IndicatorPattern, OutletDevice};
use cardplug_storage::{AuditOutcome, CsvAuditLog, Whitelist, WhitelistStore};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Owner of the access-control flow.
///
/// # Examples
///
/// ```
/// use cardplug_access::{AccessController, OutletController, ScanEvent};
/// use cardplug_core::{CardId, MasterSet};
/// use cardplug_hardware::mock::{MockIndicator, MockOutlet};
/// use cardplug_storage::{FileWhitelistStore, Whitelist};
/// use std::time::Duration;
/// use tokio::time::Instant;
///
/// # #[tokio::main]
/// # async fn main() {
/// let dir = tempfile::tempdir().unwrap();
/// let (outlet, outlet_handle) = MockOutlet::new();
/// let (indicator, _indicator_handle) = MockIndicator::new();
///
/// let card = CardId::parse("aa11bb22").unwrap();
/// let mut controller = AccessController::new(
///     OutletController::new(outlet, Duration::from_secs(5)),
///     indicator,
///     FileWhitelistStore::new(dir.path().join("whitelist.txt")),
///     MasterSet::new([CardId::parse("ffff0001").unwrap()]),
///     Whitelist::new().added(card.clone()),
///     Duration::from_millis(10),
/// );
///
/// controller.handle(ScanEvent::Card { card, at: Instant::now() }).await;
/// assert_eq!(outlet_handle.commands().len(), 2);
/// # }
/// ```
#[derive(Debug)]
pub struct AccessController<O, I, S> {
    machine: AccessStateMachine,
    whitelist: Whitelist,
    masters: MasterSet,
    outlet: OutletController<O>,
    indicator: I,
    store: S,
    audit: Option<CsvAuditLog>,
    on_time: Duration,
}

impl<O, I, S> AccessController<O, I, S>
where
    O: OutletDevice,
    I: IndicatorDevice,
    S: WhitelistStore,
{
    /// Create a controller in `Normal` mode.
    ///
    /// `whitelist` is the set loaded at startup; `on_time` is how long a
    /// granted card keeps the outlet powered.
    pub fn new(
        outlet: OutletController<O>,
        indicator: I,
        store: S,
        masters: MasterSet,
        whitelist: Whitelist,
        on_time: Duration,
    ) -> Self {
        Self {
            machine: AccessStateMachine::new(),
            whitelist,
            masters,
            outlet,
            indicator,
            store,
            audit: None,
            on_time,
        }
    }

    /// Append every decision to `audit`.
    pub fn with_audit_log(mut self, audit: CsvAuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn mode(&self) -> Mode {
        self.machine.mode()
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Process one poll cycle and return the decision that was carried out.
    ///
    /// Returns only once every effect has finished, including the full hold
    /// of a grant.
    pub async fn handle(&mut self, event: ScanEvent) -> Decision {
        match event {
            ScanEvent::NoCard => self.on_tick(Instant::now()).await,
            ScanEvent::Card { card, at } => self.on_card(card, at).await,
        }
    }

    /// Process a cycle without a card.
    pub async fn on_tick(&mut self, now: Instant) -> Decision {
        let decision = self.machine.on_tick(now);
        if decision == Decision::EnrollmentTimedOut {
            info!("Enrollment window expired without a card");
            self.flash(IndicatorPattern::Timeout).await;
            self.audit(None, AuditOutcome::EnrollmentTimeout).await;
        }
        decision
    }

    /// Process a card observed at `at`.
    pub async fn on_card(&mut self, card: CardId, at: Instant) -> Decision {
        let decision = self
            .machine
            .on_card(&card, at, &self.masters, &self.whitelist);

        match decision {
            Decision::OpenEnrollment => {
                info!(card = %card, "Master card presented, enrollment open");
                self.flash(IndicatorPattern::Enrolling).await;
                self.audit(Some(&card), AuditOutcome::EnrollmentOpened).await;
            }
            Decision::Grant => self.grant(&card).await,
            Decision::Deny => {
                info!(card = %card, "Access denied");
                self.flash(IndicatorPattern::Denied).await;
                self.audit(Some(&card), AuditOutcome::Denied).await;
            }
            Decision::Enroll => self.enroll(card).await,
            Decision::Idle | Decision::EnrollmentTimedOut => {}
        }

        decision
    }

    /// Show the heartbeat pattern while idle in `Normal` mode.
    pub async fn heartbeat(&mut self) {
        if self.machine.mode().is_normal() {
            self.flash(IndicatorPattern::Heartbeat).await;
        }
    }

    /// Replace the in-memory whitelist with the durable one.
    ///
    /// Picks up edits made by other processes to the whitelist file. If the
    /// file cannot be read, the current whitelist is kept.
    pub async fn reload(&mut self) {
        let reloaded = match self.store.reload().await {
            Ok(reloaded) => reloaded,
            Err(e) => {
                warn!(
                    error = %e,
                    cards = self.whitelist.len(),
                    "Whitelist reload failed, keeping current set"
                );
                return;
            }
        };

        if reloaded != self.whitelist {
            info!(
                before = self.whitelist.len(),
                after = reloaded.len(),
                "Whitelist reloaded"
            );
        }
        self.whitelist = reloaded;
    }

    /// Release the outlet and indicator.
    ///
    /// Both are closed even if the first one fails.
    pub async fn close(&mut self) {
        if let Err(e) = self.outlet.close().await {
            warn!(error = %e, "Failed to close outlet");
        }
        if let Err(e) = self.indicator.close().await {
            warn!(error = %e, "Failed to close indicator");
        }
    }

    async fn grant(&mut self, card: &CardId) {
        info!(card = %card, on_time_ms = self.on_time.as_millis() as u64, "Access granted");
        self.flash(IndicatorPattern::Granted).await;
        self.audit(Some(card), AuditOutcome::Granted).await;

        match self.outlet.on().await {
            Ok(()) => {
                tokio::time::sleep(self.on_time).await;

                if let Err(fault) = self.outlet.off().await {
                    self.outlet_fault(card, "off", &fault).await;
                }
            }
            Err(fault) => {
                self.outlet_fault(card, "on", &fault).await;

                // The outlet may have switched before failing to answer.
                if let Err(recovery) = self.outlet.off().await {
                    warn!(card = %card, error = %recovery, "Recovery off command failed");
                }
            }
        }
    }

    async fn outlet_fault(&mut self, card: &CardId, command: &str, fault: &OutletFault) {
        warn!(card = %card, command, error = %fault, "Outlet command failed");
        self.flash(IndicatorPattern::Fault).await;
        self.audit(Some(card), AuditOutcome::Fault).await;
    }

    async fn enroll(&mut self, card: CardId) {
        let updated = self.whitelist.added(card.clone());

        match self.store.save(&updated).await {
            Ok(()) => {
                let already_known = updated.len() == self.whitelist.len();
                self.whitelist = updated;
                self.machine.complete_enrollment();

                info!(card = %card, already_known, cards = self.whitelist.len(), "Card enrolled");
                self.flash(IndicatorPattern::Enrolled).await;
                self.audit(Some(&card), AuditOutcome::Enrolled).await;
            }
            Err(e) => {
                error!(
                    card = %card,
                    error = %e,
                    "Enrollment NOT persisted; enrollment stays open, present the card again"
                );
                self.flash(IndicatorPattern::Fault).await;
                self.audit(Some(&card), AuditOutcome::EnrollmentFailed).await;
            }
        }
    }

    async fn flash(&mut self, pattern: IndicatorPattern) {
        let repeat = pattern.default_repeat();
        let interval_ms = pattern.default_interval_ms();

        if let Err(e) = self.indicator.flash(pattern, repeat, interval_ms).await {
            warn!(%pattern, error = %e, "Indicator unavailable");
        }
    }

    async fn audit(&self, card: Option<&CardId>, outcome: AuditOutcome) {
        let Some(log) = &self.audit else {
            return;
        };

        if let Err(e) = log.record(card, outcome).await {
            warn!(%outcome, error = %e, "Failed to write audit log");
        } else {
            debug!(%outcome, "Audit entry written");
        }
    }
}
