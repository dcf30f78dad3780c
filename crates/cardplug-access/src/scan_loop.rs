//! Poll scheduler driving the access controller.
//!
//! Each tick of a fixed interval polls the reader once and hands the result
//! to the [`AccessController`], waiting for it to finish before the next
//! tick. A grant therefore blocks scanning for its whole hold time.

use crate::controller::AccessController;
use crate::state_machine::{Decision, ScanEvent};
use cardplug_core::CardId;
use cardplug_core::config::ScanConfig;
use cardplug_hardware::{CardReader, IndicatorDevice, OutletDevice};
use cardplug_storage::WhitelistStore;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// Reader polling loop.
#[derive(Debug)]
pub struct ScanLoop<R, O, I, S> {
    reader: R,
    controller: AccessController<O, I, S>,
    poll_interval: Duration,
    heartbeat_every: u64,
    reload_every: u64,
    cycles: u64,
}

impl<R, O, I, S> ScanLoop<R, O, I, S>
where
    R: CardReader,
    O: OutletDevice,
    I: IndicatorDevice,
    S: WhitelistStore,
{
    pub fn new(reader: R, controller: AccessController<O, I, S>, settings: &ScanConfig) -> Self {
        Self {
            reader,
            controller,
            poll_interval: settings.poll_interval,
            heartbeat_every: settings.heartbeat_every,
            reload_every: settings.reload_every,
            cycles: 0,
        }
    }

    pub fn controller(&self) -> &AccessController<O, I, S> {
        &self.controller
    }

    /// Number of completed poll cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Poll until `shutdown` resolves.
    ///
    /// `shutdown` is only watched while waiting for the next tick, so a cycle
    /// that has started (including a grant's hold) always runs to completion.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            heartbeat_every = self.heartbeat_every,
            reload_every = self.reload_every,
            "Scan loop started"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!(cycles = self.cycles, "Shutdown requested, leaving scan loop");
                    break;
                }
                _ = ticker.tick() => {}
            }

            self.run_cycle().await;
        }
    }

    /// Run a single poll cycle.
    pub async fn run_cycle(&mut self) {
        let event = self.poll().await;
        let decision = self.controller.handle(event).await;
        trace!(?decision, "Cycle handled");

        self.cycles = self.cycles.wrapping_add(1);

        // Heartbeat only on cycles that showed nothing else
        if decision == Decision::Idle && due(self.cycles, self.heartbeat_every) {
            self.controller.heartbeat().await;
        }
        if due(self.cycles, self.reload_every) {
            debug!(cycles = self.cycles, "Reloading whitelist");
            self.controller.reload().await;
        }
    }

    /// Release the reader, outlet and indicator.
    pub async fn close(&mut self) {
        if let Err(e) = self.reader.close().await {
            warn!(error = %e, "Failed to close card reader");
        }
        self.controller.close().await;
    }

    async fn poll(&mut self) -> ScanEvent {
        let raw = match self.reader.poll().await {
            Ok(Some(raw)) => raw,
            Ok(None) => return ScanEvent::NoCard,
            Err(e) => {
                warn!(error = %e, "Card reader poll failed");
                return ScanEvent::NoCard;
            }
        };

        match CardId::from_bytes(&raw) {
            Ok(card) => ScanEvent::Card {
                card,
                at: Instant::now(),
            },
            Err(e) => {
                warn!(error = %e, len = raw.len(), "Ignoring unusable card identifier");
                ScanEvent::NoCard
            }
        }
    }
}

/// Whether a periodic task with period `every` falls on `cycle` (0 disables).
fn due(cycle: u64, every: u64) -> bool {
    every > 0 && cycle.is_multiple_of(every)
}
