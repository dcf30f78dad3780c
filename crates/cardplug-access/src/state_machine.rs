//! Access-control state machine.
//!
//! The machine holds the current [`Mode`] and decides what a poll event
//! means. It performs no I/O: the [`AccessController`](crate::AccessController)
//! carries out each [`Decision`] against the outlet, indicator and store.
//!
//! # States
//!
//! - `Normal`: master cards open enrollment, whitelisted cards switch the
//!   outlet, everything else is denied.
//! - `Enrollment { since }`: the next card observed, whatever it is, becomes
//!   the enrollment target.
//!
//! # Valid Transitions
//!
//! - Normal → Enrollment (master card observed)
//! - Enrollment → Normal (target persisted, see
//!   [`complete_enrollment`](AccessStateMachine::complete_enrollment))
//! - Enrollment → Normal (tick more than the enrollment window after `since`)
//!
//! The window is only checked on ticks. A card that arrives after the window
//! elapsed but before the next tick is processed is still enrolled.
//!
//! # Examples
//!
//! ```
//! use cardplug_access::{AccessStateMachine, Decision, Mode};
//! use cardplug_core::{CardId, MasterSet};
//! use cardplug_storage::Whitelist;
//! use tokio::time::Instant;
//!
//! let master = CardId::parse("ffff0001").unwrap();
//! let masters = MasterSet::new([master.clone()]);
//! let mut machine = AccessStateMachine::new();
//!
//! let now = Instant::now();
//! let decision = machine.on_card(&master, now, &masters, &Whitelist::new());
//!
//! assert_eq!(decision, Decision::OpenEnrollment);
//! assert_eq!(machine.mode(), Mode::Enrollment { since: now });
//! ```

use cardplug_core::constants::ENROLL_TIMEOUT_SECS;
use cardplug_core::{CardId, MasterSet};
use cardplug_storage::Whitelist;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Enrollment window opened by a master card.
pub const ENROLL_TIMEOUT: Duration = Duration::from_secs(ENROLL_TIMEOUT_SECS);

/// Operating mode of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,

    /// Enrollment window opened at `since`.
    Enrollment { since: Instant },
}

impl Mode {
    pub fn is_normal(&self) -> bool {
        matches!(self, Mode::Normal)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Normal => write!(f, "Normal"),
            Mode::Enrollment { .. } => write!(f, "Enrollment"),
        }
    }
}

/// One poll cycle's worth of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Nothing on the reader this cycle.
    NoCard,

    Card { card: CardId, at: Instant },
}

/// How a card is classified outside of enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardClass {
    Master,
    Whitelisted,
    Unknown,
}

/// Classify `card`. Master membership wins over whitelist membership.
pub fn classify(card: &CardId, masters: &MasterSet, whitelist: &Whitelist) -> CardClass {
    if masters.contains(card) {
        CardClass::Master
    } else if whitelist.contains(card) {
        CardClass::Whitelisted
    } else {
        CardClass::Unknown
    }
}

/// What the controller must do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing happened.
    Idle,

    /// The enrollment window expired; the machine is back in `Normal`.
    EnrollmentTimedOut,

    /// A master card opened the enrollment window.
    OpenEnrollment,

    /// Run the on-hold-off sequence.
    Grant,

    Deny,

    /// Persist the card, then call
    /// [`complete_enrollment`](AccessStateMachine::complete_enrollment).
    /// The machine stays in `Enrollment` until then.
    Enroll,
}

/// Pure transition logic over [`Mode`].
#[derive(Debug, Clone)]
pub struct AccessStateMachine {
    mode: Mode,
}

impl AccessStateMachine {
    /// Create a machine in `Normal` mode.
    pub fn new() -> Self {
        Self { mode: Mode::Normal }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Handle a cycle without a card.
    ///
    /// Reverts to `Normal` once strictly more than [`ENROLL_TIMEOUT`] has
    /// passed since enrollment opened.
    pub fn on_tick(&mut self, now: Instant) -> Decision {
        match self.mode {
            Mode::Enrollment { since } if now.saturating_duration_since(since) > ENROLL_TIMEOUT => {
                self.mode = Mode::Normal;
                Decision::EnrollmentTimedOut
            }
            _ => Decision::Idle,
        }
    }

    /// Handle a card observed at `now`.
    pub fn on_card(
        &mut self,
        card: &CardId,
        now: Instant,
        masters: &MasterSet,
        whitelist: &Whitelist,
    ) -> Decision {
        match self.mode {
            Mode::Enrollment { .. } => Decision::Enroll,
            Mode::Normal => match classify(card, masters, whitelist) {
                CardClass::Master => {
                    self.mode = Mode::Enrollment { since: now };
                    Decision::OpenEnrollment
                }
                CardClass::Whitelisted => Decision::Grant,
                CardClass::Unknown => Decision::Deny,
            },
        }
    }

    /// Close the enrollment window after the target card was persisted.
    ///
    /// Has no effect in `Normal` mode.
    pub fn complete_enrollment(&mut self) {
        if let Mode::Enrollment { .. } = self.mode {
            self.mode = Mode::Normal;
        }
    }
}

impl Default for AccessStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn card(hex: &str) -> CardId {
        CardId::parse(hex).unwrap()
    }

    fn masters() -> MasterSet {
        MasterSet::new([card("ffff0001")])
    }

    fn whitelist() -> Whitelist {
        Whitelist::new().added(card("aa11bb22"))
    }

    #[test]
    fn test_new_machine_starts_normal() {
        assert_eq!(AccessStateMachine::new().mode(), Mode::Normal);
    }

    #[rstest]
    #[case("ffff0001", CardClass::Master)]
    #[case("aa11bb22", CardClass::Whitelisted)]
    #[case("cc33dd44", CardClass::Unknown)]
    fn test_classify(#[case] hex: &str, #[case] expected: CardClass) {
        assert_eq!(classify(&card(hex), &masters(), &whitelist()), expected);
    }

    #[test]
    fn test_master_wins_over_whitelist() {
        let overlap = Whitelist::new().added(card("ffff0001"));
        assert_eq!(
            classify(&card("ffff0001"), &masters(), &overlap),
            CardClass::Master
        );
    }

    #[test]
    fn test_master_opens_enrollment_at_observation_time() {
        let mut machine = AccessStateMachine::new();
        let now = Instant::now();

        let decision = machine.on_card(&card("ffff0001"), now, &masters(), &whitelist());

        assert_eq!(decision, Decision::OpenEnrollment);
        assert_eq!(machine.mode(), Mode::Enrollment { since: now });
    }

    #[rstest]
    #[case("aa11bb22", Decision::Grant)]
    #[case("cc33dd44", Decision::Deny)]
    fn test_normal_mode_decisions(#[case] hex: &str, #[case] expected: Decision) {
        let mut machine = AccessStateMachine::new();

        let decision = machine.on_card(&card(hex), Instant::now(), &masters(), &whitelist());

        assert_eq!(decision, expected);
        assert_eq!(machine.mode(), Mode::Normal);
    }

    #[rstest]
    #[case("ffff0001")]
    #[case("aa11bb22")]
    #[case("cc33dd44")]
    fn test_any_card_during_enrollment_is_target(#[case] hex: &str) {
        let mut machine = AccessStateMachine::new();
        let opened = Instant::now();
        machine.on_card(&card("ffff0001"), opened, &masters(), &whitelist());

        let decision = machine.on_card(
            &card(hex),
            opened + Duration::from_secs(2),
            &masters(),
            &whitelist(),
        );

        assert_eq!(decision, Decision::Enroll);
        // Stays open until the target is persisted
        assert_eq!(machine.mode(), Mode::Enrollment { since: opened });

        machine.complete_enrollment();
        assert_eq!(machine.mode(), Mode::Normal);
    }

    #[rstest]
    #[case(Duration::ZERO)]
    #[case(Duration::from_secs(1))]
    #[case(Duration::from_millis(9_999))]
    fn test_tick_inside_window_keeps_enrollment(#[case] elapsed: Duration) {
        let mut machine = AccessStateMachine::new();
        let opened = Instant::now();
        machine.on_card(&card("ffff0001"), opened, &masters(), &whitelist());

        assert_eq!(machine.on_tick(opened + elapsed), Decision::Idle);
        assert!(!machine.mode().is_normal());
    }

    #[test]
    fn test_tick_exactly_at_window_keeps_enrollment() {
        let mut machine = AccessStateMachine::new();
        let opened = Instant::now();
        machine.on_card(&card("ffff0001"), opened, &masters(), &whitelist());

        assert_eq!(machine.on_tick(opened + ENROLL_TIMEOUT), Decision::Idle);
        assert_eq!(machine.mode(), Mode::Enrollment { since: opened });
    }

    #[test]
    fn test_tick_past_window_reverts_to_normal() {
        let mut machine = AccessStateMachine::new();
        let opened = Instant::now();
        machine.on_card(&card("ffff0001"), opened, &masters(), &whitelist());

        let later = opened + ENROLL_TIMEOUT + Duration::from_millis(1);
        assert_eq!(machine.on_tick(later), Decision::EnrollmentTimedOut);
        assert_eq!(machine.mode(), Mode::Normal);
    }

    #[test]
    fn test_card_after_window_before_tick_is_still_enrolled() {
        let mut machine = AccessStateMachine::new();
        let opened = Instant::now();
        machine.on_card(&card("ffff0001"), opened, &masters(), &whitelist());

        let late = opened + Duration::from_secs(15);
        assert_eq!(
            machine.on_card(&card("cc33dd44"), late, &masters(), &whitelist()),
            Decision::Enroll
        );
    }

    #[test]
    fn test_tick_in_normal_mode_is_idle() {
        let mut machine = AccessStateMachine::new();
        assert_eq!(machine.on_tick(Instant::now()), Decision::Idle);
        assert_eq!(machine.mode(), Mode::Normal);
    }

    #[test]
    fn test_complete_enrollment_in_normal_mode_is_noop() {
        let mut machine = AccessStateMachine::new();
        machine.complete_enrollment();
        assert_eq!(machine.mode(), Mode::Normal);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Normal.to_string(), "Normal");
        assert_eq!(
            Mode::Enrollment {
                since: Instant::now()
            }
            .to_string(),
            "Enrollment"
        );
    }
}
