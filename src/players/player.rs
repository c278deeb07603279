//! A single contestant: score, buzzer eligibility, lock-out and response timer

use crate::stats::PlayerStats;
use std::time::{Duration, Instant};

/// Zero-based seat number
pub type PlayerId = usize;

/// What happened when a player pressed their buzzer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzOutcome {
    /// The press won the buzzer
    RangIn,
    /// Pressed before the light went green; barred for the lock-out period
    LockedOut,
    /// Pressed while already locked out, or after someone else won
    Ignored,
}

/// Result of [`Player::press`], before the arbiter has a say
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Press {
    Eligible,
    LockedOut,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    /// Current score; may go negative
    pub score: i64,
    pub stats: PlayerStats,
    eligible: bool,
    locked_until: Option<Instant>,
    timer_ms: i64,
    light: bool,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            score: 0,
            stats: PlayerStats::default(),
            eligible: false,
            locked_until: None,
            timer_ms: 0,
            light: false,
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.eligible
    }

    pub fn set_eligible(&mut self, eligible: bool) {
        self.eligible = eligible;
    }

    pub fn is_locked_out(&self, now: Instant) -> bool {
        matches!(self.locked_until, Some(until) if now < until)
    }

    pub fn light(&self) -> bool {
        self.light
    }

    pub fn set_light(&mut self, on: bool) {
        self.light = on;
    }

    /// Handle a physical press.
    ///
    /// An eligible player who is not locked out may ring in. A player who is
    /// neither eligible nor locked out jumped the gun and is locked out for
    /// `lockout`. Presses during a lock-out are ignored and do not extend it.
    pub(crate) fn press(&mut self, now: Instant, lockout: Duration) -> Press {
        self.stats.record_buzzer();
        if self.is_locked_out(now) {
            return Press::Ignored;
        }
        if self.eligible {
            Press::Eligible
        } else {
            self.locked_until = Some(now + lockout);
            Press::LockedOut
        }
    }

    /// Apply the clue's value and close out this player's turn
    pub fn answer_question(&mut self, correct: bool, value: i64) {
        if correct {
            self.score += value;
        } else {
            self.score -= value;
        }
        self.eligible = false;
        self.light = false;
    }

    /// Start the response countdown
    pub fn reset_timer(&mut self, ms: i64) {
        self.timer_ms = ms;
    }

    /// Count down the response timer; true once it has run out
    pub fn update_timer(&mut self, elapsed_ms: u64) -> bool {
        self.timer_ms -= elapsed_ms as i64;
        self.timer_ms <= 0
    }

    pub fn timer_ms(&self) -> i64 {
        self.timer_ms.max(0)
    }
}
