//! Buzzer arbitration
//!
//! The manager is the one authority on who may ring in, who rang in first,
//! how long is left, and who controls the board. Buzzer threads and the game
//! loop share it behind an `Arc`; every operation takes `&self` and runs under
//! a single roster lock, so "first writer wins" holds no matter how many
//! input sources race.

use super::buzzer::{IndicatorSink, NoopIndicator};
use super::player::{BuzzOutcome, Player, PlayerId, Press};
use crate::config::TimingConfig;
use crate::stats::BoxScore;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Countdowns used by the arbiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Shared ring-in window after the light goes green
    pub ring_in_ms: i64,
    /// Time the rung-in player has to respond
    pub response_ms: i64,
    /// Penalty for an early press
    pub lockout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self::from(&TimingConfig::default())
    }
}

impl From<&TimingConfig> for Timing {
    fn from(config: &TimingConfig) -> Self {
        Self {
            ring_in_ms: config.ring_in_ms as i64,
            response_ms: config.response_ms as i64,
            lockout: config.lockout(),
        }
    }
}

/// Who may ring in when the light goes green
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligible {
    All,
    Only(Vec<PlayerId>),
}

impl Eligible {
    fn includes(&self, id: PlayerId) -> bool {
        match self {
            Eligible::All => true,
            Eligible::Only(ids) => ids.contains(&id),
        }
    }
}

/// Read-only view of a player for drawing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub score: i64,
    pub eligible: bool,
    pub light: bool,
    pub has_control: bool,
    pub rang_in: bool,
}

struct Roster {
    players: Vec<Player>,
    rung_in: Option<PlayerId>,
    control: PlayerId,
    timer_ms: i64,
    green: bool,
    /// Set once `poll` has reported expiry for the current window
    expired: bool,
    /// Players who answered the current clue incorrectly
    missed: Vec<PlayerId>,
    triple_stumpers: u32,
}

impl Roster {
    fn empty() -> Self {
        Self {
            players: Vec::new(),
            rung_in: None,
            control: 0,
            timer_ms: 0,
            green: false,
            expired: false,
            missed: Vec::new(),
            triple_stumpers: 0,
        }
    }
}

/// An indicator change collected under the roster lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lamp {
    Go(bool),
    Player(PlayerId, bool),
}

pub struct PlayerManager {
    roster: Mutex<Roster>,
    indicators: Arc<dyn IndicatorSink>,
    timing: Timing,
}

impl PlayerManager {
    pub fn new(timing: Timing, indicators: Arc<dyn IndicatorSink>) -> Self {
        Self {
            roster: Mutex::new(Roster::empty()),
            indicators,
            timing,
        }
    }

    /// Manager with default timing, no lights and `count` players seated
    pub fn with_players(count: usize) -> Self {
        let manager = Self::new(Timing::default(), Arc::new(NoopIndicator));
        manager.initialize_players(count);
        manager
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    fn roster(&self) -> MutexGuard<'_, Roster> {
        // A panicking buzzer thread must not take the game down with it
        self.roster.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drive the indicator sink; callers release the roster lock first
    fn light(&self, lamps: Vec<Lamp>) {
        for lamp in lamps {
            match lamp {
                Lamp::Go(on) => self.indicators.go_light(on),
                Lamp::Player(id, on) => self.indicators.player_light(id, on),
            }
        }
    }

    /// Seat `count` fresh players; scores, stats and control start over
    pub fn initialize_players(&self, count: usize) {
        let mut roster = self.roster();
        *roster = Roster::empty();
        roster.players = (0..count).map(Player::new).collect();
        drop(roster);
        let mut lamps = vec![Lamp::Go(false)];
        lamps.extend((0..count).map(|id| Lamp::Player(id, false)));
        self.light(lamps);
        tracing::info!(players = count, "players seated");
    }

    pub fn player_count(&self) -> usize {
        self.roster().players.len()
    }

    pub fn zero_scores(&self) {
        for player in self.roster().players.iter_mut() {
            player.score = 0;
        }
    }

    /// Open the ring-in window for `eligible` players
    pub fn green_light(&self, eligible: Eligible) {
        let mut roster = self.roster();
        roster.rung_in = None;
        roster.timer_ms = self.timing.ring_in_ms;
        roster.expired = false;
        roster.missed.clear();
        for player in roster.players.iter_mut() {
            if eligible.includes(player.id) {
                player.set_eligible(true);
            }
        }
        roster.green = true;
        drop(roster);
        self.light(vec![Lamp::Go(true)]);
        tracing::debug!(?eligible, "green light");
    }

    pub fn is_green(&self) -> bool {
        self.roster().green
    }

    /// Close the window: nobody eligible, every light off
    pub fn reset(&self) {
        let mut roster = self.roster();
        roster.green = false;
        for player in roster.players.iter_mut() {
            player.set_eligible(false);
            player.set_light(false);
        }
        let mut lamps = vec![Lamp::Go(false)];
        lamps.extend(roster.players.iter().map(|p| Lamp::Player(p.id, false)));
        drop(roster);
        self.light(lamps);
    }

    /// A press from `id`'s buzzer
    pub fn buzz_in(&self, id: PlayerId) -> BuzzOutcome {
        self.buzz_in_at(id, Instant::now())
    }

    pub fn buzz_in_at(&self, id: PlayerId, now: Instant) -> BuzzOutcome {
        let mut roster = self.roster();
        let Some(player) = roster.players.get_mut(id) else {
            tracing::warn!(player = id, "press from unknown buzzer");
            return BuzzOutcome::Ignored;
        };
        let mut lamps = Vec::new();
        let outcome = match player.press(now, self.timing.lockout) {
            Press::Ignored => BuzzOutcome::Ignored,
            Press::LockedOut => {
                tracing::debug!(player = id, "locked out for early press");
                BuzzOutcome::LockedOut
            }
            Press::Eligible => {
                if self.ring_in_locked(&mut roster, id, &mut lamps) {
                    let player = &mut roster.players[id];
                    player.set_light(true);
                    player.stats.record_ring_in();
                    lamps.push(Lamp::Player(id, true));
                    BuzzOutcome::RangIn
                } else {
                    BuzzOutcome::Ignored
                }
            }
        };
        drop(roster);
        self.light(lamps);
        outcome
    }

    /// Record `id` as the sole rung-in player; false if someone beat them to it
    pub fn ring_in(&self, id: PlayerId) -> bool {
        let mut lamps = Vec::new();
        let rang_in = self.ring_in_locked(&mut self.roster(), id, &mut lamps);
        self.light(lamps);
        rang_in
    }

    fn ring_in_locked(&self, roster: &mut Roster, id: PlayerId, lamps: &mut Vec<Lamp>) -> bool {
        if roster.rung_in.is_some() || id >= roster.players.len() {
            return false;
        }
        roster.rung_in = Some(id);
        roster.expired = false;
        for player in roster.players.iter_mut() {
            player.set_eligible(false);
        }
        roster.players[id].reset_timer(self.timing.response_ms);
        lamps.push(Lamp::Go(false));
        tracing::info!(player = id, "rang in");
        true
    }

    pub fn rung_in(&self) -> Option<PlayerId> {
        self.roster().rung_in
    }

    /// Advance the active countdown by `elapsed_ms`.
    ///
    /// Before anyone rings in this is the shared window; afterwards it is the
    /// rung-in player's response timer. Returns true exactly once per window.
    pub fn poll(&self, elapsed_ms: u64) -> bool {
        let mut roster = self.roster();
        if roster.expired {
            return false;
        }
        let expired = match roster.rung_in {
            None => {
                roster.timer_ms -= elapsed_ms as i64;
                roster.timer_ms <= 0
            }
            Some(id) => roster.players[id].update_timer(elapsed_ms),
        };
        if expired {
            roster.expired = true;
        }
        expired
    }

    /// Milliseconds left on the active countdown
    pub fn remaining_ms(&self) -> i64 {
        let roster = self.roster();
        match roster.rung_in {
            None => roster.timer_ms.max(0),
            Some(id) => roster.players[id].timer_ms(),
        }
    }

    /// Judge the rung-in player's response.
    ///
    /// Correct answers take control of the board. In hosted mode an incorrect
    /// answer reopens the window for everyone who has not yet missed.
    pub fn update(&self, correct: bool, value: i64, hosted: bool) {
        let mut roster = self.roster();
        let Some(id) = roster.rung_in else {
            tracing::warn!("verdict with nobody rung in");
            return;
        };
        roster.players[id].answer_question(correct, value);
        let mut lamps = vec![Lamp::Player(id, false)];
        if correct {
            roster.control = id;
            roster.players[id].stats.record_correct();
        } else {
            if !roster.missed.contains(&id) {
                roster.missed.push(id);
            }
            if hosted {
                self.reopen(&mut roster, &mut lamps);
            }
        }
        roster.rung_in = None;
        let score = roster.players[id].score;
        drop(roster);
        self.light(lamps);
        tracing::info!(player = id, correct, value, score, "answer judged");
    }

    /// Reopen the window to everyone except those who already missed,
    /// including whoever is rung in now
    pub fn second_chance(&self) {
        let mut roster = self.roster();
        if let Some(id) = roster.rung_in.take() {
            if !roster.missed.contains(&id) {
                roster.missed.push(id);
            }
        }
        let mut lamps = Vec::new();
        self.reopen(&mut roster, &mut lamps);
        drop(roster);
        self.light(lamps);
    }

    fn reopen(&self, roster: &mut Roster, lamps: &mut Vec<Lamp>) {
        roster.timer_ms = self.timing.ring_in_ms;
        roster.expired = false;
        roster.green = true;
        let missed = roster.missed.clone();
        for player in roster.players.iter_mut() {
            player.set_eligible(!missed.contains(&player.id));
            player.set_light(false);
        }
        lamps.push(Lamp::Go(true));
        lamps.extend(roster.players.iter().map(|p| Lamp::Player(p.id, false)));
        tracing::debug!(?missed, "second chance");
    }

    /// Hand control to the strictly lowest score; ties go to the lowest seat
    pub fn update_control(&self) {
        let mut roster = self.roster();
        let mut lowest = i64::MAX;
        let mut control = roster.control;
        for player in roster.players.iter() {
            if player.score < lowest {
                lowest = player.score;
                control = player.id;
            }
        }
        roster.control = control;
        tracing::info!(player = control, "control to trailing player");
    }

    pub fn control(&self) -> PlayerId {
        self.roster().control
    }

    /// Light the controlling player's buzzer
    pub fn show_control(&self) {
        let mut roster = self.roster();
        let control = roster.control;
        let Some(player) = roster.players.get_mut(control) else {
            return;
        };
        player.set_light(true);
        drop(roster);
        self.light(vec![Lamp::Player(control, true)]);
    }

    /// Players tied for the highest positive score; empty if nobody is above zero
    pub fn get_winner(&self) -> Vec<PlayerId> {
        let roster = self.roster();
        let highest = roster.players.iter().map(|p| p.score).max().unwrap_or(0);
        if highest <= 0 {
            return Vec::new();
        }
        roster
            .players
            .iter()
            .filter(|p| p.score == highest)
            .map(|p| p.id)
            .collect()
    }

    /// Final-round reveal order: positive scores, lowest first
    pub fn sort_players(&self) -> Vec<PlayerId> {
        let roster = self.roster();
        let mut players: Vec<&Player> = roster.players.iter().filter(|p| p.score > 0).collect();
        players.sort_by_key(|p| p.score);
        players.into_iter().map(|p| p.id).collect()
    }

    /// Score a player directly, outside the ring-in cycle
    pub fn answer_for(&self, id: PlayerId, correct: bool, value: i64) {
        let mut roster = self.roster();
        if let Some(player) = roster.players.get_mut(id) {
            player.answer_question(correct, value);
            tracing::info!(player = id, correct, value, score = player.score, "wager judged");
        }
    }

    pub fn record_daily_double(&self, id: PlayerId, wager: i64, correct: bool) {
        if let Some(player) = self.roster().players.get_mut(id) {
            player.stats.record_daily_double(wager, correct);
        }
    }

    /// A clue has been presented
    pub fn log_clue(&self) {
        for player in self.roster().players.iter_mut() {
            player.stats.record_clue();
        }
    }

    /// The clue in play is finished
    pub fn log_question_stats(&self) {
        for player in self.roster().players.iter_mut() {
            player.stats.record_question();
        }
    }

    /// Nobody rang in on a clue
    pub fn record_triple_stumper(&self) {
        self.roster().triple_stumpers += 1;
    }

    pub fn triple_stumpers(&self) -> u32 {
        self.roster().triple_stumpers
    }

    pub fn score(&self, id: PlayerId) -> Option<i64> {
        self.roster().players.get(id).map(|p| p.score)
    }

    pub fn is_eligible(&self, id: PlayerId) -> bool {
        self.roster().players.get(id).is_some_and(|p| p.is_eligible())
    }

    /// Snapshot of every player for drawing
    pub fn snapshot(&self) -> Vec<PlayerView> {
        let roster = self.roster();
        roster
            .players
            .iter()
            .map(|p| PlayerView {
                id: p.id,
                score: p.score,
                eligible: p.is_eligible(),
                light: p.light(),
                has_control: p.id == roster.control,
                rang_in: roster.rung_in == Some(p.id),
            })
            .collect()
    }

    pub fn box_scores(&self) -> Vec<BoxScore> {
        self.roster()
            .players
            .iter()
            .map(|p| BoxScore::new(p.id, &p.stats, p.score))
            .collect()
    }
}
