//! Watching a ring-in window from the game loop

use crate::players::{Eligible, PlayerId, PlayerManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingInEvent {
    /// Nothing new this tick
    Waiting,
    RangIn(PlayerId),
    /// The window closed with nobody rung in
    Expired,
    /// The rung-in player ran out of time
    ResponseExpired(PlayerId),
}

/// Tracks one clue's ring-in windows as seen by the loop
#[derive(Debug, Default)]
pub struct RingIn {
    responder: Option<PlayerId>,
    anyone_rang: bool,
    remaining_ms: i64,
}

impl RingIn {
    pub fn open(players: &PlayerManager, eligible: Eligible) -> Self {
        players.green_light(eligible);
        Self {
            responder: None,
            anyone_rang: false,
            remaining_ms: players.remaining_ms(),
        }
    }

    /// Advance the arbiter's countdown and report what changed
    pub fn tick(&mut self, players: &PlayerManager, elapsed_ms: u64) -> RingInEvent {
        let rung = players.rung_in();
        if let Some(id) = rung {
            if self.responder != Some(id) {
                self.responder = Some(id);
                self.anyone_rang = true;
                self.remaining_ms = players.remaining_ms();
                return RingInEvent::RangIn(id);
            }
        }
        let expired = players.poll(elapsed_ms);
        self.remaining_ms = players.remaining_ms();
        match (expired, rung) {
            (false, _) => RingInEvent::Waiting,
            (true, None) => RingInEvent::Expired,
            (true, Some(id)) => RingInEvent::ResponseExpired(id),
        }
    }

    /// The window was reopened after a miss
    pub fn reopened(&mut self, players: &PlayerManager) {
        self.responder = None;
        self.remaining_ms = players.remaining_ms();
    }

    pub fn responder(&self) -> Option<PlayerId> {
        self.responder
    }

    pub fn anyone_rang(&self) -> bool {
        self.anyone_rang
    }

    pub fn remaining_ms(&self) -> i64 {
        self.remaining_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_with_nobody() {
        let players = PlayerManager::with_players(3);
        let mut window = RingIn::open(&players, Eligible::All);
        assert_eq!(window.tick(&players, 4000), RingInEvent::Waiting);
        assert_eq!(window.tick(&players, 1000), RingInEvent::Expired);
        assert_eq!(window.tick(&players, 1000), RingInEvent::Waiting);
        assert!(!window.anyone_rang());
    }

    #[test]
    fn test_ring_in_then_response_timer() {
        let players = PlayerManager::with_players(3);
        let mut window = RingIn::open(&players, Eligible::All);
        players.buzz_in(1);
        assert_eq!(window.tick(&players, 33), RingInEvent::RangIn(1));
        assert_eq!(window.responder(), Some(1));
        assert_eq!(window.tick(&players, 4999), RingInEvent::Waiting);
        assert_eq!(window.tick(&players, 1), RingInEvent::ResponseExpired(1));
    }

    #[test]
    fn test_reopened_window_reports_next_ring_in() {
        let players = PlayerManager::with_players(3);
        let mut window = RingIn::open(&players, Eligible::All);
        players.buzz_in(0);
        window.tick(&players, 10);
        players.update(false, 200, true);
        window.reopened(&players);
        assert_eq!(window.responder(), None);

        players.buzz_in(2);
        assert_eq!(window.tick(&players, 10), RingInEvent::RangIn(2));
        assert!(window.anyone_rang());
    }
}
