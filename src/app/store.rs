//! Data carried across state transitions

use crate::clues::{Clue, GameData};
use crate::config::Config;
use crate::network::{HostLink, Message, RelayAdvertiser};
use crate::players::PlayerId;

pub struct Store {
    /// Zero-based regular round; `ROUNDS` once the board is finished
    pub round: usize,
    /// The clue in play
    pub clue: Option<Clue>,
    pub hosted: bool,
    pub n_players: usize,
    /// Players tied for first after the final clue
    pub candidates: Vec<PlayerId>,
    pub data: Option<GameData>,
    /// Winner of the game just finished
    pub winner: Option<PlayerId>,
    /// A game has ended and its results have not been shown yet
    pub game_over: bool,
    pub host: Option<Box<dyn HostLink>>,
    /// Port the host relay listens on, once started
    pub relay_port: Option<u16>,
    pub advertiser: Option<RelayAdvertiser>,
}

impl Store {
    pub fn new(config: &Config) -> Self {
        Self {
            round: 0,
            clue: None,
            hosted: config.hosted,
            n_players: config.players,
            candidates: Vec::new(),
            data: None,
            winner: None,
            game_over: false,
            host: None,
            relay_port: None,
            advertiser: None,
        }
    }

    /// Forget the previous game but keep options and the host link
    pub fn new_game(&mut self) {
        self.round = 0;
        self.clue = None;
        self.candidates.clear();
        self.data = None;
        self.winner = None;
        self.game_over = false;
    }

    /// Tell the host something; a no-op when unhosted
    pub fn send_host(&mut self, msg: Message) {
        if !self.hosted {
            return;
        }
        if let Some(host) = self.host.as_mut() {
            host.send(msg);
        }
    }

    pub fn poll_host(&mut self) -> Option<Message> {
        if !self.hosted {
            return None;
        }
        self.host.as_mut().and_then(|host| host.poll())
    }

    /// True unless the game is hosted and nobody is attached
    pub fn host_ready(&mut self) -> bool {
        if !self.hosted {
            return true;
        }
        self.host.as_mut().is_some_and(|host| host.poll_for_connection())
    }

    pub fn clue_value(&self) -> i64 {
        self.clue.as_ref().map(|c| c.value).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::testing::ScriptedHost;

    #[test]
    fn test_unhosted_never_talks_to_host() {
        let host = ScriptedHost::connected();
        let mut store = Store::new(&Config::default());
        store.host = Some(Box::new(host.clone()));
        host.reply(Message::Verdict(true));

        store.send_host(Message::RangIn);
        assert!(host.sent().is_empty());
        assert_eq!(store.poll_host(), None);
        assert!(store.host_ready());
    }

    #[test]
    fn test_hosted_waits_for_connection() {
        let host = ScriptedHost::default();
        let mut store = Store::new(&Config::default());
        store.hosted = true;
        assert!(!store.host_ready());

        store.host = Some(Box::new(host.clone()));
        assert!(!store.host_ready());
        host.set_connected(true);
        assert!(store.host_ready());

        store.send_host(Message::Continue);
        assert_eq!(host.sent(), vec![Message::Continue]);
    }

    #[test]
    fn test_new_game_keeps_options() {
        let mut store = Store::new(&Config::default());
        store.hosted = true;
        store.n_players = 4;
        store.round = 2;
        store.winner = Some(1);
        store.game_over = true;
        store.new_game();
        assert_eq!(store.round, 0);
        assert_eq!(store.winner, None);
        assert!(!store.game_over);
        assert!(store.hosted);
        assert_eq!(store.n_players, 4);
    }
}
