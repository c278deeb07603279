//! Players, buzzers and the ring-in arbiter

pub mod buzzer;
pub mod manager;
pub mod player;

pub use buzzer::{open_source, BuzzerSource, IndicatorSink, MockBuzzers, NoopIndicator};
pub use manager::{Eligible, PlayerManager, PlayerView, Timing};
pub use player::{BuzzOutcome, Player, PlayerId};
