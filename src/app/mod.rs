//! The game state machine
//!
//! Exactly one state is active. Each tick the driver forwards input to it,
//! advances it by the real elapsed time and draws it. A state asks for a
//! transition by returning another `StateKind` from `update`; the driver then
//! builds that state from scratch and runs its `startup`. Everything that must
//! survive a transition lives in the `Store` or the `PlayerManager`.

pub mod event;
pub mod states;
pub mod store;

pub use event::{Action, InputEvent};
pub use store::Store;

use crate::clues::QuestionSource;
use crate::config::Config;
use crate::media::Media;
use crate::players::{PlayerManager, PlayerView};
use crate::render::{Color, RenderTarget, Size};
use crate::storage::HallOfFame;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Title,
    Options,
    Loading,
    Intro,
    Board,
    Question,
    DailyDouble,
    Final,
    TieBreaker,
    Hall,
    Stats,
}

/// Everything a state may read or change
pub struct Context {
    pub store: Store,
    pub players: Arc<PlayerManager>,
    pub media: Media,
    pub hall: HallOfFame,
    pub source: Arc<dyn QuestionSource>,
    pub config: Config,
}

impl Context {
    pub fn new(
        config: Config,
        players: Arc<PlayerManager>,
        media: Media,
        hall: HallOfFame,
        source: Arc<dyn QuestionSource>,
    ) -> Self {
        Self {
            store: Store::new(&config),
            players,
            media,
            hall,
            source,
            config,
        }
    }
}

pub trait GameState {
    fn kind(&self) -> StateKind;

    /// Runs once when the state becomes active
    fn startup(&mut self, _ctx: &mut Context) {}

    /// Record input; the effect is applied on the next `update`
    fn handle_event(&mut self, event: &InputEvent, size: Size);

    /// Advance by `elapsed_ms`; returning another kind requests a transition
    fn update(&mut self, ctx: &mut Context, elapsed_ms: u64) -> StateKind;

    fn draw(&self, target: &mut dyn RenderTarget, store: &Store, players: &[PlayerView]);

    /// Whether the score strip is drawn under this state
    fn shows_scores(&self) -> bool {
        false
    }
}

pub struct Game {
    ctx: Context,
    state: Box<dyn GameState>,
    size: Size,
    quit: bool,
}

impl Game {
    pub fn new(ctx: Context) -> Self {
        Self::starting_at(ctx, StateKind::Title)
    }

    pub fn starting_at(mut ctx: Context, kind: StateKind) -> Self {
        let mut state = states::build(kind);
        state.startup(&mut ctx);
        Self {
            ctx,
            state,
            size: Size::new(80, 24),
            quit: false,
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Quit => self.quit = true,
            InputEvent::Buzz(id) => {
                let outcome = self.ctx.players.buzz_in(id);
                tracing::debug!(player = id, ?outcome, "keyboard buzz");
            }
            other => self.state.handle_event(&other, self.size),
        }
    }

    pub fn update(&mut self, elapsed_ms: u64) {
        let next = self.state.update(&mut self.ctx, elapsed_ms);
        if next != self.state.kind() {
            self.transition(next);
        }
    }

    fn transition(&mut self, next: StateKind) {
        tracing::info!(from = ?self.state.kind(), to = ?next, round = self.ctx.store.round, "state change");
        self.state = states::build(next);
        self.state.startup(&mut self.ctx);
    }

    pub fn draw(&self, target: &mut dyn RenderTarget) {
        target.clear(Color::Board);
        let players = self.ctx.players.snapshot();
        self.state.draw(target, &self.ctx.store, &players);
        if self.state.shows_scores() {
            states::draw_scores(target, &players);
        }
    }

    /// The surface size used to lay out clickable areas
    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    pub fn state(&self) -> StateKind {
        self.state.kind()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::clues::loader::LoadError;
    use crate::clues::{BankSource, Clue, GameData};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails a set number of times before serving from the bank
    pub struct FlakySource {
        failures_left: AtomicUsize,
        inner: BankSource,
    }

    impl FlakySource {
        pub fn failing(times: usize) -> Self {
            Self {
                failures_left: AtomicUsize::new(times),
                inner: BankSource::seeded(11),
            }
        }

        fn should_fail(&self) -> bool {
            self.failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    impl QuestionSource for FlakySource {
        fn fetch_game(&self) -> Result<GameData, LoadError> {
            if self.should_fail() {
                return Err(LoadError::Bank("scripted failure".to_string()));
            }
            self.inner.fetch_game()
        }

        fn fetch_single(&self) -> Result<Clue, LoadError> {
            if self.should_fail() {
                return Err(LoadError::Bank("scripted failure".to_string()));
            }
            self.inner.fetch_single()
        }
    }

    /// A context with no hardware, no sound and an in-memory hall of fame
    pub fn context(players: usize) -> Context {
        let mut config = Config::default();
        config.players = players;
        let mut ctx = Context::new(
            config,
            Arc::new(PlayerManager::with_players(players)),
            Media::silent(),
            HallOfFame::open_in_memory().unwrap(),
            Arc::new(BankSource::seeded(7)),
        );
        ctx.store.n_players = players;
        ctx
    }
}
