//! Sudden death between players tied for first
//!
//! A fresh clue is fetched for every attempt. Only the tied players may ring
//! in; a miss or an unanswered clue brings the next one.

use super::{draw_banner, draw_buttons, player_name, stage, Pending, RingIn, RingInEvent};
use crate::app::event::{Action, InputEvent};
use crate::app::{Context, GameState, StateKind, Store};
use crate::clues::{Clue, FetchStatus, FetchTask};
use crate::media::Effect;
use crate::network::Message;
use crate::players::{Eligible, PlayerId, PlayerView};
use crate::render::{Color, RenderTarget, Size};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Fetching,
    Category,
    Reading,
    Open,
    Answering(PlayerId),
    Revealed,
    Won(PlayerId),
}

#[derive(Default)]
pub struct TieBreakerState {
    phase: Phase,
    pending: Pending,
    fetch: Option<FetchTask<Clue>>,
    failures: u32,
    attempts: u32,
    clue: Clue,
    candidates: Vec<PlayerId>,
    ring: RingIn,
    hosted: bool,
    host_lost: bool,
}

impl TieBreakerState {
    fn buttons(&self) -> Vec<Action> {
        match self.phase {
            Phase::Category | Phase::Won(_) => vec![Action::Continue],
            Phase::Answering(_) if !self.hosted => vec![Action::MarkCorrect, Action::MarkIncorrect],
            Phase::Revealed => vec![Action::MarkCorrect, Action::MarkIncorrect],
            _ => Vec::new(),
        }
    }

    fn spawn_fetch(&mut self, ctx: &Context, delay: Duration) {
        let source = Arc::clone(&ctx.source);
        self.fetch = Some(FetchTask::spawn_after(delay, move || source.fetch_single()));
        self.phase = Phase::Fetching;
    }

    fn next_clue(&mut self, ctx: &mut Context) {
        ctx.players.reset();
        ctx.players.log_question_stats();
        self.spawn_fetch(ctx, Duration::ZERO);
    }

    fn judge(&mut self, ctx: &mut Context, id: PlayerId, correct: bool) {
        ctx.players.update(correct, 0, false);
        if correct {
            tracing::info!(player = id, attempts = self.attempts, "tie broken");
            ctx.players.reset();
            ctx.players.log_question_stats();
            ctx.store.winner = Some(id);
            ctx.store.game_over = true;
            ctx.store.candidates.clear();
            self.phase = Phase::Won(id);
        } else {
            tracing::info!(player = id, "tie-break miss, next clue");
            self.next_clue(ctx);
        }
    }
}

impl GameState for TieBreakerState {
    fn kind(&self) -> StateKind {
        StateKind::TieBreaker
    }

    fn startup(&mut self, ctx: &mut Context) {
        self.hosted = ctx.store.hosted;
        self.candidates = ctx.store.candidates.clone();
        if self.candidates.is_empty() {
            self.candidates = ctx.players.get_winner();
        }
        ctx.players.reset();
        tracing::info!(players = ?self.candidates, "tie-breaker");
        self.spawn_fetch(ctx, Duration::ZERO);
    }

    fn handle_event(&mut self, event: &InputEvent, size: Size) {
        self.pending.record(event, size, &self.buttons());
    }

    fn update(&mut self, ctx: &mut Context, elapsed_ms: u64) -> StateKind {
        let action = self.pending.take();
        if let Phase::Won(_) = self.phase {
            return match action {
                Some(Action::Continue) => StateKind::Hall,
                _ => StateKind::TieBreaker,
            };
        }
        self.host_lost = !ctx.store.host_ready();
        if self.host_lost {
            return StateKind::TieBreaker;
        }

        match self.phase {
            Phase::Fetching => {
                let status = match self.fetch.as_mut() {
                    Some(task) => task.poll(),
                    None => FetchStatus::Pending,
                };
                match status {
                    FetchStatus::Ready(clue) => {
                        self.fetch = None;
                        self.attempts += 1;
                        self.clue = clue;
                        ctx.store.clue = Some(self.clue.clone());
                        ctx.players.log_clue();
                        self.phase = Phase::Category;
                    }
                    FetchStatus::Failed(e) => {
                        self.failures += 1;
                        tracing::warn!(error = %e, attempt = self.failures, "tie-break fetch failed, retrying");
                        self.spawn_fetch(ctx, ctx.config.timing.retry());
                    }
                    FetchStatus::Pending => {}
                }
            }
            Phase::Category => {
                if action == Some(Action::Continue) {
                    ctx.store.send_host(Message::Answer(self.clue.response.clone()));
                    ctx.media.speaker.speak(&self.clue.clue);
                    self.phase = Phase::Reading;
                }
            }
            Phase::Reading => {
                if !ctx.media.speaker.is_speaking() {
                    self.ring = RingIn::open(&ctx.players, Eligible::Only(self.candidates.clone()));
                    self.phase = Phase::Open;
                }
            }
            Phase::Open => match self.ring.tick(&ctx.players, elapsed_ms) {
                RingInEvent::RangIn(id) => {
                    ctx.store.send_host(Message::RangIn);
                    self.phase = Phase::Answering(id);
                }
                RingInEvent::Expired => {
                    tracing::info!("nobody rang in on the tie-breaker");
                    ctx.media.sounds.play(Effect::TimesUp);
                    ctx.store.send_host(Message::Continue);
                    self.next_clue(ctx);
                }
                _ => {}
            },
            Phase::Answering(id) => {
                let verdict = if self.hosted {
                    match ctx.store.poll_host() {
                        Some(Message::Verdict(correct)) => Some(correct),
                        _ => None,
                    }
                } else {
                    match action {
                        Some(Action::MarkCorrect) => Some(true),
                        Some(Action::MarkIncorrect) => Some(false),
                        _ => None,
                    }
                };
                if let Some(correct) = verdict {
                    self.judge(ctx, id, correct);
                } else if let RingInEvent::ResponseExpired(_) = self.ring.tick(&ctx.players, elapsed_ms) {
                    ctx.media.sounds.play(Effect::TimesUp);
                    if !self.hosted {
                        self.phase = Phase::Revealed;
                    }
                }
            }
            Phase::Revealed => {
                if let Some(id) = self.ring.responder() {
                    match action {
                        Some(Action::MarkCorrect) => self.judge(ctx, id, true),
                        Some(Action::MarkIncorrect) => self.judge(ctx, id, false),
                        _ => {}
                    }
                }
            }
            Phase::Won(_) => {}
        }
        StateKind::TieBreaker
    }

    fn draw(&self, target: &mut dyn RenderTarget, _store: &Store, _players: &[PlayerView]) {
        draw_banner(target, "TIE-BREAKER", Color::Gold);
        let area = stage(target).inset(4, 1);
        let (_, body) = area.split_top(6);
        let text = match self.phase {
            _ if self.host_lost => "Waiting for the host to reconnect".to_string(),
            Phase::Fetching if self.failures > 0 => format!("Fetching a clue (attempt {})", self.failures + 1),
            Phase::Fetching => "Fetching a clue".to_string(),
            Phase::Category => self.clue.category.clone(),
            Phase::Reading => self.clue.clue.clone(),
            Phase::Open => format!("{}\n\n{}", self.clue.clue, (self.ring.remaining_ms() + 999) / 1000),
            Phase::Answering(id) => format!("{}\n\n{}", self.clue.clue, player_name(id)),
            Phase::Revealed => self.clue.response.clone(),
            Phase::Won(id) => format!("{} wins!\n\n{}", player_name(id), self.clue.response),
        };
        target.draw_text(body, &text, Color::White);
        draw_buttons(target, &self.buttons());
    }

    fn shows_scores(&self) -> bool {
        true
    }
}
