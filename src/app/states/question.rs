//! A regular clue: read it, open the buzzers, judge the response
//!
//! Self-judged games put Correct/Incorrect buttons in front of the operator.
//! Hosted games forward the expected response to the host and wait for a
//! verdict; a miss reopens the buzzers for everyone who has not yet missed.

use super::{draw_buttons, player_name, stage, Pending, RingIn, RingInEvent};
use crate::app::event::{Action, InputEvent};
use crate::app::{Context, GameState, StateKind, Store};
use crate::media::Effect;
use crate::network::Message;
use crate::players::{Eligible, PlayerId, PlayerView};
use crate::render::{Color, RenderTarget, Size};
use crate::stats::format_money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Reading,
    Open,
    Answering(PlayerId),
    /// Response shown; `judge` asks the operator for a verdict
    Revealed { judge: bool },
    /// Nobody rang in on a hosted game; any reply from the host moves on
    AwaitingHost,
    Done,
}

#[derive(Default)]
pub struct QuestionState {
    phase: Phase,
    ring: RingIn,
    pending: Pending,
    hosted: bool,
    host_lost: bool,
    times_up: bool,
    category: String,
    text: String,
    response: String,
    value: i64,
}

impl QuestionState {
    fn buttons(&self) -> Vec<Action> {
        match self.phase {
            Phase::Answering(_) if !self.hosted => vec![Action::MarkCorrect, Action::MarkIncorrect],
            Phase::Revealed { judge: true } => vec![Action::MarkCorrect, Action::MarkIncorrect],
            Phase::Revealed { judge: false } => vec![Action::Continue],
            _ => Vec::new(),
        }
    }

    fn no_answer(&mut self, ctx: &mut Context) {
        ctx.players.reset();
        if !self.ring.anyone_rang() {
            ctx.players.record_triple_stumper();
            tracing::info!(category = %self.category, value = self.value, "triple stumper");
        }
        if self.hosted {
            ctx.store.send_host(Message::Continue);
            self.phase = Phase::AwaitingHost;
        } else {
            ctx.media.sounds.play(Effect::TimesUp);
            self.times_up = true;
            self.phase = Phase::Revealed { judge: false };
        }
    }

    fn judge(&mut self, ctx: &mut Context, correct: bool) -> StateKind {
        ctx.players.update(correct, self.value, self.hosted);
        if !correct && self.hosted {
            self.ring.reopened(&ctx.players);
            self.times_up = false;
            let anyone_left = (0..ctx.players.player_count()).any(|id| ctx.players.is_eligible(id));
            if anyone_left {
                self.phase = Phase::Open;
            } else {
                self.no_answer(ctx);
            }
            return StateKind::Question;
        }
        self.finish(ctx)
    }

    fn finish(&mut self, ctx: &mut Context) -> StateKind {
        ctx.players.log_question_stats();
        ctx.players.reset();
        ctx.store.clue = None;
        self.phase = Phase::Done;
        StateKind::Board
    }
}

impl GameState for QuestionState {
    fn kind(&self) -> StateKind {
        StateKind::Question
    }

    fn startup(&mut self, ctx: &mut Context) {
        self.hosted = ctx.store.hosted;
        let Some(clue) = ctx.store.clue.clone() else {
            tracing::warn!("question without a clue");
            self.phase = Phase::Done;
            return;
        };
        self.category = clue.category;
        self.text = clue.clue;
        self.response = clue.response;
        self.value = clue.value;

        ctx.players.reset();
        ctx.players.log_clue();
        ctx.store.send_host(Message::Answer(self.response.clone()));
        ctx.media.speaker.speak(&self.text);
    }

    fn handle_event(&mut self, event: &InputEvent, size: Size) {
        self.pending.record(event, size, &self.buttons());
    }

    fn update(&mut self, ctx: &mut Context, elapsed_ms: u64) -> StateKind {
        let action = self.pending.take();
        if self.phase == Phase::Done {
            return StateKind::Board;
        }
        self.host_lost = !ctx.store.host_ready();
        if self.host_lost {
            return StateKind::Question;
        }

        match self.phase {
            Phase::Reading => {
                if !ctx.media.speaker.is_speaking() {
                    self.ring = RingIn::open(&ctx.players, Eligible::All);
                    self.phase = Phase::Open;
                }
            }
            Phase::Open => match self.ring.tick(&ctx.players, elapsed_ms) {
                RingInEvent::RangIn(id) => {
                    ctx.store.send_host(Message::RangIn);
                    self.phase = Phase::Answering(id);
                }
                RingInEvent::Expired => self.no_answer(ctx),
                _ => {}
            },
            Phase::Answering(_) => {
                if self.hosted {
                    if let Some(Message::Verdict(correct)) = ctx.store.poll_host() {
                        return self.judge(ctx, correct);
                    }
                } else {
                    match action {
                        Some(Action::MarkCorrect) => return self.judge(ctx, true),
                        Some(Action::MarkIncorrect) => return self.judge(ctx, false),
                        _ => {}
                    }
                }
                if let RingInEvent::ResponseExpired(id) = self.ring.tick(&ctx.players, elapsed_ms) {
                    tracing::info!(player = id, "response time expired");
                    ctx.media.sounds.play(Effect::TimesUp);
                    self.times_up = true;
                    if !self.hosted {
                        self.phase = Phase::Revealed { judge: true };
                    }
                }
            }
            Phase::Revealed { judge } => match action {
                Some(Action::Continue) if !judge => return self.finish(ctx),
                Some(Action::MarkCorrect) if judge => return self.judge(ctx, true),
                Some(Action::MarkIncorrect) if judge => return self.judge(ctx, false),
                _ => {}
            },
            Phase::AwaitingHost => {
                if ctx.store.poll_host().is_some() {
                    return self.finish(ctx);
                }
            }
            Phase::Done => return StateKind::Board,
        }
        StateKind::Question
    }

    fn draw(&self, target: &mut dyn RenderTarget, _store: &Store, _players: &[PlayerView]) {
        let area = stage(target).inset(4, 1);
        let (header, body) = area.split_top(3);
        let heading = format!("{}  {}", self.category, format_money(self.value));
        target.draw_text(header, &heading, Color::Gray);

        let (clue_area, footer) = body.split_bottom(9);
        target.draw_text(clue_area, &self.text, Color::White);

        let (status_area, _) = footer.split_top(4);
        let status = match self.phase {
            _ if self.host_lost => "Waiting for the host to reconnect".to_string(),
            Phase::Open => format!("{}", (self.ring.remaining_ms() + 999) / 1000),
            Phase::Answering(id) if self.times_up => format!("{}: time's up", player_name(id)),
            Phase::Answering(id) => format!(
                "{}  {}",
                player_name(id),
                (self.ring.remaining_ms() + 999) / 1000
            ),
            Phase::Revealed { .. } | Phase::AwaitingHost => {
                let mut text = self.response.clone();
                if self.times_up {
                    text = format!("Time's up! {}", text);
                }
                if self.phase == Phase::AwaitingHost {
                    text.push_str("\n(waiting for the host)");
                }
                text
            }
            _ => String::new(),
        };
        let color = match self.phase {
            Phase::Revealed { .. } | Phase::AwaitingHost => Color::Gold,
            _ => Color::White,
        };
        target.draw_text(status_area, &status, color);
        draw_buttons(target, &self.buttons());
    }

    fn shows_scores(&self) -> bool {
        true
    }
}
