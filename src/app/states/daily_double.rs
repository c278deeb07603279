//! A daily double: only the player in control answers, for a typed wager

use super::{draw_banner, draw_buttons, player_name, stage, Pending, WagerInput};
use crate::app::event::{Action, InputEvent};
use crate::app::{Context, GameState, StateKind, Store};
use crate::media::Effect;
use crate::network::Message;
use crate::players::{PlayerId, PlayerView};
use crate::render::{Color, RenderTarget, Size};
use crate::stats::format_money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Fanfare,
    Wager,
    Reading,
    Thinking,
    Revealed,
    Done,
}

#[derive(Default)]
pub struct DailyDoubleState {
    phase: Phase,
    pending: Pending,
    input: WagerInput,
    player: PlayerId,
    wager: i64,
    remaining_ms: i64,
    hosted: bool,
    host_lost: bool,
    category: String,
    text: String,
    response: String,
}

impl DailyDoubleState {
    fn buttons(&self) -> Vec<Action> {
        match self.phase {
            Phase::Wager => vec![Action::Continue],
            Phase::Thinking if !self.hosted => vec![Action::MarkCorrect, Action::MarkIncorrect],
            Phase::Revealed => vec![Action::MarkCorrect, Action::MarkIncorrect],
            _ => Vec::new(),
        }
    }

    fn judge(&mut self, ctx: &mut Context, correct: bool) -> StateKind {
        ctx.players.answer_for(self.player, correct, self.wager);
        ctx.players.record_daily_double(self.player, self.wager, correct);
        ctx.players.log_question_stats();
        ctx.players.reset();
        ctx.store.clue = None;
        self.phase = Phase::Done;
        StateKind::Board
    }
}

impl GameState for DailyDoubleState {
    fn kind(&self) -> StateKind {
        StateKind::DailyDouble
    }

    fn startup(&mut self, ctx: &mut Context) {
        self.hosted = ctx.store.hosted;
        let Some(clue) = ctx.store.clue.clone() else {
            tracing::warn!("daily double without a clue");
            self.phase = Phase::Done;
            return;
        };
        self.category = clue.category;
        self.text = clue.clue;
        self.response = clue.response;
        self.player = ctx.players.control();

        ctx.players.reset();
        ctx.players.show_control();
        ctx.players.log_clue();
        ctx.media.sounds.play(Effect::DailyDouble);
        tracing::info!(player = self.player, "daily double");
    }

    fn handle_event(&mut self, event: &InputEvent, size: Size) {
        if self.pending.record(event, size, &self.buttons()) {
            return;
        }
        if self.phase == Phase::Wager {
            self.input.handle(event);
        }
    }

    fn update(&mut self, ctx: &mut Context, elapsed_ms: u64) -> StateKind {
        let action = self.pending.take();
        if self.phase == Phase::Done {
            return StateKind::Board;
        }
        self.host_lost = !ctx.store.host_ready();
        if self.host_lost {
            return StateKind::DailyDouble;
        }

        match self.phase {
            Phase::Fanfare => {
                if !ctx.media.sounds.is_playing() {
                    self.phase = Phase::Wager;
                }
            }
            Phase::Wager => {
                if action == Some(Action::Continue) {
                    match self.input.daily_double() {
                        Ok(wager) => {
                            self.wager = wager;
                            tracing::info!(player = self.player, wager, "daily double wager");
                            ctx.store.send_host(Message::Answer(self.response.clone()));
                            ctx.media.speaker.speak(&self.text);
                            self.phase = Phase::Reading;
                        }
                        Err(e) => tracing::debug!(error = %e, "wager refused"),
                    }
                }
            }
            Phase::Reading => {
                if !ctx.media.speaker.is_speaking() {
                    ctx.store.send_host(Message::RangIn);
                    self.remaining_ms = ctx.config.timing.daily_double_ms as i64;
                    self.phase = Phase::Thinking;
                }
            }
            Phase::Thinking => {
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
                if self.remaining_ms > 0 {
                    self.remaining_ms -= elapsed_ms as i64;
                    if self.remaining_ms <= 0 {
                        ctx.media.sounds.play(Effect::TimesUp);
                        if !self.hosted {
                            self.phase = Phase::Revealed;
                        }
                    }
                }
            }
            Phase::Revealed => match action {
                Some(Action::MarkCorrect) => return self.judge(ctx, true),
                Some(Action::MarkIncorrect) => return self.judge(ctx, false),
                _ => {}
            },
            Phase::Done => return StateKind::Board,
        }
        StateKind::DailyDouble
    }

    fn draw(&self, target: &mut dyn RenderTarget, _store: &Store, _players: &[PlayerView]) {
        if self.phase == Phase::Fanfare {
            draw_banner(target, "DAILY DOUBLE", Color::Gold);
            return;
        }
        let area = stage(target).inset(4, 1);
        let (header, body) = area.split_top(3);
        let heading = format!("DAILY DOUBLE  {}  {}", self.category, player_name(self.player));
        target.draw_text(header, &heading, Color::Gold);

        if self.phase == Phase::Wager {
            let prompt = format!("{}, enter your wager:\n\n{}", player_name(self.player), self.input.text());
            target.draw_text(body.centered(50, 5), &prompt, Color::White);
            if let Some(error) = self.input.error() {
                let (_, below) = body.split_bottom(7);
                target.draw_text(below.centered(50, 2), &error.to_string(), Color::Red);
            }
        } else {
            let (clue_area, footer) = body.split_bottom(9);
            target.draw_text(clue_area, &self.text, Color::White);
            let (status_area, _) = footer.split_top(4);
            let status = match self.phase {
                _ if self.host_lost => "Waiting for the host to reconnect".to_string(),
                Phase::Thinking if self.remaining_ms > 0 => format!(
                    "For {}  {}",
                    format_money(self.wager),
                    (self.remaining_ms + 999) / 1000
                ),
                Phase::Thinking => "Time's up! Waiting for the host".to_string(),
                Phase::Revealed => self.response.clone(),
                _ => format!("For {}", format_money(self.wager)),
            };
            target.draw_text(status_area, &status, Color::Gold);
        }
        draw_buttons(target, &self.buttons());
    }

    fn shows_scores(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing;
    use crate::app::states::WagerError;
    use crate::clues::tests::clue;
    use crate::network::testing::ScriptedHost;
    use crate::render::RecordingTarget;

    const SIZE: Size = Size { width: 100, height: 30 };

    fn type_text(state: &mut DailyDoubleState, text: &str) {
        for c in text.chars() {
            state.handle_event(&InputEvent::Key(c), SIZE);
        }
    }

    fn daily_double(hosted: bool) -> (Context, DailyDoubleState, ScriptedHost) {
        let mut ctx = testing::context(3);
        let host = ScriptedHost::connected();
        ctx.store.hosted = hosted;
        ctx.store.host = Some(Box::new(host.clone()));
        ctx.store.clue = Some(clue("SCIENCE", 800));
        ctx.players.answer_for(1, true, 1000);
        ctx.players.update_control();
        let mut state = DailyDoubleState::default();
        state.startup(&mut ctx);
        state.update(&mut ctx, 33);
        assert_eq!(state.phase, Phase::Wager);
        (ctx, state, host)
    }

    #[test]
    fn test_letters_are_refused_as_a_wager() {
        let (mut ctx, mut state, _host) = daily_double(false);
        let player = state.player;
        type_text(&mut state, "abc");
        state.handle_event(&InputEvent::Enter, SIZE);
        assert_eq!(state.update(&mut ctx, 33), StateKind::DailyDouble);
        assert_eq!(state.phase, Phase::Wager);
        assert_eq!(state.input.error(), Some(&WagerError::Empty));
        assert_eq!(ctx.players.score(player), Some(0));

        let mut target = RecordingTarget::new(SIZE.width, SIZE.height);
        state.draw(&mut target, &ctx.store, &[]);
        assert!(target.shows("enter a wager"));
    }

    #[test]
    fn test_self_judged_daily_double() {
        let (mut ctx, mut state, _host) = daily_double(false);
        let player = state.player;
        assert_eq!(player, ctx.players.control());
        type_text(&mut state, "500");
        state.handle_event(&InputEvent::Enter, SIZE);
        state.update(&mut ctx, 33);
        assert_eq!(state.phase, Phase::Reading);
        state.update(&mut ctx, 33);
        assert_eq!(state.phase, Phase::Thinking);

        state.handle_event(&InputEvent::Key('-'), SIZE);
        assert_eq!(state.update(&mut ctx, 33), StateKind::Board);
        assert_eq!(ctx.players.score(player), Some(-500));
        assert!(ctx.store.clue.is_none());
    }

    #[test]
    fn test_timeout_reveals_response() {
        let (mut ctx, mut state, _host) = daily_double(false);
        type_text(&mut state, "300");
        state.handle_event(&InputEvent::Enter, SIZE);
        state.update(&mut ctx, 33);
        state.update(&mut ctx, 33);
        let limit = ctx.config.timing.daily_double_ms;
        state.update(&mut ctx, limit);
        assert_eq!(state.phase, Phase::Revealed);

        let mut target = RecordingTarget::new(SIZE.width, SIZE.height);
        state.draw(&mut target, &ctx.store, &[]);
        assert!(target.shows("What is 800?"));

        state.handle_event(&InputEvent::Key('+'), SIZE);
        assert_eq!(state.update(&mut ctx, 33), StateKind::Board);
        assert_eq!(ctx.players.score(state.player), Some(300));
    }

    #[test]
    fn test_hosted_daily_double() {
        let (mut ctx, mut state, host) = daily_double(true);
        let player = state.player;
        type_text(&mut state, "1000");
        state.handle_event(&InputEvent::Enter, SIZE);
        state.update(&mut ctx, 33);
        state.update(&mut ctx, 33);
        assert_eq!(
            host.sent(),
            vec![Message::Answer("What is 800?".to_string()), Message::RangIn]
        );

        let limit = ctx.config.timing.daily_double_ms;
        state.update(&mut ctx, limit);
        assert_eq!(state.phase, Phase::Thinking);

        host.reply(Message::Verdict(true));
        assert_eq!(state.update(&mut ctx, 33), StateKind::Board);
        assert_eq!(ctx.players.score(player), Some(1000));
    }
}
