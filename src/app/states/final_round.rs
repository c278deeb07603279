//! The final clue
//!
//! Only players above zero take part. After the think music each of them, in
//! ascending score order, has a wager typed in and is judged right or wrong.

use super::wager::parse_final;
use super::{draw_banner, draw_buttons, player_name, stage, Pending, WagerInput};
use crate::app::event::{Action, InputEvent};
use crate::app::{Context, GameState, StateKind, Store};
use crate::clues::Clue;
use crate::media::Effect;
use crate::network::Message;
use crate::players::{PlayerId, PlayerView};
use crate::render::{Color, RenderTarget, Size};
use crate::stats::format_money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Category,
    Reading,
    Thinking,
    /// Judging `contestants[n]`
    Reveal(usize),
    Results,
}

#[derive(Default)]
pub struct FinalState {
    phase: Phase,
    pending: Pending,
    input: WagerInput,
    clue: Clue,
    contestants: Vec<PlayerId>,
    winners: Vec<PlayerId>,
    /// Host verdict for the current contestant, applied once a valid wager is typed
    held_verdict: Option<bool>,
    host_lost: bool,
}

impl FinalState {
    fn buttons(&self) -> Vec<Action> {
        match self.phase {
            Phase::Category | Phase::Results => vec![Action::Continue],
            Phase::Reveal(_) => vec![Action::MarkCorrect, Action::MarkIncorrect],
            _ => Vec::new(),
        }
    }

    fn current(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::Reveal(n) => self.contestants.get(n).copied(),
            _ => None,
        }
    }

    fn judge(&mut self, ctx: &mut Context, index: usize, correct: bool) {
        let Some(&id) = self.contestants.get(index) else {
            return;
        };
        let score = ctx.players.score(id).unwrap_or(0);
        let wager = match self.input.final_wager(score) {
            Ok(wager) => wager,
            Err(e) => {
                tracing::debug!(player = id, error = %e, "final wager refused");
                return;
            }
        };
        ctx.players.answer_for(id, correct, wager);
        self.input.clear();
        self.held_verdict = None;
        if index + 1 < self.contestants.len() {
            self.phase = Phase::Reveal(index + 1);
        } else {
            self.results(ctx);
        }
    }

    fn wager_ready(&self, ctx: &Context, index: usize) -> bool {
        let Some(&id) = self.contestants.get(index) else {
            return false;
        };
        let score = ctx.players.score(id).unwrap_or(0);
        parse_final(self.input.text(), score).is_ok()
    }

    fn results(&mut self, ctx: &mut Context) {
        ctx.players.log_question_stats();
        self.winners = ctx.players.get_winner();
        match self.winners.as_slice() {
            [] => {
                tracing::info!("game over with no winner");
                ctx.store.game_over = true;
            }
            [winner] => {
                tracing::info!(player = winner, "game won");
                ctx.store.winner = Some(*winner);
                ctx.store.game_over = true;
            }
            tied => {
                tracing::info!(players = ?tied, "tie for first");
                ctx.store.candidates = tied.to_vec();
            }
        }
        self.phase = Phase::Results;
    }
}

impl GameState for FinalState {
    fn kind(&self) -> StateKind {
        StateKind::Final
    }

    fn startup(&mut self, ctx: &mut Context) {
        ctx.players.reset();
        self.contestants = ctx.players.sort_players();
        self.clue = ctx.store.data.as_ref().map(|d| d.final_clue.clone()).unwrap_or_default();
        ctx.store.clue = Some(self.clue.clone());
        ctx.players.log_clue();
        if self.contestants.is_empty() {
            self.results(ctx);
        }
    }

    fn handle_event(&mut self, event: &InputEvent, size: Size) {
        if self.pending.record(event, size, &self.buttons()) {
            return;
        }
        if matches!(self.phase, Phase::Reveal(_)) {
            self.input.handle(event);
        }
    }

    fn update(&mut self, ctx: &mut Context, _elapsed_ms: u64) -> StateKind {
        let action = self.pending.take();
        self.host_lost = !ctx.store.host_ready();
        if self.host_lost {
            return StateKind::Final;
        }

        match self.phase {
            Phase::Category => {
                if action == Some(Action::Continue) {
                    ctx.store.send_host(Message::Answer(self.clue.response.clone()));
                    ctx.media.speaker.speak(&self.clue.clue);
                    self.phase = Phase::Reading;
                }
            }
            Phase::Reading => {
                if !ctx.media.speaker.is_speaking() {
                    ctx.media.sounds.play(Effect::Think);
                    self.phase = Phase::Thinking;
                }
            }
            Phase::Thinking => {
                if !ctx.media.sounds.is_playing() {
                    self.input.clear();
                    self.phase = Phase::Reveal(0);
                }
            }
            Phase::Reveal(index) => {
                if self.held_verdict.is_none() {
                    if let Some(Message::Verdict(correct)) = ctx.store.poll_host() {
                        tracing::debug!(index, correct, "host verdict waiting on the wager");
                        self.held_verdict = Some(correct);
                    }
                }
                match (action, self.held_verdict) {
                    (Some(Action::MarkCorrect), _) => self.judge(ctx, index, true),
                    (Some(Action::MarkIncorrect), _) => self.judge(ctx, index, false),
                    (_, Some(correct)) if self.wager_ready(ctx, index) => self.judge(ctx, index, correct),
                    _ => {}
                }
            }
            Phase::Results => {
                if action == Some(Action::Continue) {
                    ctx.store.clue = None;
                    return if self.winners.len() > 1 {
                        StateKind::TieBreaker
                    } else {
                        StateKind::Hall
                    };
                }
            }
        }
        StateKind::Final
    }

    fn draw(&self, target: &mut dyn RenderTarget, _store: &Store, players: &[PlayerView]) {
        if self.host_lost {
            draw_banner(target, "Waiting for the host to reconnect", Color::White);
            return;
        }
        let area = stage(target).inset(4, 1);
        let (header, body) = area.split_top(3);
        target.draw_text(header, "FINAL ROUND", Color::Gold);

        match self.phase {
            Phase::Category => {
                target.draw_text(body.centered(60, 5), &self.clue.category, Color::White);
            }
            Phase::Reading | Phase::Thinking => {
                target.draw_text(body, &self.clue.clue, Color::White);
            }
            Phase::Reveal(_) => {
                let (clue_area, footer) = body.split_bottom(9);
                target.draw_text(clue_area, &self.clue.response, Color::Gold);
                if let Some(id) = self.current() {
                    let score = players.iter().find(|p| p.id == id).map(|p| p.score);
                    let mut prompt = format!("{}  wager: {}", player_name(id), self.input.text());
                    if let Some(score) = score {
                        prompt.push_str(&format!("  (up to {})", format_money(score.max(0))));
                    }
                    if let Some(error) = self.input.error() {
                        prompt.push('\n');
                        prompt.push_str(&error.to_string());
                    }
                    if let Some(correct) = self.held_verdict {
                        let verdict = if correct { "correct" } else { "incorrect" };
                        prompt.push_str(&format!("\nHost says {verdict}, enter the wager"));
                    }
                    let (prompt_area, _) = footer.split_top(4);
                    target.draw_text(prompt_area, &prompt, Color::White);
                }
            }
            Phase::Results => {
                let text = match self.winners.as_slice() {
                    [] => "No winner this time".to_string(),
                    [winner] => format!("{} wins!", player_name(*winner)),
                    tied => {
                        let names: Vec<String> = tied.iter().map(|id| player_name(*id)).collect();
                        format!("Tie between {}", names.join(" and "))
                    }
                };
                target.draw_text(body.centered(60, 5), &text, Color::Gold);
            }
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
    use crate::app::states::WagerError;
    use crate::app::testing;
    use crate::clues::tests::game_data;
    use crate::network::testing::ScriptedHost;
    use crate::render::RecordingTarget;

    const SIZE: Size = Size { width: 100, height: 30 };

    fn final_with_scores(scores: &[i64]) -> (Context, FinalState) {
        let mut ctx = testing::context(scores.len());
        ctx.store.data = Some(game_data());
        for (id, score) in scores.iter().enumerate() {
            ctx.players.answer_for(id, true, *score);
        }
        let mut state = FinalState::default();
        state.startup(&mut ctx);
        (ctx, state)
    }

    fn to_reveal(ctx: &mut Context, state: &mut FinalState) {
        state.handle_event(&InputEvent::Enter, SIZE);
        state.update(ctx, 33);
        assert_eq!(state.phase, Phase::Reading);
        state.update(ctx, 33);
        assert_eq!(state.phase, Phase::Thinking);
        state.update(ctx, 33);
        assert_eq!(state.phase, Phase::Reveal(0));
    }

    fn wager(ctx: &mut Context, state: &mut FinalState, amount: &str, key: char) {
        for c in amount.chars() {
            state.handle_event(&InputEvent::Key(c), SIZE);
        }
        state.handle_event(&InputEvent::Key(key), SIZE);
        state.update(ctx, 33);
    }

    #[test]
    fn test_reveal_in_ascending_order() {
        let (mut ctx, mut state) = final_with_scores(&[0, 500, 200]);
        assert_eq!(state.contestants, vec![2, 1]);
        to_reveal(&mut ctx, &mut state);
        assert_eq!(state.current(), Some(2));

        wager(&mut ctx, &mut state, "200", '-');
        assert_eq!(ctx.players.score(2), Some(0));
        assert_eq!(state.current(), Some(1));

        wager(&mut ctx, &mut state, "100", '+');
        assert_eq!(ctx.players.score(1), Some(600));
        assert_eq!(state.phase, Phase::Results);
        assert_eq!(ctx.store.winner, Some(1));
        assert!(ctx.store.game_over);

        let mut target = RecordingTarget::new(SIZE.width, SIZE.height);
        state.draw(&mut target, &ctx.store, &ctx.players.snapshot());
        assert!(target.shows("Player 2 wins!"));

        state.handle_event(&InputEvent::Enter, SIZE);
        assert_eq!(state.update(&mut ctx, 33), StateKind::Hall);
    }

    #[test]
    fn test_oversized_wager_refused() {
        let (mut ctx, mut state) = final_with_scores(&[200, 0]);
        to_reveal(&mut ctx, &mut state);
        wager(&mut ctx, &mut state, "999", '+');
        assert_eq!(state.phase, Phase::Reveal(0));
        assert_eq!(state.input.error(), Some(&WagerError::TooLarge { max: 200 }));
        assert_eq!(ctx.players.score(0), Some(200));
    }

    #[test]
    fn test_tie_goes_to_tie_breaker() {
        let (mut ctx, mut state) = final_with_scores(&[300, 300, 0]);
        to_reveal(&mut ctx, &mut state);
        wager(&mut ctx, &mut state, "0", '+');
        wager(&mut ctx, &mut state, "0", '-');
        assert_eq!(state.phase, Phase::Results);
        assert_eq!(ctx.store.candidates, vec![0, 1]);
        assert!(!ctx.store.game_over);

        state.handle_event(&InputEvent::Enter, SIZE);
        assert_eq!(state.update(&mut ctx, 33), StateKind::TieBreaker);
    }

    #[test]
    fn test_host_verdict_waits_for_wager() {
        let (mut ctx, mut state) = final_with_scores(&[1000, 0]);
        let host = ScriptedHost::connected();
        ctx.store.hosted = true;
        ctx.store.host = Some(Box::new(host.clone()));
        to_reveal(&mut ctx, &mut state);

        host.reply(Message::Verdict(true));
        state.update(&mut ctx, 33);
        assert_eq!(state.phase, Phase::Reveal(0));
        assert_eq!(state.held_verdict, Some(true));
        assert_eq!(ctx.players.score(0), Some(1000));

        let mut target = RecordingTarget::new(SIZE.width, SIZE.height);
        state.draw(&mut target, &ctx.store, &ctx.players.snapshot());
        assert!(target.shows("Host says correct"));

        for c in "5000".chars() {
            state.handle_event(&InputEvent::Key(c), SIZE);
        }
        state.update(&mut ctx, 33);
        assert_eq!(state.phase, Phase::Reveal(0));
        assert_eq!(ctx.players.score(0), Some(1000));

        state.handle_event(&InputEvent::Backspace, SIZE);
        state.update(&mut ctx, 33);
        assert_eq!(ctx.players.score(0), Some(1500));
        assert_eq!(state.held_verdict, None);
        assert_eq!(state.phase, Phase::Results);
        assert_eq!(ctx.store.winner, Some(0));
    }

    #[test]
    fn test_host_verdict_after_wager_applies_at_once() {
        let (mut ctx, mut state) = final_with_scores(&[300, 800]);
        let host = ScriptedHost::connected();
        ctx.store.hosted = true;
        ctx.store.host = Some(Box::new(host.clone()));
        to_reveal(&mut ctx, &mut state);

        for c in "300".chars() {
            state.handle_event(&InputEvent::Key(c), SIZE);
        }
        host.reply(Message::Verdict(false));
        state.update(&mut ctx, 33);
        assert_eq!(ctx.players.score(0), Some(0));
        assert_eq!(state.phase, Phase::Reveal(1));
        assert_eq!(state.held_verdict, None);
    }

    #[test]
    fn test_nobody_above_zero() {
        let (mut ctx, mut state) = final_with_scores(&[0, -400]);
        assert_eq!(state.phase, Phase::Results);
        assert!(ctx.store.game_over);
        assert_eq!(ctx.store.winner, None);
        state.handle_event(&InputEvent::Enter, SIZE);
        assert_eq!(state.update(&mut ctx, 33), StateKind::Hall);
    }
}
