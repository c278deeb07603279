//! Best scores so far, and the winner's name entry after a game

use super::{draw_banner, draw_buttons, player_name, stage, Pending};
use crate::app::event::{Action, InputEvent};
use crate::app::{Context, GameState, StateKind, Store};
use crate::players::{PlayerId, PlayerView};
use crate::render::{Color, RenderTarget, Size};
use crate::stats::format_money;
use crate::storage::{HighScore, HALL_SIZE};

const MAX_NAME: usize = 12;

struct NameEntry {
    player: PlayerId,
    score: i64,
    name: String,
}

#[derive(Default)]
pub struct HallState {
    pending: Pending,
    entries: Vec<HighScore>,
    entry: Option<NameEntry>,
    highlight: Option<usize>,
}

impl HallState {
    fn buttons(&self) -> [Action; 1] {
        if self.entry.is_some() {
            [Action::SubmitName]
        } else {
            [Action::Continue]
        }
    }

    fn reload(&mut self, ctx: &Context) {
        self.entries = match ctx.hall.top(HALL_SIZE) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "could not read the hall of fame");
                Vec::new()
            }
        };
    }

    fn submit(&mut self, ctx: &mut Context) {
        let Some(entry) = self.entry.take() else {
            return;
        };
        let name = match entry.name.trim() {
            "" => player_name(entry.player),
            name => name.to_string(),
        };
        match ctx.hall.record(&name, entry.score) {
            Ok(place) => {
                tracing::info!(name = %name, score = entry.score, place, "hall of fame entry");
                self.highlight = (place < HALL_SIZE).then_some(place);
            }
            Err(e) => tracing::error!(error = %e, "could not save the high score"),
        }
        ctx.store.winner = None;
        self.reload(ctx);
    }
}

impl GameState for HallState {
    fn kind(&self) -> StateKind {
        StateKind::Hall
    }

    fn startup(&mut self, ctx: &mut Context) {
        ctx.players.reset();
        self.reload(ctx);
        if !ctx.store.game_over {
            return;
        }
        if let Some(player) = ctx.store.winner {
            let score = ctx.players.score(player).unwrap_or(0);
            self.entry = Some(NameEntry {
                player,
                score,
                name: String::new(),
            });
        }
    }

    fn handle_event(&mut self, event: &InputEvent, size: Size) {
        if self.pending.record(event, size, &self.buttons()) {
            return;
        }
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        match event {
            InputEvent::Key(c) if (c.is_alphanumeric() || *c == ' ') && entry.name.chars().count() < MAX_NAME => {
                entry.name.push(*c);
            }
            InputEvent::Backspace => {
                entry.name.pop();
            }
            _ => {}
        }
    }

    fn update(&mut self, ctx: &mut Context, _elapsed_ms: u64) -> StateKind {
        match self.pending.take() {
            Some(Action::SubmitName) => {
                self.submit(ctx);
                StateKind::Hall
            }
            Some(Action::Continue) if ctx.store.game_over => StateKind::Stats,
            Some(Action::Continue) => StateKind::Title,
            _ => StateKind::Hall,
        }
    }

    fn draw(&self, target: &mut dyn RenderTarget, _store: &Store, _players: &[PlayerView]) {
        draw_banner(target, "HALL OF FAME", Color::Gold);
        let area = stage(target).centered(40, (HALL_SIZE + 2) as u16);

        if let Some(entry) = &self.entry {
            let prompt = format!(
                "{} won with {}!\n\nName: {}_",
                player_name(entry.player),
                format_money(entry.score),
                entry.name
            );
            target.draw_text(area, &prompt, Color::White);
        } else if self.entries.is_empty() {
            target.draw_text(area, "No scores yet", Color::Gray);
        } else {
            for (place, entry) in self.entries.iter().enumerate() {
                let line = format!("{:>2}. {:<12} {:>10}", place + 1, entry.name, format_money(entry.score));
                let color = if self.highlight == Some(place) {
                    Color::Gold
                } else {
                    Color::White
                };
                target.draw_line(area.x, area.y + place as u16, &line, color);
            }
        }
        draw_buttons(target, &self.buttons());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing;
    use crate::render::RecordingTarget;

    const SIZE: Size = Size { width: 100, height: 30 };

    #[test]
    fn test_empty_hall_from_title() {
        let mut ctx = testing::context(3);
        let mut state = HallState::default();
        state.startup(&mut ctx);
        assert!(state.entry.is_none());

        let mut target = RecordingTarget::new(SIZE.width, SIZE.height);
        state.draw(&mut target, &ctx.store, &[]);
        assert!(target.shows("No scores yet"));

        state.handle_event(&InputEvent::Enter, SIZE);
        assert_eq!(state.update(&mut ctx, 33), StateKind::Title);
    }

    #[test]
    fn test_winner_enters_name() {
        let mut ctx = testing::context(3);
        ctx.hall.record("Ken", 5000).unwrap();
        ctx.hall.record("Brad", 200).unwrap();
        ctx.players.answer_for(2, true, 1400);
        ctx.store.winner = Some(2);
        ctx.store.game_over = true;

        let mut state = HallState::default();
        state.startup(&mut ctx);
        for c in "Annx".chars() {
            state.handle_event(&InputEvent::Key(c), SIZE);
        }
        state.handle_event(&InputEvent::Backspace, SIZE);
        state.handle_event(&InputEvent::Key('!'), SIZE);
        state.handle_event(&InputEvent::Enter, SIZE);
        assert_eq!(state.update(&mut ctx, 33), StateKind::Hall);

        assert!(state.entry.is_none());
        assert_eq!(state.highlight, Some(1));
        assert_eq!(state.entries[1].name, "Ann");
        assert_eq!(state.entries[1].score, 1400);
        assert_eq!(ctx.store.winner, None);

        let mut target = RecordingTarget::new(SIZE.width, SIZE.height);
        state.draw(&mut target, &ctx.store, &[]);
        assert!(target.shows("Ann"));
        assert!(target.shows("$5000"));

        state.handle_event(&InputEvent::Enter, SIZE);
        assert_eq!(state.update(&mut ctx, 33), StateKind::Stats);
    }

    #[test]
    fn test_blank_name_uses_seat() {
        let mut ctx = testing::context(2);
        ctx.players.answer_for(0, true, 600);
        ctx.store.winner = Some(0);
        ctx.store.game_over = true;

        let mut state = HallState::default();
        state.startup(&mut ctx);
        state.handle_event(&InputEvent::Enter, SIZE);
        state.update(&mut ctx, 33);
        assert_eq!(state.entries[0].name, "Player 1");
    }

    #[test]
    fn test_game_without_winner_skips_entry() {
        let mut ctx = testing::context(2);
        ctx.store.game_over = true;
        let mut state = HallState::default();
        state.startup(&mut ctx);
        assert!(state.entry.is_none());
        state.handle_event(&InputEvent::Enter, SIZE);
        assert_eq!(state.update(&mut ctx, 33), StateKind::Stats);
    }
}
