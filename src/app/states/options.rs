//! Hosted play and player count, kept for the session

use super::{draw_banner, draw_buttons, stage, Pending};
use crate::app::event::{Action, InputEvent};
use crate::app::{Context, GameState, StateKind, Store};
use crate::config::{MAX_PLAYERS, MIN_PLAYERS};
use crate::players::PlayerView;
use crate::render::{Color, RenderTarget, Size};

const BUTTONS: [Action; 3] = [Action::ToggleHosted, Action::CyclePlayers, Action::Back];

/// Player count after `current`, wrapping back to the minimum
pub fn next_player_count(current: usize) -> usize {
    if current >= MAX_PLAYERS {
        MIN_PLAYERS
    } else {
        (current + 1).max(MIN_PLAYERS)
    }
}

#[derive(Default)]
pub struct OptionsState {
    pending: Pending,
}

impl GameState for OptionsState {
    fn kind(&self) -> StateKind {
        StateKind::Options
    }

    fn handle_event(&mut self, event: &InputEvent, size: Size) {
        self.pending.record(event, size, &BUTTONS);
    }

    fn update(&mut self, ctx: &mut Context, _elapsed_ms: u64) -> StateKind {
        match self.pending.take() {
            Some(Action::ToggleHosted) => {
                ctx.store.hosted = !ctx.store.hosted;
                tracing::info!(hosted = ctx.store.hosted, "option changed");
            }
            Some(Action::CyclePlayers) => {
                ctx.store.n_players = next_player_count(ctx.store.n_players);
                tracing::info!(players = ctx.store.n_players, "option changed");
            }
            Some(Action::Back) => return StateKind::Title,
            _ => {}
        }
        StateKind::Options
    }

    fn draw(&self, target: &mut dyn RenderTarget, store: &Store, _players: &[PlayerView]) {
        draw_banner(target, "OPTIONS", Color::Gold);
        let lines = format!(
            "Hosted mode: {}\nPlayers: {}",
            if store.hosted { "on" } else { "off" },
            store.n_players
        );
        let area = stage(target).centered(40, 4);
        target.draw_text(area, &lines, Color::White);
        draw_buttons(target, &BUTTONS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing;

    #[test]
    fn test_player_count_cycles() {
        assert_eq!(next_player_count(2), 3);
        assert_eq!(next_player_count(4), 5);
        assert_eq!(next_player_count(5), 2);
        assert_eq!(next_player_count(0), 2);
    }

    #[test]
    fn test_toggles_apply_to_store() {
        let mut ctx = testing::context(3);
        let mut state = OptionsState::default();
        let size = Size::new(100, 30);

        state.handle_event(&InputEvent::Key('m'), size);
        assert_eq!(state.update(&mut ctx, 10), StateKind::Options);
        assert!(ctx.store.hosted);

        state.handle_event(&InputEvent::Key('n'), size);
        state.update(&mut ctx, 10);
        assert_eq!(ctx.store.n_players, 4);

        state.handle_event(&InputEvent::Key('b'), size);
        assert_eq!(state.update(&mut ctx, 10), StateKind::Title);
    }
}
