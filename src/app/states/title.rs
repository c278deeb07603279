//! Title screen and main menu

use super::{draw_banner, draw_buttons, stage, Pending};
use crate::app::event::{Action, InputEvent};
use crate::app::{Context, GameState, StateKind, Store};
use crate::players::PlayerView;
use crate::render::{Color, RenderTarget, Size};

const LOGO: &str = "B U Z Z B O A R D";
const BUTTONS: [Action; 3] = [Action::Play, Action::HallOfFame, Action::Options];

#[derive(Default)]
pub struct TitleState {
    pending: Pending,
}

impl GameState for TitleState {
    fn kind(&self) -> StateKind {
        StateKind::Title
    }

    fn startup(&mut self, ctx: &mut Context) {
        ctx.players.reset();
    }

    fn handle_event(&mut self, event: &InputEvent, size: Size) {
        self.pending.record(event, size, &BUTTONS);
    }

    fn update(&mut self, ctx: &mut Context, _elapsed_ms: u64) -> StateKind {
        match self.pending.take() {
            Some(Action::Play) => {
                ctx.store.new_game();
                StateKind::Loading
            }
            Some(Action::HallOfFame) => StateKind::Hall,
            Some(Action::Options) => StateKind::Options,
            _ => StateKind::Title,
        }
    }

    fn draw(&self, target: &mut dyn RenderTarget, store: &Store, _players: &[PlayerView]) {
        draw_banner(target, LOGO, Color::Gold);
        let mode = if store.hosted { "hosted" } else { "self-judged" };
        let line = format!("{} players, {}", store.n_players, mode);
        let area = stage(target).centered(40, 3);
        target.draw_text(area, &line, Color::White);
        draw_buttons(target, &BUTTONS);
    }
}
