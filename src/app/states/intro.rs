//! Announces the round's categories one at a time before the board

use super::{draw_banner, stage};
use crate::app::event::InputEvent;
use crate::app::{Context, GameState, StateKind, Store};
use crate::players::PlayerView;
use crate::render::{Color, RenderTarget, Size};

const LEAD: &str = "The categories are";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Step {
    #[default]
    Lead,
    Category(usize),
}

#[derive(Default)]
pub struct IntroState {
    step: Step,
    dwell_ms: u64,
    categories: Vec<(String, String)>,
    announcements: Vec<String>,
    round: usize,
    skip: bool,
}

impl GameState for IntroState {
    fn kind(&self) -> StateKind {
        StateKind::Intro
    }

    fn startup(&mut self, ctx: &mut Context) {
        ctx.players.reset();
        self.round = ctx.store.round;
        if let Some(round) = ctx.store.data.as_ref().and_then(|d| d.round(ctx.store.round)) {
            self.categories = round
                .categories
                .iter()
                .map(|c| (c.name.clone(), c.comments.clone()))
                .collect();
            self.announcements = round.categories.iter().map(|c| c.announcement()).collect();
        }
        ctx.media.speaker.speak(LEAD);
    }

    fn handle_event(&mut self, event: &InputEvent, _size: Size) {
        if matches!(event, InputEvent::Enter) {
            self.skip = true;
        }
    }

    fn update(&mut self, ctx: &mut Context, elapsed_ms: u64) -> StateKind {
        if ctx.store.data.is_none() {
            tracing::warn!("intro without game data");
            return StateKind::Loading;
        }
        self.dwell_ms += elapsed_ms;
        let skip = std::mem::take(&mut self.skip);
        if !skip && (ctx.media.speaker.is_speaking() || self.dwell_ms < ctx.config.timing.intro_dwell_ms) {
            return StateKind::Intro;
        }

        let next = match self.step {
            Step::Lead => 0,
            Step::Category(i) => i + 1,
        };
        if next >= self.announcements.len() {
            return StateKind::Board;
        }
        self.step = Step::Category(next);
        self.dwell_ms = 0;
        ctx.media.speaker.speak(&self.announcements[next]);
        StateKind::Intro
    }

    fn draw(&self, target: &mut dyn RenderTarget, _store: &Store, _players: &[PlayerView]) {
        let heading = if self.round == 0 { "ROUND ONE" } else { "DOUBLE ROUND" };
        draw_banner(target, heading, Color::Gold);
        let area = stage(target).centered(60, 7);
        match self.step {
            Step::Lead => target.draw_text(area, LEAD, Color::White),
            Step::Category(i) => {
                if let Some((name, comments)) = self.categories.get(i) {
                    let comments = comments.trim();
                    let text = if comments.is_empty() || comments == "-" {
                        name.clone()
                    } else {
                        format!("{}\n\n{}", name, comments)
                    };
                    target.fill_rect(area, Color::Board);
                    target.outline_rect(area, Color::Gold);
                    target.draw_text(area.inset(2, 1), &text, Color::White);
                }
            }
        }
    }
}
